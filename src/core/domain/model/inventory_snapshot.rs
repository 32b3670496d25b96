//! One reconciled, immutable view of the inventory.

use crate::core::domain::model::{
    cluster::Cluster,
    host::{Host, HostIndex},
    statistics::Statistics,
    virtual_machine::VirtualMachine,
};

/// A point-in-time inventory assembled from a single reconciliation pass.
///
/// `hosts` and `disconnected_hosts` are disjoint and together hold exactly
/// the host collection the backend returned for this refresh.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    clusters: Vec<Cluster>,
    hosts: Vec<Host>,
    disconnected_hosts: Vec<Host>,
    vms: Vec<VirtualMachine>,
    total_hosts: u64,
    total_vms: u64,
    total_clusters: u64,
    disconnected_count: u64,
    last_refresh: Option<String>,
    environment_name: Option<String>,
    host_index: HostIndex,
}

impl InventorySnapshot {
    /// Partitions hosts and settles the aggregate counters.
    ///
    /// Server counters win when present and non-zero; otherwise the
    /// corresponding collection is counted, so an empty collection is a real zero.
    pub fn assemble(
        clusters: Vec<Cluster>,
        all_hosts: Vec<Host>,
        vms: Vec<VirtualMachine>,
        statistics: Statistics,
    ) -> Self {
        let host_index = HostIndex::new(&all_hosts);
        let total_host_count = all_hosts.len();
        let (hosts, disconnected_hosts): (Vec<Host>, Vec<Host>) =
            all_hosts.into_iter().partition(|h| h.connected);

        let prefer = |server: Option<u64>, counted: usize| {
            server.filter(|n| *n > 0).unwrap_or(counted as u64)
        };

        Self {
            total_hosts: prefer(statistics.total_hosts, total_host_count),
            total_vms: prefer(statistics.total_vms, vms.len()),
            total_clusters: prefer(statistics.total_clusters, clusters.len()),
            disconnected_count: prefer(statistics.disconnected_count, disconnected_hosts.len()),
            last_refresh: statistics.last_refresh.filter(|s| !s.trim().is_empty()),
            environment_name: statistics.environment_name.filter(|s| !s.trim().is_empty()),
            clusters,
            hosts,
            disconnected_hosts,
            vms,
            host_index,
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Connected hosts only.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn disconnected_hosts(&self) -> &[Host] {
        &self.disconnected_hosts
    }

    pub fn vms(&self) -> &[VirtualMachine] {
        &self.vms
    }

    pub fn total_hosts(&self) -> u64 {
        self.total_hosts
    }

    pub fn total_vms(&self) -> u64 {
        self.total_vms
    }

    pub fn total_clusters(&self) -> u64 {
        self.total_clusters
    }

    pub fn disconnected_count(&self) -> u64 {
        self.disconnected_count
    }

    pub fn last_refresh(&self) -> Option<&str> {
        self.last_refresh.as_deref()
    }

    pub fn environment_name(&self) -> Option<&str> {
        self.environment_name.as_deref()
    }

    /// Lookup over connected and disconnected hosts alike.
    pub fn host_index(&self) -> &HostIndex {
        &self.host_index
    }

    /// Finds a VM by host and name, both compared case-insensitively.
    pub fn find_vm(&self, host: &str, name: &str) -> Option<&VirtualMachine> {
        self.vms.iter().find(|vm| {
            vm.name().is_some_and(|n| n.eq_ignore_ascii_case(name.trim()))
                && vm.host().is_some_and(|h| h.eq_ignore_ascii_case(host.trim()))
        })
    }
}
