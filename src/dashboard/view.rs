//! Data payloads for the dashboard's views.
//!
//! Views form a closed set selected by tag. Each one turns the current
//! snapshot into a serializable payload; markup is left to the caller.

use crate::{
    availability::application::service::{
        availability_resolver::{AvailabilityOptions, derive_vm_availability},
        normalization::sanitize_cluster_str,
    },
    core::domain::model::{
        availability::AvailabilityVerdict, host::Host, inventory_snapshot::InventorySnapshot,
        virtual_machine::{VirtualMachine, VmPowerState},
    },
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Overview,
    Hosts,
    VirtualMachines,
    Clusters,
    Disconnected,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::Overview,
        ViewKind::Hosts,
        ViewKind::VirtualMachines,
        ViewKind::Clusters,
        ViewKind::Disconnected,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ViewKind::Overview => "overview",
            ViewKind::Hosts => "hosts",
            ViewKind::VirtualMachines => "vms",
            ViewKind::Clusters => "clusters",
            ViewKind::Disconnected => "disconnected",
        }
    }

    /// Whether entering this view always fetches a fresh snapshot.
    pub fn refreshes_on_enter(&self) -> bool {
        matches!(self, ViewKind::Overview)
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "overview" | "home" => Ok(ViewKind::Overview),
            "hosts" => Ok(ViewKind::Hosts),
            "vms" | "virtualmachines" | "virtual-machines" => Ok(ViewKind::VirtualMachines),
            "clusters" => Ok(ViewKind::Clusters),
            "disconnected" => Ok(ViewKind::Disconnected),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewSummary {
    pub environment_name: Option<String>,
    pub last_refresh: Option<String>,
    pub total_hosts: u64,
    pub total_vms: u64,
    pub total_clusters: u64,
    pub disconnected_count: u64,
    pub running_vms: usize,
    pub highly_available_vms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRow {
    pub hostname: String,
    pub connected: bool,
    pub cluster: Option<String>,
    pub vm_count: usize,
    pub last_seen: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmRow {
    pub name: Option<String>,
    pub host: Option<String>,
    pub state: String,
    pub cpu_cores: Option<u64>,
    pub memory_gb: Option<f64>,
    pub availability: AvailabilityVerdict,
    pub availability_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterRow {
    pub name: String,
    pub host_count: usize,
    pub vm_count: usize,
}

/// What a view hands to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum ViewPayload {
    /// No snapshot has been fetched yet.
    Loading,
    Overview(OverviewSummary),
    Hosts(Vec<HostRow>),
    VirtualMachines(Vec<VmRow>),
    Clusters(Vec<ClusterRow>),
    Disconnected(Vec<HostRow>),
}

/// Builds the payload for `kind` from `snapshot`.
pub fn render_view(kind: ViewKind, snapshot: Option<&InventorySnapshot>) -> ViewPayload {
    let Some(snapshot) = snapshot else {
        return ViewPayload::Loading;
    };

    match kind {
        ViewKind::Overview => ViewPayload::Overview(overview(snapshot)),
        ViewKind::Hosts => ViewPayload::Hosts(host_rows(snapshot, snapshot.hosts())),
        ViewKind::VirtualMachines => ViewPayload::VirtualMachines(
            snapshot.vms().iter().map(|vm| vm_row(snapshot, vm)).collect(),
        ),
        ViewKind::Clusters => ViewPayload::Clusters(cluster_rows(snapshot)),
        ViewKind::Disconnected => {
            ViewPayload::Disconnected(host_rows(snapshot, snapshot.disconnected_hosts()))
        }
    }
}

fn verdict(snapshot: &InventorySnapshot, vm: &VirtualMachine) -> AvailabilityVerdict {
    derive_vm_availability(vm, AvailabilityOptions::with_index(snapshot.host_index()))
}

fn overview(snapshot: &InventorySnapshot) -> OverviewSummary {
    OverviewSummary {
        environment_name: snapshot.environment_name().map(str::to_string),
        last_refresh: snapshot.last_refresh().map(str::to_string),
        total_hosts: snapshot.total_hosts(),
        total_vms: snapshot.total_vms(),
        total_clusters: snapshot.total_clusters(),
        disconnected_count: snapshot.disconnected_count(),
        running_vms: snapshot
            .vms()
            .iter()
            .filter(|vm| vm.state() == VmPowerState::Running)
            .count(),
        highly_available_vms: snapshot
            .vms()
            .iter()
            .filter(|vm| verdict(snapshot, vm).availability == Some(true))
            .count(),
    }
}

fn vms_on(snapshot: &InventorySnapshot, host: &Host) -> usize {
    snapshot
        .vms()
        .iter()
        .filter(|vm| vm.host().is_some_and(|h| h.eq_ignore_ascii_case(host.hostname.trim())))
        .count()
}

fn host_rows(snapshot: &InventorySnapshot, hosts: &[Host]) -> Vec<HostRow> {
    hosts
        .iter()
        .map(|host| HostRow {
            hostname: host.hostname.clone(),
            connected: host.connected,
            cluster: host.cluster.as_deref().and_then(sanitize_cluster_str),
            vm_count: vms_on(snapshot, host),
            last_seen: host.last_seen.clone(),
            error: host.error.clone(),
        })
        .collect()
}

fn vm_row(snapshot: &InventorySnapshot, vm: &VirtualMachine) -> VmRow {
    let availability = verdict(snapshot, vm);
    VmRow {
        name: vm.name().map(str::to_string),
        host: availability.host_name.clone(),
        state: vm.state().to_string(),
        cpu_cores: vm.cpu_cores(),
        memory_gb: vm.memory_gb(),
        availability_label: availability.label(),
        availability,
    }
}

/// Clusters reported by the backend plus any only named by hosts or VMs.
fn cluster_rows(snapshot: &InventorySnapshot) -> Vec<ClusterRow> {
    let mut rows: BTreeMap<String, ClusterRow> = BTreeMap::new();
    let mut entry = |name: &str| -> Option<String> {
        let name = sanitize_cluster_str(name)?;
        let key = name.to_lowercase();
        rows.entry(key.clone()).or_insert_with(|| ClusterRow {
            name,
            host_count: 0,
            vm_count: 0,
        });
        Some(key)
    };

    let mut host_keys = Vec::new();
    let mut vm_keys = Vec::new();
    for cluster in snapshot.clusters() {
        entry(&cluster.name);
    }
    for host in snapshot.hosts().iter().chain(snapshot.disconnected_hosts()) {
        if let Some(key) = host.cluster.as_deref().and_then(&mut entry) {
            host_keys.push(key);
        }
    }
    for vm in snapshot.vms() {
        if let Some(key) = verdict(snapshot, vm).cluster_name.as_deref().and_then(&mut entry) {
            vm_keys.push(key);
        }
    }

    for key in host_keys {
        if let Some(row) = rows.get_mut(&key) {
            row.host_count += 1;
        }
    }
    for key in vm_keys {
        if let Some(row) = rows.get_mut(&key) {
            row.vm_count += 1;
        }
    }
    rows.into_values().collect()
}
