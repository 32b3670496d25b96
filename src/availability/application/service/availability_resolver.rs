//! Derives whether a VM is clustered / highly available.
//!
//! Inventory backends disagree about where this lives: an explicit flag under
//! one of many spellings, a cluster name on the VM, or only the host's cluster
//! membership. The resolver walks that evidence in a fixed precedence order over
//! a case-insensitive projection of the record.

use crate::{
    availability::application::service::normalization::{
        normalize_boolean, sanitize_cluster_name, sanitize_cluster_str,
    },
    core::domain::model::{
        availability::{AvailabilitySource, AvailabilityVerdict},
        host::{Host, HostIndex},
        virtual_machine::VirtualMachine,
    },
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// VM fields naming the host, in lookup order.
const HOST_KEYS: &[&str] = &["host", "hostname", "hyperv_host", "hypervisor"];

/// Normalized VM fields carrying a cluster name, tried after the raw `cluster` key.
const VM_CLUSTER_KEYS: &[&str] = &["cluster", "cluster_name", "clustername"];

/// Normalized host fields carrying a cluster name, tried after the typed `cluster`.
const HOST_CLUSTER_KEYS: &[&str] = &["cluster", "clustername", "cluster_name"];

/// Explicit HA flags, in precedence order.
const HA_FLAG_KEYS: &[&str] = &[
    "high_availability",
    "highavailability",
    "ha_enabled",
    "haenabled",
    "clustered",
    "is_clustered",
    "isclustered",
    "vm_clustered",
    "vmclustered",
    "ha",
];

/// Context for one derivation. Every field is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityOptions<'a> {
    /// Used to resolve the VM's host by name when `host` is not given.
    pub host_index: Option<&'a HostIndex>,
    /// An already-resolved host; takes priority over the index.
    pub host: Option<&'a Host>,
    /// Cluster name to fall back on when neither the VM nor its host names one.
    pub cluster: Option<&'a str>,
    /// Asserts the host exists even though no host record is supplied.
    pub host_present: bool,
}

impl<'a> AvailabilityOptions<'a> {
    pub fn with_index(host_index: &'a HostIndex) -> Self {
        Self {
            host_index: Some(host_index),
            ..Default::default()
        }
    }

    pub fn with_host(host: &'a Host) -> Self {
        Self {
            host: Some(host),
            ..Default::default()
        }
    }
}

/// Lower-cased key → value view of a JSON object; the first spelling wins.
struct FieldView<'a> {
    fields: HashMap<String, &'a Value>,
}

impl<'a> FieldView<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        let mut fields = HashMap::with_capacity(map.len());
        for (key, value) in map {
            fields.entry(key.to_lowercase()).or_insert(value);
        }
        Self { fields }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key).copied()
    }
}

/// Produces the availability verdict for `vm`.
///
/// Pure: the same inputs always yield the same verdict.
///
/// A VM whose named host cannot be resolved gets `Unknown`, never `No`,
/// unless the caller asserts `host_present`.
pub fn derive_vm_availability(
    vm: &VirtualMachine,
    options: AvailabilityOptions<'_>,
) -> AvailabilityVerdict {
    let view = FieldView::new(vm.fields());

    let host_candidate = HOST_KEYS
        .iter()
        .filter_map(|key| view.get(key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|name| !name.is_empty());

    let resolved_host = options.host.or_else(|| {
        let index = options.host_index?;
        index.get(host_candidate?)
    });

    let vm_cluster = std::iter::once(vm.get("cluster"))
        .chain(VM_CLUSTER_KEYS.iter().map(|key| view.get(key)))
        .find_map(sanitize_cluster_name);

    let host_cluster = resolved_host.and_then(host_cluster_name);

    let cluster_name = vm_cluster
        .clone()
        .or_else(|| host_cluster.clone())
        .or_else(|| options.cluster.and_then(sanitize_cluster_str));

    let host_name = resolved_host
        .map(|host| host.hostname.trim())
        .filter(|name| !name.is_empty())
        .or(host_candidate)
        .map(str::to_string);

    let direct_flag = HA_FLAG_KEYS
        .iter()
        .find_map(|key| normalize_boolean(view.get(key)));

    let host_known = resolved_host.is_some() || options.host_present;

    let (availability, source) = match direct_flag {
        Some(flag) => (Some(flag), AvailabilitySource::Vm),
        None if vm_cluster.is_some() => (Some(true), AvailabilitySource::Cluster),
        None if host_cluster.is_none() && host_known => (Some(false), AvailabilitySource::Host),
        None => (None, AvailabilitySource::Unknown),
    };

    AvailabilityVerdict {
        availability,
        cluster_name,
        source,
        host_name,
    }
}

fn host_cluster_name(host: &Host) -> Option<String> {
    if let Some(name) = host.cluster.as_deref().and_then(sanitize_cluster_str) {
        return Some(name);
    }
    let view = FieldView::new(&host.extra);
    HOST_CLUSTER_KEYS
        .iter()
        .map(|key| view.get(key))
        .find_map(sanitize_cluster_name)
}
