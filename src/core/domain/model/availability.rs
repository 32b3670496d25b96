//! The output of availability derivation.

use serde::Serialize;
use std::fmt;

/// Which piece of evidence settled an [`AvailabilityVerdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilitySource {
    /// An explicit HA/clustered flag on the VM record.
    Vm,
    /// A cluster name on the VM record.
    Cluster,
    /// The VM's host is known and carries no cluster.
    Host,
    Unknown,
}

impl AvailabilitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilitySource::Vm => "vm",
            AvailabilitySource::Cluster => "cluster",
            AvailabilitySource::Host => "host",
            AvailabilitySource::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AvailabilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a VM is clustered / highly available, with provenance.
///
/// Verdicts are recomputed from the current snapshot on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityVerdict {
    /// `None` means the evidence does not allow a decision.
    pub availability: Option<bool>,
    pub cluster_name: Option<String>,
    pub source: AvailabilitySource,
    /// The host to display for the VM, if one could be named.
    pub host_name: Option<String>,
}

impl AvailabilityVerdict {
    pub fn unknown() -> Self {
        Self {
            availability: None,
            cluster_name: None,
            source: AvailabilitySource::Unknown,
            host_name: None,
        }
    }

    /// The display label: `Yes`, `Yes (<cluster>)`, `No` or `Unknown`.
    pub fn label(&self) -> String {
        match (self.availability, self.cluster_name.as_deref()) {
            (Some(true), Some(cluster)) => format!("Yes ({})", cluster),
            (Some(true), None) => "Yes".to_string(),
            (Some(false), _) => "No".to_string(),
            (None, _) => "Unknown".to_string(),
        }
    }
}

impl fmt::Display for AvailabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
