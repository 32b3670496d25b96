//! Domain model for virtual machines from the `/api/v1/virtualmachines` endpoint.
//!
//! Backends disagree on field spellings (`cluster`, `ClusterName`, `is_clustered`,
//! `HighAvailability`, ...), so a VM is kept as its raw JSON object and the
//! well-known fields are exposed through accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A virtual machine record, preserved in server key order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VirtualMachine {
    fields: Map<String, Value>,
}

impl VirtualMachine {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a record from a JSON value; non-object values yield an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Exact-key access to a raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Case-insensitive access: the first key whose lower-cased form matches wins.
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn name(&self) -> Option<&str> {
        self.text_field(&["name", "vm_name", "vmname"])
    }

    /// The hostname this VM claims to run on (a by-name reference, not ownership).
    pub fn host(&self) -> Option<&str> {
        self.text_field(&["host", "hostname", "hyperv_host", "hypervisor"])
    }

    /// The server-reported state, e.g. `Running`, `Off`, `Paused`, `Saved`.
    pub fn state(&self) -> VmPowerState {
        VmPowerState::parse(self.text_field(&["state", "status"]).unwrap_or_default())
    }

    pub fn cpu_cores(&self) -> Option<u64> {
        self.number_field(&["cpu_cores", "cpucount", "cpu_count", "processorcount"])
            .map(|n| n as u64)
    }

    pub fn memory_gb(&self) -> Option<f64> {
        self.number_field(&["memory_gb", "memorygb", "memory_assigned_gb"])
    }

    fn text_field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get_ignore_case(key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    fn number_field(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.get_ignore_case(key))
            .find_map(|value| match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
    }
}

impl From<Value> for VirtualMachine {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// The lifecycle state shown for a VM.
///
/// Known states are recognised case-insensitively; anything else, including
/// the optimistic `Starting` / `Stopping` estimates, is carried verbatim in
/// `Other` and is not actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmPowerState {
    Running,
    Off,
    Paused,
    Saved,
    Other(String),
}

impl VmPowerState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "running" => VmPowerState::Running,
            "off" => VmPowerState::Off,
            "paused" => VmPowerState::Paused,
            "saved" => VmPowerState::Saved,
            _ => VmPowerState::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VmPowerState::Running => "Running",
            VmPowerState::Off => "Off",
            VmPowerState::Paused => "Paused",
            VmPowerState::Saved => "Saved",
            VmPowerState::Other(raw) => raw,
        }
    }
}

impl fmt::Display for VmPowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
