//! Domain model for hypervisor hosts from the `/api/v1/hosts` endpoint.

use crate::core::domain::value_object::serde_helpers::{self, lenient_flag, lenient_string};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A hypervisor host as reported by the backend.
///
/// `hostname` is the case-insensitive identity key. Fields the backend adds
/// beyond the ones modelled here are kept in `extra` so alternate spellings
/// such as `ClusterName` stay visible to availability derivation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Host {
    /// Host name (e.g., "hv-01.corp.local").
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub hostname: String,
    /// Whether the backend currently reaches this host. Anything that is not
    /// a recognisable "yes" counts as disconnected.
    #[serde(default, deserialize_with = "lenient_flag::deserialize")]
    pub connected: bool,
    /// Cluster the host belongs to, as reported (unsanitized).
    #[serde(
        default,
        deserialize_with = "lenient_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub cluster: Option<String>,
    /// Last time the backend heard from the host (opaque timestamp text).
    #[serde(
        default,
        deserialize_with = "lenient_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<String>,
    /// Last connection error, if the host is unreachable.
    #[serde(
        default,
        deserialize_with = "lenient_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    /// Every other field, in server order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Host {
    pub fn new(hostname: impl Into<String>, connected: bool) -> Self {
        Self {
            hostname: hostname.into(),
            connected,
            ..Default::default()
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// The lower-cased identity key used by [`HostIndex`].
    pub fn key(&self) -> String {
        self.hostname.trim().to_lowercase()
    }
}

/// Case-insensitive hostname lookup over one snapshot's hosts.
///
/// When two hosts collide on the same key the first one wins.
#[derive(Debug, Clone, Default)]
pub struct HostIndex {
    hosts: HashMap<String, Host>,
}

impl HostIndex {
    pub fn new<'a>(hosts: impl IntoIterator<Item = &'a Host>) -> Self {
        let mut index = HashMap::new();
        for host in hosts {
            let key = host.key();
            if key.is_empty() {
                continue;
            }
            index.entry(key).or_insert_with(|| host.clone());
        }
        Self { hosts: index }
    }

    pub fn get(&self, hostname: &str) -> Option<&Host> {
        self.hosts.get(&hostname.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
