//! Aggregate counters from the `/api/v1/statistics` endpoint.

use crate::core::domain::value_object::serde_helpers::{lenient_count, lenient_string};
use serde::{Deserialize, Serialize};

/// Server-side aggregate statistics. Every field is optional.
///
/// A zero or missing counter means "not provided": the snapshot falls back to
/// counting the matching collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Statistics {
    #[serde(default, deserialize_with = "lenient_count::deserialize")]
    pub total_hosts: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count::deserialize")]
    pub total_vms: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count::deserialize")]
    pub total_clusters: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count::deserialize")]
    pub disconnected_count: Option<u64>,
    /// Time of the backend's last inventory collection (opaque text).
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub last_refresh: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub environment_name: Option<String>,
}
