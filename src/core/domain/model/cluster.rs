//! Domain model for failover clusters from the `/api/v1/clusters` endpoint.

use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A cluster as returned by the backend.
///
/// Only the name is interpreted; node lists, quorum details and the like are
/// passed through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Cluster {
    /// Cluster name (e.g., "Prod-Cluster-01").
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}
