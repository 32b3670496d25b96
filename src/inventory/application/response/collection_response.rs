use crate::core::domain::error::{DashboardError, DashboardResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// The four collection endpoints, in error-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryEndpoint {
    Clusters,
    Hosts,
    VirtualMachines,
    Statistics,
}

impl InventoryEndpoint {
    pub const ALL: [InventoryEndpoint; 4] = [
        InventoryEndpoint::Clusters,
        InventoryEndpoint::Hosts,
        InventoryEndpoint::VirtualMachines,
        InventoryEndpoint::Statistics,
    ];

    pub fn segments(&self) -> [&'static str; 3] {
        let resource = match self {
            InventoryEndpoint::Clusters => "clusters",
            InventoryEndpoint::Hosts => "hosts",
            InventoryEndpoint::VirtualMachines => "virtualmachines",
            InventoryEndpoint::Statistics => "statistics",
        };
        ["api", "v1", resource]
    }

    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }
}

/// Decodes a body to JSON. A blank body or a JSON `null` is `None`.
fn parse_json(endpoint: InventoryEndpoint, body: &[u8]) -> DashboardResult<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Value>(body)
        .map(|value| Some(value).filter(|v| !v.is_null()))
        .map_err(|e| DashboardError::ParseFailure {
            endpoint: endpoint.path(),
            message: e.to_string(),
        })
}

/// Parses a collection body into its records.
///
/// Only a body that is not JSON fails. A missing or non-array collection is
/// empty, and entries that are not objects or do not fit `T` are skipped.
pub fn parse_collection<T>(endpoint: InventoryEndpoint, body: &[u8]) -> DashboardResult<Vec<T>>
where
    T: DeserializeOwned,
{
    let items = match parse_json(endpoint, body)? {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(endpoint = %endpoint.path(), kind = json_kind(&other), "collection is not an array");
            return Ok(Vec::new());
        }
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter(|(_, item)| item.is_object())
        .filter_map(|(position, item)| {
            serde_json::from_value(item)
                .inspect_err(|e| {
                    debug!(endpoint = %endpoint.path(), position, error = %e, "skipping record")
                })
                .ok()
        })
        .collect();

    if records.len() < total {
        warn!(
            endpoint = %endpoint.path(),
            skipped = total - records.len(),
            "ignored malformed records"
        );
    }
    Ok(records)
}

/// Parses a single-object body such as the statistics.
///
/// Anything but a fitting JSON object yields `T::default()`.
pub fn parse_object<T>(endpoint: InventoryEndpoint, body: &[u8]) -> DashboardResult<T>
where
    T: DeserializeOwned + Default,
{
    match parse_json(endpoint, body)? {
        Some(value @ Value::Object(_)) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(endpoint = %endpoint.path(), error = %e, "object does not fit, using defaults");
            T::default()
        })),
        Some(other) => {
            warn!(endpoint = %endpoint.path(), kind = json_kind(&other), "body is not an object");
            Ok(T::default())
        }
        None => Ok(T::default()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
