use crate::{
    core::{
        domain::{
            error::{DashboardError, DashboardResult},
            model::{
                cluster::Cluster, host::Host, inventory_snapshot::InventorySnapshot,
                statistics::Statistics, virtual_machine::VirtualMachine,
            },
        },
        infrastructure::api_client::ApiClient,
    },
    inventory::application::response::collection_response::{
        InventoryEndpoint, parse_collection, parse_object,
    },
};
use futures::future::join_all;
use reqwest::{Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches the four inventory collections and reconciles them into a snapshot.
///
/// The collections are validated as a unit: either every request succeeds
/// and a complete snapshot is returned, or the call fails and nothing is.
#[derive(Debug, Clone)]
pub struct InventoryService {
    api_client: Arc<ApiClient>,
}

impl InventoryService {
    pub fn new(api_client: Arc<ApiClient>) -> Self {
        Self { api_client }
    }

    /// Performs one reconciliation pass.
    ///
    /// # Errors
    ///
    /// * `AuthRequired` if any endpoint answered 401, regardless of the others
    /// * `TransportFailure` / `HttpFailure` for the first failing endpoint in the
    ///   order clusters, hosts, virtual machines, statistics
    /// * `ParseFailure` if a body is not valid JSON; well-formed but
    ///   malformed records are skipped instead
    pub async fn fetch_inventory(&self) -> DashboardResult<InventorySnapshot> {
        let [clusters, hosts, vms, stats] = InventoryEndpoint::ALL;
        let segments = InventoryEndpoint::ALL.map(|endpoint| endpoint.segments());
        let (clusters_res, hosts_res, vms_res, stats_res) = tokio::join!(
            self.api_client.get(&segments[0]),
            self.api_client.get(&segments[1]),
            self.api_client.get(&segments[2]),
            self.api_client.get(&segments[3]),
        );
        let settled = [
            (clusters, clusters_res),
            (hosts, hosts_res),
            (vms, vms_res),
            (stats, stats_res),
        ];

        if let Some((endpoint, _)) = settled.iter().find(|(_, result)| {
            matches!(result, Ok(response) if response.status() == StatusCode::UNAUTHORIZED)
        }) {
            warn!(endpoint = %endpoint.path(), "inventory fetch requires authentication");
            return Err(DashboardError::AuthRequired);
        }

        let mut responses: Vec<(InventoryEndpoint, Response)> = Vec::with_capacity(settled.len());
        for (endpoint, result) in settled {
            let response = result.inspect_err(|e| {
                warn!(endpoint = %endpoint.path(), error = %e, "inventory request did not complete")
            })?;
            let status = response.status();
            if !status.is_success() {
                warn!(endpoint = %endpoint.path(), status = status.as_u16(), "inventory request failed");
                return Err(DashboardError::HttpFailure {
                    status: status.as_u16(),
                });
            }
            responses.push((endpoint, response));
        }

        let bodies = join_all(responses.into_iter().map(|(endpoint, response)| async move {
            response
                .bytes()
                .await
                .map(|body| (endpoint, body))
                .map_err(|e| {
                    DashboardError::TransportFailure(format!(
                        "Failed to read {} body: {}",
                        endpoint.path(),
                        e
                    ))
                })
        }))
        .await
        .into_iter()
        .collect::<DashboardResult<Vec<_>>>()?;

        let mut clusters_out: Vec<Cluster> = Vec::new();
        let mut hosts_out: Vec<Host> = Vec::new();
        let mut vms_out: Vec<VirtualMachine> = Vec::new();
        let mut stats_out = Statistics::default();
        for (endpoint, body) in &bodies {
            match endpoint {
                InventoryEndpoint::Clusters => clusters_out = parse_collection(*endpoint, body)?,
                InventoryEndpoint::Hosts => hosts_out = parse_collection(*endpoint, body)?,
                InventoryEndpoint::VirtualMachines => vms_out = parse_collection(*endpoint, body)?,
                InventoryEndpoint::Statistics => stats_out = parse_object(*endpoint, body)?,
            }
            debug!(endpoint = %endpoint.path(), bytes = body.len(), "inventory body parsed");
        }

        let snapshot = InventorySnapshot::assemble(clusters_out, hosts_out, vms_out, stats_out);
        info!(
            hosts = snapshot.hosts().len(),
            disconnected = snapshot.disconnected_hosts().len(),
            vms = snapshot.vms().len(),
            clusters = snapshot.clusters().len(),
            "inventory reconciled"
        );
        Ok(snapshot)
    }
}
