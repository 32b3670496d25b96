//! Fetches the inventory once and prints every dashboard view.
//!
//! Reads `DASHBOARD_URL` (and optionally `DASHBOARD_ACCEPT_INVALID_CERTS`)
//! from the environment or a `.env` file.

use tracing_subscriber::EnvFilter;
use vm_inventory::{
    ChannelRefreshScheduler, DashboardClient, DashboardError, DashboardResult, ViewKind,
    ViewPayload,
};

#[tokio::main]
async fn main() -> DashboardResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vm_inventory=info")),
        )
        .init();

    let base_url =
        std::env::var("DASHBOARD_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let accept_invalid_certs = std::env::var("DASHBOARD_ACCEPT_INVALID_CERTS").is_ok();

    let client = DashboardClient::builder()
        .base_url(base_url)?
        .accept_invalid_certs(accept_invalid_certs)
        .build()?;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let mut context = client.context(std::sync::Arc::new(scheduler));

    for kind in ViewKind::ALL {
        let payload = match context.enter_view(kind).await {
            Ok(payload) => payload,
            Err(DashboardError::AuthRequired) => {
                println!("Session expired, log in through the dashboard first");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        println!("\n== {} ==", kind);
        match payload {
            ViewPayload::Loading => println!("  loading..."),
            ViewPayload::Overview(summary) => {
                println!(
                    "  {}: {} hosts ({} disconnected), {} VMs ({} running, {} HA), {} clusters",
                    summary.environment_name.as_deref().unwrap_or("Inventory"),
                    summary.total_hosts,
                    summary.disconnected_count,
                    summary.total_vms,
                    summary.running_vms,
                    summary.highly_available_vms,
                    summary.total_clusters,
                );
                if let Some(last_refresh) = summary.last_refresh {
                    println!("  last refresh: {}", last_refresh);
                }
            }
            ViewPayload::Hosts(rows) | ViewPayload::Disconnected(rows) => {
                for host in rows {
                    println!(
                        "  • {} [{}] cluster={} vms={}{}",
                        host.hostname,
                        if host.connected { "up" } else { "down" },
                        host.cluster.as_deref().unwrap_or("-"),
                        host.vm_count,
                        host.error
                            .map(|e| format!(" error: {}", e))
                            .unwrap_or_default(),
                    );
                }
            }
            ViewPayload::VirtualMachines(rows) => {
                for vm in rows {
                    println!(
                        "  • {} on {}: {} | HA: {}",
                        vm.name.as_deref().unwrap_or("?"),
                        vm.host.as_deref().unwrap_or("?"),
                        vm.state,
                        vm.availability_label,
                    );
                }
            }
            ViewPayload::Clusters(rows) => {
                for cluster in rows {
                    println!(
                        "  • {}: {} hosts, {} VMs",
                        cluster.name, cluster.host_count, cluster.vm_count
                    );
                }
            }
        }
    }

    Ok(())
}
