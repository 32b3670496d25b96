//! Issues one power action against a VM and waits for the follow-up refresh.
//!
//! Usage: `cargo run --example vm_actions -- <host> <vm> <start|shutdown|stop|reset>`

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vm_inventory::{
    ActionOutcome, ChannelRefreshScheduler, DashboardClient, DashboardResult, VmAction,
};

#[tokio::main]
async fn main() -> DashboardResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vm_inventory=debug")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [host, vm_name, action] = args.as_slice() else {
        eprintln!("usage: vm_actions <host> <vm> <start|shutdown|stop|reset>");
        return Ok(());
    };
    let action: VmAction = match action.parse() {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(());
        }
    };

    let base_url =
        std::env::var("DASHBOARD_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let client = DashboardClient::builder().base_url(base_url)?.build()?;

    let (scheduler, mut refreshes) = ChannelRefreshScheduler::channel();
    let mut context = client.context(Arc::new(scheduler));
    context.refresh().await?;

    let Some(controller) = context.controller_for(host, vm_name) else {
        println!("No VM named '{}' on '{}'", vm_name, host);
        return Ok(());
    };

    let enabled = controller.available_actions().await.enabled();
    println!(
        "{} is {}, enabled actions: {:?}",
        vm_name,
        controller.displayed_state().await,
        enabled
    );

    match controller.execute_action(action).await {
        ActionOutcome::Completed {
            message,
            estimated_state,
        } => {
            println!("{} (now showing {})", message, estimated_state);
            if refreshes.recv().await.is_some() {
                context.refresh().await?;
                println!("Confirmed state: {}", controller.displayed_state().await);
            }
        }
        ActionOutcome::Skipped(reason) => println!("Not sent: {:?}", reason),
        ActionOutcome::Rejected { status, message } => println!("Rejected ({}): {}", status, message),
        ActionOutcome::Failed { message } => println!("Failed: {}", message),
    }

    Ok(())
}
