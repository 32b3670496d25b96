use crate::{
    ActionOutcome, AvailabilitySource, ChannelRefreshScheduler, DashboardClient, DashboardError,
    ViewKind, ViewPayload, VmAction, VmPowerState,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn create_test_client(mock_server: &MockServer) -> DashboardClient {
    DashboardClient::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .refresh_delay(Duration::from_millis(10))
        .build()
        .unwrap()
}

async fn mount_inventory(mock_server: &MockServer, hosts: Value, vms: Value) {
    let bodies = [
        ("clusters", json!([{"name": "Prod"}])),
        ("hosts", hosts),
        ("virtualmachines", vms),
        ("statistics", json!({"environment_name": "Lab"})),
    ];
    for (resource, body) in bodies {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/{}", resource)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(mock_server)
            .await;
    }
}

fn hosts() -> Value {
    json!([
        {"hostname": "hv-01", "connected": true, "cluster": "Prod"},
        {"hostname": "hv-02", "connected": true}
    ])
}

#[tokio::test]
async fn test_enter_view_refresh_policy() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_inventory(
        &mock_server,
        hosts(),
        json!([{"name": "web-01", "host": "hv-02", "state": "Running"}]),
    )
    .await;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let mut context = client.context(Arc::new(scheduler));
    assert_eq!(context.render(ViewKind::Hosts), ViewPayload::Loading);

    let ViewPayload::Overview(summary) = context.enter_view(ViewKind::Overview).await.unwrap()
    else {
        panic!("expected overview");
    };
    assert_eq!(summary.environment_name.as_deref(), Some("Lab"));
    assert_eq!(summary.running_vms, 1);

    // A snapshot exists now, so switching views does not hit the backend again.
    let ViewPayload::VirtualMachines(rows) = context
        .enter_view(ViewKind::VirtualMachines)
        .await
        .unwrap()
    else {
        panic!("expected vm rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].availability.source, AvailabilitySource::Host);
    assert_eq!(rows[0].availability_label, "No");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);

    context.enter_view(ViewKind::Overview).await.unwrap();
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 8);
}

#[tokio::test]
async fn test_refresh_reconciles_controllers() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_inventory(
        &mock_server,
        hosts(),
        json!([
            {"name": "web-01", "host": "hv-01", "state": "Off"},
            {"name": "db-01", "host": "hv-02", "state": "Running"}
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/web-01/start"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let (scheduler, mut refreshes) = ChannelRefreshScheduler::channel();
    let mut context = client.context(Arc::new(scheduler));
    context.refresh().await.unwrap();

    assert!(context.controller_for("hv-01", "missing-vm").is_none());
    let web = context.controller_for("HV-01", "WEB-01").unwrap();
    let db = context.controller_for("hv-02", "db-01").unwrap();
    assert!(Arc::ptr_eq(&web, &context.controller_for("hv-01", "web-01").unwrap()));

    let outcome = web.execute_action(VmAction::Start).await;
    assert!(matches!(outcome, ActionOutcome::Completed { .. }));
    assert_eq!(
        web.displayed_state().await,
        VmPowerState::Other("Starting".to_string())
    );
    refreshes.recv().await.unwrap();

    mock_server.reset().await;
    mount_inventory(
        &mock_server,
        hosts(),
        json!([{"name": "web-01", "host": "hv-01", "state": "Running"}]),
    )
    .await;
    let snapshot = context.refresh().await.unwrap();

    assert_eq!(snapshot.vms().len(), 1);
    assert_eq!(web.estimated_state().await, None);
    assert_eq!(web.displayed_state().await, VmPowerState::Running);
    // db-01 left the inventory; a fresh lookup no longer finds it.
    assert!(context.controller_for("hv-02", "db-01").is_none());
    assert_eq!(db.displayed_state().await, VmPowerState::Running);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_inventory(
        &mock_server,
        hosts(),
        json!([{"name": "web-01", "host": "hv-01", "state": "Off"}]),
    )
    .await;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let mut context = client.context(Arc::new(scheduler));
    context.refresh().await.unwrap();

    mock_server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let result = context.refresh().await;
    assert!(matches!(result, Err(DashboardError::AuthRequired)));

    let snapshot = context.snapshot().unwrap();
    assert_eq!(snapshot.vms().len(), 1);
    let verdict = context.availability_for(&snapshot.vms()[0]);
    assert_eq!(verdict.cluster_name.as_deref(), Some("Prod"));
    assert_eq!(verdict.host_name.as_deref(), Some("hv-01"));
}
