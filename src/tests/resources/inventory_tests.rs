use crate::{DashboardClient, DashboardError, VmPowerState};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn create_test_client(mock_server: &MockServer) -> DashboardClient {
    DashboardClient::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap()
}

async fn mount(mock_server: &MockServer, resource: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/{}", resource)))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

async fn mount_all(
    mock_server: &MockServer,
    clusters: ResponseTemplate,
    hosts: ResponseTemplate,
    vms: ResponseTemplate,
    statistics: ResponseTemplate,
) {
    mount(mock_server, "clusters", clusters).await;
    mount(mock_server, "hosts", hosts).await;
    mount(mock_server, "virtualmachines", vms).await;
    mount(mock_server, "statistics", statistics).await;
}

fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn test_inventory_success() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ok_json(json!([{"name": "Prod-Cluster-01"}])),
        ok_json(json!([
            {"hostname": "hv-01", "connected": true, "cluster": "Prod-Cluster-01"},
            {"hostname": "hv-02", "connected": false, "error": "WinRM timeout"},
            {"hostname": "hv-03", "connected": true}
        ])),
        ok_json(json!([
            {"name": "web-01", "host": "hv-01", "state": "Running", "cpu_cores": 4},
            {"name": "db-01", "host": "hv-03", "state": "Off"}
        ])),
        ok_json(json!({"total_hosts": 3, "environment_name": "Contoso Lab"})),
    )
    .await;

    let snapshot = client.fetch_inventory().await.unwrap();

    assert_eq!(snapshot.hosts().len(), 2);
    assert_eq!(snapshot.disconnected_hosts().len(), 1);
    assert_eq!(snapshot.disconnected_hosts()[0].hostname, "hv-02");
    assert_eq!(
        snapshot.disconnected_hosts()[0].error.as_deref(),
        Some("WinRM timeout")
    );
    assert_eq!(snapshot.disconnected_count(), 1);
    assert_eq!(snapshot.total_hosts(), 3);
    assert_eq!(snapshot.total_vms(), 2);
    assert_eq!(snapshot.total_clusters(), 1);
    assert_eq!(snapshot.environment_name(), Some("Contoso Lab"));
    assert_eq!(snapshot.last_refresh(), None);
    assert_eq!(snapshot.vms()[0].state(), VmPowerState::Running);
    assert_eq!(snapshot.vms()[0].cpu_cores(), Some(4));
}

#[tokio::test]
async fn test_inventory_server_counters_win_when_non_zero() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ok_json(json!([])),
        ok_json(json!([{"hostname": "hv-01", "connected": false}])),
        ok_json(json!([])),
        ok_json(json!({
            "total_hosts": "12",
            "total_vms": 0,
            "disconnected_count": 4,
            "last_refresh": "2024-05-01T10:00:00Z"
        })),
    )
    .await;

    let snapshot = client.fetch_inventory().await.unwrap();

    assert_eq!(snapshot.total_hosts(), 12);
    // Zero from the server falls back to the collection.
    assert_eq!(snapshot.total_vms(), 0);
    assert_eq!(snapshot.disconnected_count(), 4);
    assert_eq!(snapshot.last_refresh(), Some("2024-05-01T10:00:00Z"));
}

#[tokio::test]
async fn test_inventory_null_and_empty_bodies_are_empty_collections() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("null"),
        ResponseTemplate::new(200),
        ok_json(json!([])),
        ResponseTemplate::new(200).set_body_string("null"),
    )
    .await;

    let snapshot = client.fetch_inventory().await.unwrap();

    assert!(snapshot.clusters().is_empty());
    assert!(snapshot.hosts().is_empty());
    assert!(snapshot.disconnected_hosts().is_empty());
    assert_eq!(snapshot.total_hosts(), 0);
    assert_eq!(snapshot.disconnected_count(), 0);
}

#[tokio::test]
async fn test_inventory_unauthorized_beats_earlier_failure() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ResponseTemplate::new(500),
        ok_json(json!([])),
        ok_json(json!([])),
        ResponseTemplate::new(401),
    )
    .await;

    let result = client.fetch_inventory().await;
    assert!(matches!(result, Err(DashboardError::AuthRequired)));
}

#[tokio::test]
async fn test_inventory_first_failure_in_order_wins() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ok_json(json!([])),
        ResponseTemplate::new(503),
        ResponseTemplate::new(404),
        ok_json(json!({})),
    )
    .await;

    let result = client.fetch_inventory().await;
    assert!(matches!(
        result,
        Err(DashboardError::HttpFailure { status: 503 })
    ));
}

#[tokio::test]
async fn test_inventory_invalid_json_is_parse_failure() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ok_json(json!([])),
        ok_json(json!([])),
        ResponseTemplate::new(200).set_body_string("<html>login</html>"),
        ok_json(json!({})),
    )
    .await;

    match client.fetch_inventory().await {
        Err(DashboardError::ParseFailure { endpoint, .. }) => {
            assert_eq!(endpoint, "/api/v1/virtualmachines");
        }
        other => panic!("expected parse failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_inventory_unreachable_backend_is_transport_failure() {
    let client = DashboardClient::builder()
        .base_url("http://127.0.0.1:9")
        .unwrap()
        .build()
        .unwrap();

    let result = client.fetch_inventory().await;
    assert!(matches!(result, Err(DashboardError::TransportFailure(_))));
}

#[tokio::test]
async fn test_builder_requires_base_url() {
    let result = DashboardClient::builder().build();
    assert!(matches!(result, Err(DashboardError::Validation(_))));

    let result = DashboardClient::builder()
        .base_url("ftp://dashboard.local")
        .unwrap()
        .build();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_inventory_loose_connected_flags() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ok_json(json!([])),
        ok_json(json!([
            {"hostname": "hv-01", "connected": 1},
            {"hostname": "hv-02", "connected": "true"},
            {"hostname": "hv-03", "connected": "no"},
            {"hostname": "hv-04", "connected": "unreachable?"}
        ])),
        ok_json(json!([])),
        ok_json(json!({})),
    )
    .await;

    let snapshot = client.fetch_inventory().await.unwrap();

    let connected: Vec<&str> = snapshot.hosts().iter().map(|h| h.hostname.as_str()).collect();
    let disconnected: Vec<&str> = snapshot
        .disconnected_hosts()
        .iter()
        .map(|h| h.hostname.as_str())
        .collect();
    assert_eq!(connected, vec!["hv-01", "hv-02"]);
    assert_eq!(disconnected, vec!["hv-03", "hv-04"]);
    assert_eq!(snapshot.disconnected_count(), 2);
}

#[tokio::test]
async fn test_inventory_skips_non_object_records() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_all(
        &mock_server,
        ok_json(json!([{"name": "Prod"}, null])),
        ok_json(json!([{"hostname": "hv-01", "connected": true}, "hv-02"])),
        ok_json(json!([{"name": "web-01", "host": "hv-01"}, null, 42])),
        ok_json(json!({})),
    )
    .await;

    let snapshot = client.fetch_inventory().await.unwrap();

    assert_eq!(snapshot.clusters().len(), 1);
    assert_eq!(snapshot.hosts().len(), 1);
    assert_eq!(snapshot.vms().len(), 1);
    assert_eq!(snapshot.vms()[0].name(), Some("web-01"));
    assert_eq!(snapshot.total_vms(), 1);
}
