use crate::{
    ActionAvailability, ActionFeedback, ActionOutcome, ChannelRefreshScheduler, DashboardClient,
    DashboardError, FeedbackSeverity, RefreshRequest, SkipReason, VirtualMachine, VmAction,
    VmActionApi, VmPowerState,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
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

fn running_vm() -> VirtualMachine {
    VirtualMachine::from(json!({"name": "web-01", "host": "hv-01", "state": "Running"}))
}

#[tokio::test]
async fn test_send_action_percent_encodes_segments() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/SQL%20Server%20%231/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Queued"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let message = client
        .action_service()
        .send_action("hv-01", "SQL Server #1", VmAction::Start)
        .await
        .unwrap();
    assert_eq!(message.as_deref(), Some("Queued"));
}

#[tokio::test]
async fn test_shutdown_success_schedules_refresh() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/web-01/shutdown"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (scheduler, mut refreshes) = ChannelRefreshScheduler::channel();
    let controller = client.controller(running_vm(), Arc::new(scheduler));

    let outcome = controller.execute_action(VmAction::Shutdown).await;
    assert_eq!(
        outcome,
        ActionOutcome::Completed {
            message: "Shutdown command sent".to_string(),
            estimated_state: VmPowerState::Other("Stopping".to_string()),
        }
    );
    assert_eq!(
        controller.displayed_state().await,
        VmPowerState::Other("Stopping".to_string())
    );
    // The confirmed record is untouched until a refresh lands.
    assert_eq!(controller.confirmed().await.state(), VmPowerState::Running);

    let feedback = controller.feedback().await.unwrap();
    assert_eq!(feedback.severity, FeedbackSeverity::Success);

    let request = refreshes.recv().await.unwrap();
    assert_eq!(
        request,
        RefreshRequest {
            host: "hv-01".to_string(),
            vm_name: "web-01".to_string(),
            action: VmAction::Shutdown,
        }
    );
}

#[tokio::test]
async fn test_rejected_action_uses_detail_message() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/web-01/reset"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"detail": {"message": "VM is locked"}})),
        )
        .mount(&mock_server)
        .await;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let controller = client.controller(running_vm(), Arc::new(scheduler));

    let outcome = controller.execute_action(VmAction::Reset).await;
    assert_eq!(
        outcome,
        ActionOutcome::Rejected {
            status: 409,
            message: "VM is locked".to_string(),
        }
    );
    assert_eq!(controller.displayed_state().await, VmPowerState::Running);
    assert_eq!(controller.estimated_state().await, None);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_rejected_action_without_body_gets_generic_message() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/web-01/stop"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let controller = client.controller(running_vm(), Arc::new(scheduler));

    let outcome = controller.execute_action(VmAction::Stop).await;
    assert_eq!(
        outcome,
        ActionOutcome::Rejected {
            status: 500,
            message: "Failed to stop web-01 (HTTP 500)".to_string(),
        }
    );
    let feedback = controller.feedback().await.unwrap();
    assert_eq!(feedback.severity, FeedbackSeverity::Error);
    assert_eq!(feedback.message, "Failed to stop web-01 (HTTP 500)");
}

#[tokio::test]
async fn test_disallowed_action_is_never_sent() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let controller = client.controller(running_vm(), Arc::new(scheduler));

    let outcome = controller.execute_action(VmAction::Start).await;
    assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::NotAllowed));
    assert_eq!(controller.feedback().await, None);
}

#[tokio::test]
async fn test_second_activation_while_busy_is_dropped() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/web-01/stop"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let controller = Arc::new(client.controller(running_vm(), Arc::new(scheduler)));

    let (first, second) = tokio::join!(
        controller.execute_action(VmAction::Stop),
        controller.execute_action(VmAction::Stop),
    );

    assert!(matches!(first, ActionOutcome::Completed { .. }));
    assert_eq!(second, ActionOutcome::Skipped(SkipReason::Busy));
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_all_actions_disabled_while_in_flight() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/web-01/stop"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vms/hv-01/web-01/reset"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let controller = Arc::new(client.controller(running_vm(), Arc::new(scheduler)));

    let in_flight = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.execute_action(VmAction::Stop).await }
    });

    let mut feedback = None;
    for _ in 0..100 {
        feedback = controller.feedback().await;
        if feedback.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        feedback,
        Some(ActionFeedback {
            message: "Stopping web-01...".to_string(),
            severity: FeedbackSeverity::Info,
        })
    );
    assert!(controller.is_busy());
    assert_eq!(controller.available_actions().await, ActionAvailability::NONE);

    let second = controller.execute_action(VmAction::Reset).await;
    assert_eq!(second, ActionOutcome::Skipped(SkipReason::Busy));

    let first = in_flight.await.unwrap();
    assert!(matches!(first, ActionOutcome::Completed { .. }));
    assert!(!controller.is_busy());
    assert_eq!(
        controller.available_actions().await,
        ActionAvailability::NONE,
        "the Stopping estimate allows nothing until a refresh"
    );
}

#[tokio::test]
async fn test_dot_segments_are_refused() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = client.action_service();
    for (host, vm_name) in [("hv-01", ".."), ("hv-01", "."), ("..", "web-01"), (" . ", "web-01")] {
        let result = service.send_action(host, vm_name, VmAction::Stop).await;
        assert!(
            matches!(result, Err(DashboardError::Validation(_))),
            "{}/{} should be refused",
            host,
            vm_name
        );
    }

    let vm = VirtualMachine::from(json!({"name": "..", "host": "hv-01", "state": "Running"}));
    let (scheduler, _refreshes) = ChannelRefreshScheduler::channel();
    let controller = client.controller(vm, Arc::new(scheduler));
    let outcome = controller.execute_action(VmAction::Stop).await;
    assert!(matches!(outcome, ActionOutcome::Failed { .. }));
    assert_eq!(controller.displayed_state().await, VmPowerState::Running);
}

#[tokio::test]
async fn test_truncated_rejection_body_yields_no_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await.unwrap();
        // Promises more body than it sends, then hangs up.
        socket
            .write_all(b"HTTP/1.1 409 Conflict\r\nContent-Length: 100\r\n\r\n{\"message\": \"VM is")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let client = DashboardClient::builder()
        .base_url(format!("http://{}", addr))
        .unwrap()
        .build()
        .unwrap();

    let result = client
        .action_service()
        .send_action("hv-01", "web-01", VmAction::Stop)
        .await;
    assert!(matches!(
        result,
        Err(DashboardError::ActionRejected {
            status: 409,
            message: None
        })
    ));
    server.await.unwrap();
}
