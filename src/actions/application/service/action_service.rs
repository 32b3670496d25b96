use crate::{
    actions::application::response::action_response::extract_message,
    core::{
        domain::{
            error::{DashboardError, DashboardResult, ValidationError},
            model::vm_action::VmAction,
        },
        infrastructure::api_client::ApiClient,
    },
};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::debug;

/// The backend operation a [`super::vm_action_controller::VmActionController`] drives.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VmActionApi: Send + Sync {
    /// Requests `action` for the VM `vm_name` on `host`.
    ///
    /// # Returns
    ///
    /// * `Ok(message)` on a 2xx answer, with the body's human message if any
    /// * `Err(DashboardError::ActionRejected)` on any other status
    /// * `Err(DashboardError::TransportFailure)` if the request never completed
    async fn send_action(
        &self,
        host: &str,
        vm_name: &str,
        action: VmAction,
    ) -> DashboardResult<Option<String>>;
}

/// Issues VM power actions over HTTP: `POST /api/v1/vms/{host}/{vm}/{action}`.
#[derive(Debug, Clone)]
pub struct ActionService {
    api_client: Arc<ApiClient>,
}

impl ActionService {
    pub fn new(api_client: Arc<ApiClient>) -> Self {
        Self { api_client }
    }
}

#[async_trait]
impl VmActionApi for ActionService {
    async fn send_action(
        &self,
        host: &str,
        vm_name: &str,
        action: VmAction,
    ) -> DashboardResult<Option<String>> {
        for (field, value) in [("host", host), ("vm_name", vm_name)] {
            if is_dot_segment(value) {
                return Err(ValidationError::Field {
                    field: field.to_string(),
                    message: format!("'{}' cannot be used as a path segment", value.trim()),
                }
                .into());
            }
        }

        let response = self
            .api_client
            .post(&["api", "v1", "vms", host, vm_name, action.as_str()])
            .await?;

        let status = response.status();
        // A body that cannot be read only costs us the message.
        let body = response.bytes().await.unwrap_or_else(|e| {
            debug!(%host, vm = %vm_name, %action, error = %e, "action response body unreadable");
            Default::default()
        });
        let message = extract_message(&body);
        debug!(%host, vm = %vm_name, %action, status = status.as_u16(), "action response");

        if status.is_success() {
            Ok(message)
        } else {
            Err(DashboardError::ActionRejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// URL path building drops `.` and `..`, which would retarget the request.
fn is_dot_segment(value: &str) -> bool {
    matches!(value.trim(), "." | "..")
}
