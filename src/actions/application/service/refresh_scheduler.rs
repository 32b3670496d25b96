//! Deferred "please re-fetch the inventory" requests.

use crate::core::domain::model::vm_action::VmAction;
#[cfg(test)]
use mockall::automock;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Why a refresh was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub host: String,
    pub vm_name: String,
    pub action: VmAction,
}

/// Receives refresh requests from action controllers.
#[cfg_attr(test, automock)]
pub trait RefreshScheduler: Send + Sync {
    /// Asks for a full inventory refresh once `delay` has elapsed.
    fn schedule_refresh(&self, delay: Duration, request: RefreshRequest);
}

/// Delivers refresh requests on a channel after their delay.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct ChannelRefreshScheduler {
    sender: UnboundedSender<RefreshRequest>,
}

impl ChannelRefreshScheduler {
    pub fn channel() -> (Self, UnboundedReceiver<RefreshRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl RefreshScheduler for ChannelRefreshScheduler {
    fn schedule_refresh(&self, delay: Duration, request: RefreshRequest) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiving side may be gone when the dashboard shuts down.
            if sender.send(request).is_err() {
                debug!("refresh request dropped, no receiver");
            }
        });
    }
}
