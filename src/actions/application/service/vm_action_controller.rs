//! Per-VM power action state machine.
//!
//! The controller shows a client-estimated state right after the server accepts
//! an action. The server-confirmed record only changes through
//! [`VmActionController::reconcile`], which the dashboard calls after each full
//! inventory refresh.

use crate::{
    actions::application::service::{
        action_service::VmActionApi,
        refresh_scheduler::{RefreshRequest, RefreshScheduler},
    },
    core::domain::{
        error::DashboardError,
        model::{
            virtual_machine::{VirtualMachine, VmPowerState},
            vm_action::{ActionAvailability, VmAction},
        },
    },
};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Severity of the feedback shown in a VM's action bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSeverity {
    /// An action is in flight.
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFeedback {
    pub message: String,
    pub severity: FeedbackSeverity,
}

impl ActionFeedback {
    fn new(message: impl Into<String>, severity: FeedbackSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// Why an activation did not reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The VM record lacks a name or a host.
    MissingTarget,
    /// Another action for this VM is still in flight.
    Busy,
    /// The displayed state does not allow the action.
    NotAllowed,
}

/// The result of one [`VmActionController::execute_action`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Skipped(SkipReason),
    /// The backend accepted the action; a refresh has been scheduled.
    Completed {
        message: String,
        estimated_state: VmPowerState,
    },
    /// The backend answered with a non-success status.
    Rejected { status: u16, message: String },
    /// The request never completed.
    Failed { message: String },
}

#[derive(Debug)]
struct ControllerState {
    confirmed: VirtualMachine,
    estimated_state: Option<VmPowerState>,
    feedback: Option<ActionFeedback>,
}

/// Releases the busy flag on every exit path.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Gates, issues and tracks power actions for one displayed VM.
///
/// At most one action is in flight per controller; activations while busy
/// are dropped, not queued.
pub struct VmActionController {
    api: Arc<dyn VmActionApi>,
    scheduler: Arc<dyn RefreshScheduler>,
    refresh_delay: Duration,
    busy: AtomicBool,
    state: RwLock<ControllerState>,
}

impl std::fmt::Debug for VmActionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VmActionController")
            .field("refresh_delay", &self.refresh_delay)
            .field("busy", &self.busy)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl VmActionController {
    pub fn new(
        vm: VirtualMachine,
        api: Arc<dyn VmActionApi>,
        scheduler: Arc<dyn RefreshScheduler>,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            api,
            scheduler,
            refresh_delay,
            busy: AtomicBool::new(false),
            state: RwLock::new(ControllerState {
                confirmed: vm,
                estimated_state: None,
                feedback: None,
            }),
        }
    }

    pub async fn vm_name(&self) -> Option<String> {
        self.state.read().await.confirmed.name().map(str::to_string)
    }

    pub async fn host_name(&self) -> Option<String> {
        self.state.read().await.confirmed.host().map(str::to_string)
    }

    /// The last server-confirmed VM record.
    pub async fn confirmed(&self) -> VirtualMachine {
        self.state.read().await.confirmed.clone()
    }

    /// The state to display: the client estimate if any, else the confirmed state.
    pub async fn displayed_state(&self) -> VmPowerState {
        let state = self.state.read().await;
        state
            .estimated_state
            .clone()
            .unwrap_or_else(|| state.confirmed.state())
    }

    /// The pending client estimate, cleared by the next [`Self::reconcile`].
    pub async fn estimated_state(&self) -> Option<VmPowerState> {
        self.state.read().await.estimated_state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Actions currently enabled; nothing is enabled while an action is in flight.
    pub async fn available_actions(&self) -> ActionAvailability {
        if self.is_busy() {
            return ActionAvailability::NONE;
        }
        ActionAvailability::for_state(&self.displayed_state().await)
    }

    pub async fn feedback(&self) -> Option<ActionFeedback> {
        self.state.read().await.feedback.clone()
    }

    /// Replaces the confirmed record with a freshly fetched one and drops the estimate.
    pub async fn reconcile(&self, vm: VirtualMachine) {
        let mut state = self.state.write().await;
        state.confirmed = vm;
        state.estimated_state = None;
    }

    /// Issues `action` for this VM.
    ///
    /// Never fails: backend and transport errors become `Error` feedback and
    /// leave the displayed state untouched.
    pub async fn execute_action(&self, action: VmAction) -> ActionOutcome {
        let (vm_name, host) = {
            let state = self.state.read().await;
            (
                state.confirmed.name().map(str::to_string),
                state.confirmed.host().map(str::to_string),
            )
        };
        let (Some(vm_name), Some(host)) = (vm_name, host) else {
            debug!(%action, "action ignored, VM name or host unresolved");
            return ActionOutcome::Skipped(SkipReason::MissingTarget);
        };

        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!(%host, vm = %vm_name, %action, "action ignored, another one is in flight");
            return ActionOutcome::Skipped(SkipReason::Busy);
        };

        let current = self.displayed_state().await;
        if !action.is_allowed_in(&current) {
            debug!(%host, vm = %vm_name, %action, state = %current, "action not allowed");
            return ActionOutcome::Skipped(SkipReason::NotAllowed);
        }

        self.set_feedback(ActionFeedback::new(
            format!("{} {}...", action.progress_verb(), vm_name),
            FeedbackSeverity::Info,
        ))
        .await;

        match self.api.send_action(&host, &vm_name, action).await {
            Ok(message) => {
                let message =
                    message.unwrap_or_else(|| action.default_success_message().to_string());
                let estimated_state = action.optimistic_state();
                {
                    let mut state = self.state.write().await;
                    state.estimated_state = Some(estimated_state.clone());
                    state.feedback =
                        Some(ActionFeedback::new(message.clone(), FeedbackSeverity::Success));
                }
                info!(%host, vm = %vm_name, %action, "action accepted");

                self.scheduler.schedule_refresh(
                    self.refresh_delay,
                    RefreshRequest {
                        host,
                        vm_name,
                        action,
                    },
                );

                ActionOutcome::Completed {
                    message,
                    estimated_state,
                }
            }
            Err(DashboardError::ActionRejected { status, message }) => {
                let message = message.unwrap_or_else(|| {
                    format!("Failed to {} {} (HTTP {})", action, vm_name, status)
                });
                warn!(%host, vm = %vm_name, %action, status, %message, "action rejected");
                self.set_feedback(ActionFeedback::new(message.clone(), FeedbackSeverity::Error))
                    .await;
                ActionOutcome::Rejected { status, message }
            }
            Err(err) => {
                let message = match err {
                    DashboardError::TransportFailure(text) => text,
                    other => other.to_string(),
                };
                warn!(%host, vm = %vm_name, %action, %message, "action request failed");
                self.set_feedback(ActionFeedback::new(message.clone(), FeedbackSeverity::Error))
                    .await;
                ActionOutcome::Failed { message }
            }
        }
    }

    async fn set_feedback(&self, feedback: ActionFeedback) {
        self.state.write().await.feedback = Some(feedback);
    }
}
