//! VM power actions and the table of which ones a state allows.

use crate::core::domain::model::virtual_machine::VmPowerState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A power operation the backend can perform on a VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VmAction {
    Start,
    Shutdown,
    Stop,
    Reset,
}

impl VmAction {
    pub const ALL: [VmAction; 4] = [
        VmAction::Start,
        VmAction::Shutdown,
        VmAction::Stop,
        VmAction::Reset,
    ];

    /// The path segment used by `POST /api/v1/vms/{host}/{vm}/{action}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            VmAction::Start => "start",
            VmAction::Shutdown => "shutdown",
            VmAction::Stop => "stop",
            VmAction::Reset => "reset",
        }
    }

    /// Progressive verb for in-flight feedback ("Starting web-01...").
    pub fn progress_verb(&self) -> &'static str {
        match self {
            VmAction::Start => "Starting",
            VmAction::Shutdown => "Shutting down",
            VmAction::Stop => "Stopping",
            VmAction::Reset => "Resetting",
        }
    }

    /// Message used when a successful response carries none.
    pub fn default_success_message(&self) -> &'static str {
        match self {
            VmAction::Start => "Start command sent",
            VmAction::Shutdown => "Shutdown command sent",
            VmAction::Stop => "Stop command sent",
            VmAction::Reset => "Reset command sent",
        }
    }

    /// The state assumed locally right after the server accepted the action.
    pub fn optimistic_state(&self) -> VmPowerState {
        match self {
            VmAction::Start | VmAction::Reset => VmPowerState::Other("Starting".to_string()),
            VmAction::Shutdown | VmAction::Stop => VmPowerState::Other("Stopping".to_string()),
        }
    }

    /// Whether `state` allows this action.
    pub fn is_allowed_in(&self, state: &VmPowerState) -> bool {
        ActionAvailability::for_state(state).allows(*self)
    }
}

impl fmt::Display for VmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VmAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(VmAction::Start),
            "shutdown" => Ok(VmAction::Shutdown),
            "stop" => Ok(VmAction::Stop),
            "reset" => Ok(VmAction::Reset),
            other => Err(format!("unknown VM action '{}'", other)),
        }
    }
}

/// Which actions are enabled for one VM view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActionAvailability {
    pub start: bool,
    pub shutdown: bool,
    pub stop: bool,
    pub reset: bool,
}

impl ActionAvailability {
    /// Everything disabled, used for unknown states and while an action is in flight.
    pub const NONE: ActionAvailability = ActionAvailability {
        start: false,
        shutdown: false,
        stop: false,
        reset: false,
    };

    pub fn for_state(state: &VmPowerState) -> Self {
        match state {
            VmPowerState::Running => Self {
                start: false,
                shutdown: true,
                stop: true,
                reset: true,
            },
            VmPowerState::Off => Self {
                start: true,
                ..Self::NONE
            },
            VmPowerState::Paused | VmPowerState::Saved => Self {
                start: true,
                stop: true,
                ..Self::NONE
            },
            VmPowerState::Other(_) => Self::NONE,
        }
    }

    pub fn allows(&self, action: VmAction) -> bool {
        match action {
            VmAction::Start => self.start,
            VmAction::Shutdown => self.shutdown,
            VmAction::Stop => self.stop,
            VmAction::Reset => self.reset,
        }
    }

    pub fn enabled(&self) -> Vec<VmAction> {
        VmAction::ALL
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }
}
