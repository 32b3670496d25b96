//! Tunables shared by the fetcher and the action controllers.

use crate::core::domain::error::ValidationError;
use std::time::Duration;

/// Delay between a successful action and the follow-up inventory refresh.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1500);

/// Client-side request throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.requests_per_second == 0 {
            return Err(ValidationError::Field {
                field: "requests_per_second".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }
        if self.burst_size == 0 {
            return Err(ValidationError::Field {
                field: "burst_size".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Behavioural configuration for a [`crate::DashboardClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Optional throttling of outgoing requests. Disabled by default.
    pub rate_limit: Option<RateLimitConfig>,
    /// How long after a successful VM action the view asks for a full refresh.
    pub refresh_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rate_limit: None,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }
}
