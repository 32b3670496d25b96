use thiserror::Error;

/// The main error type for dashboard operations.
///
/// This enum represents every failure the inventory fetcher and the
/// action layer can observe. Fetch errors are returned to the caller;
/// action errors are folded into controller feedback instead.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// At least one collection endpoint answered `401 Unauthorized`.
    ///
    /// This takes precedence over every other fetch error.
    #[error("Authentication required")]
    AuthRequired,

    /// The first non-success status encountered, in fixed endpoint order.
    ///
    /// # Fields
    /// * `status` - The HTTP status code returned by the backend
    #[error("HTTP failure: status {status}")]
    HttpFailure { status: u16 },

    /// A response body was not valid JSON for the expected shape.
    ///
    /// # Fields
    /// * `endpoint` - The API path whose body failed to parse
    /// * `message` - The deserializer's description of the problem
    #[error("Failed to parse response from {endpoint}: {message}")]
    ParseFailure { endpoint: String, message: String },

    /// The request never completed (connection refused, reset, DNS, ...).
    ///
    /// # Fields
    /// * `0` - The underlying transport error text
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// An action endpoint answered with a non-success status.
    ///
    /// # Fields
    /// * `status` - The HTTP status code returned by the backend
    /// * `message` - The human message extracted from the response body, if any
    #[error("Action rejected ({status}): {}", message.as_deref().unwrap_or("no details"))]
    ActionRejected {
        status: u16,
        message: Option<String>,
    },

    /// Represents invalid client configuration.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl DashboardError {
    /// Returns `true` when the caller should send the user through login again.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, DashboardError::AuthRequired)
    }
}

/// Specialized error type for configuration validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a DashboardError
pub type DashboardResult<T> = Result<T, DashboardError>;
