use crate::core::domain::error::{DashboardResult, ValidationError};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Represents the configuration for a dashboard base URL value object
///
/// This configuration object encapsulates the constraints for URL
/// validation according to RFC 3986 and the backend's requirements.
#[derive(Debug, Clone)]
pub struct DashboardUrlConfig {
    allowed_schemes: HashSet<String>,
    max_length: usize,
}

impl DashboardUrlConfig {
    fn validate_url(&self, raw: &str) -> Result<Url, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Field {
                field: "base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }

        if raw.len() > self.max_length {
            return Err(ValidationError::Format(format!(
                "URL exceeds maximum length of {} characters",
                self.max_length
            )));
        }

        let url = Url::parse(raw.trim())
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

        if !self.allowed_schemes.contains(url.scheme()) {
            let mut schemes: Vec<&str> = self.allowed_schemes.iter().map(String::as_str).collect();
            schemes.sort_unstable();
            return Err(ValidationError::ConstraintViolation(format!(
                "Invalid scheme. Must be one of: {}",
                schemes.join(", ")
            )));
        }

        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ValidationError::ConstraintViolation(
                "URL must have a host".to_string(),
            ));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(ValidationError::ConstraintViolation(
                "Base URL cannot carry a query or fragment".to_string(),
            ));
        }

        Ok(url)
    }
}

impl Default for DashboardUrlConfig {
    fn default() -> Self {
        let mut schemes = HashSet::new();
        schemes.insert("https".to_string());
        schemes.insert("http".to_string());

        Self {
            allowed_schemes: schemes,
            max_length: 2083, // RFC 7230 standard
        }
    }
}

/// A validated base URL of the dashboard backend.
///
/// Endpoints are composed segment by segment so host and VM names are
/// percent-encoded and can never escape their path position.
///
/// # Examples
///
/// ```
/// use vm_inventory::DashboardUrl;
///
/// let base = DashboardUrl::new("https://dash.example.com").unwrap();
/// let url = base.endpoint(&["api", "v1", "vms", "hv 01", "web/1", "start"]);
/// assert_eq!(
///     url.as_str(),
///     "https://dash.example.com/api/v1/vms/hv%2001/web%2F1/start"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardUrl {
    value: Url,
}

impl DashboardUrl {
    /// Parses and validates a base URL with the default configuration.
    pub fn new(raw: impl AsRef<str>) -> DashboardResult<Self> {
        Self::with_config(raw, &DashboardUrlConfig::default())
    }

    pub fn with_config(raw: impl AsRef<str>, config: &DashboardUrlConfig) -> DashboardResult<Self> {
        let value = config.validate_url(raw.as_ref())?;
        Ok(Self { value })
    }

    /// Builds an absolute endpoint URL by appending `segments` to the base path.
    ///
    /// Segments are percent-encoded, but `.` and `..` are dropped by path
    /// normalization, so callers passing untrusted names must refuse them.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.value.clone();
        // Bases are validated to be hierarchical, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn as_url(&self) -> &Url {
        &self.value
    }
}

impl fmt::Display for DashboardUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value.as_str())
    }
}
