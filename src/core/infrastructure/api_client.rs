//! Internal HTTP client shared by the inventory fetcher and the action controllers.

use crate::core::domain::{
    error::{DashboardError, DashboardResult, ValidationError},
    model::{client_config::ClientConfig, dashboard_connection::DashboardConnection},
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    Client, Method, Response,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// Internal HTTP client that builds endpoint URLs and sends requests.
///
/// It deliberately does not interpret status codes: the inventory fetcher and
/// the action controller each have their own precedence rules for failures.
/// Cookies set by the backend are kept in a shared store so session
/// credentials travel with every request, like a same-origin browser fetch.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<DashboardConnection>,
    config: Arc<ClientConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns `DashboardError::Validation` if the rate limit is misconfigured and
    /// `DashboardError::TransportFailure` if the HTTP client cannot be built.
    pub fn new(connection: DashboardConnection, config: ClientConfig) -> DashboardResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accept_invalid_certs())
            .cookie_store(true)
            .default_headers(default_headers)
            .build()
            .map_err(|e| DashboardError::TransportFailure(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                rl.validate()?;
                let per_second = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    ValidationError::ConstraintViolation("requests_per_second is zero".to_string())
                })?;
                let burst = NonZeroU32::new(rl.burst_size).ok_or_else(|| {
                    ValidationError::ConstraintViolation("burst_size is zero".to_string())
                })?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &DashboardConnection {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a GET to the endpoint formed by `segments`.
    ///
    /// # Errors
    /// Returns `DashboardError::TransportFailure` if the request never completes.
    pub async fn get(&self, segments: &[&str]) -> DashboardResult<Response> {
        self.execute_request(Method::GET, segments).await
    }

    /// Sends an empty-bodied POST to the endpoint formed by `segments`.
    ///
    /// # Errors
    /// Returns `DashboardError::TransportFailure` if the request never completes.
    pub async fn post(&self, segments: &[&str]) -> DashboardResult<Response> {
        self.execute_request(Method::POST, segments).await
    }

    async fn execute_request(&self, method: Method, segments: &[&str]) -> DashboardResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.base_url().endpoint(segments);
        debug!(%method, %url, "sending request");

        let response = self
            .http_client
            .request(method.clone(), url.clone())
            .send()
            .await
            .map_err(|e| DashboardError::TransportFailure(format!("HTTP request failed: {}", e)))?;

        debug!(%method, %url, status = response.status().as_u16(), "response received");
        Ok(response)
    }
}
