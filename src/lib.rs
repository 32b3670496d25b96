mod actions;
mod availability;
mod core;
mod dashboard;
mod inventory;

pub use crate::{
    actions::application::service::{
        action_service::{ActionService, VmActionApi},
        refresh_scheduler::{ChannelRefreshScheduler, RefreshRequest, RefreshScheduler},
        vm_action_controller::{
            ActionFeedback, ActionOutcome, FeedbackSeverity, SkipReason, VmActionController,
        },
    },
    availability::application::service::{
        availability_resolver::{AvailabilityOptions, derive_vm_availability},
        normalization::{normalize_boolean, sanitize_cluster_name},
    },
    core::domain::{
        error::{DashboardError, DashboardResult, ValidationError},
        model::{
            availability::{AvailabilitySource, AvailabilityVerdict},
            client_config::{ClientConfig, DEFAULT_REFRESH_DELAY, RateLimitConfig},
            cluster::Cluster,
            dashboard_connection::DashboardConnection,
            host::{Host, HostIndex},
            inventory_snapshot::InventorySnapshot,
            statistics::Statistics,
            virtual_machine::{VirtualMachine, VmPowerState},
            vm_action::{ActionAvailability, VmAction},
        },
        value_object::{DashboardUrl, DashboardUrlConfig},
    },
    dashboard::{
        context::DashboardContext,
        view::{
            ClusterRow, HostRow, OverviewSummary, ViewKind, ViewPayload, VmRow, render_view,
        },
    },
    inventory::application::service::inventory_service::InventoryService,
};
use crate::core::infrastructure::api_client::ApiClient;
use std::sync::Arc;
use std::time::Duration;


/// A client for a virtualization inventory dashboard backend.
///
/// One client shares a single HTTP session (cookie jar, TLS settings and
/// optional rate limiter) between the inventory fetcher and every VM action.
///
/// # Examples
///
/// ```no_run
/// use vm_inventory::{DashboardClient, DashboardResult};
///
/// #[tokio::main]
/// async fn main() -> DashboardResult<()> {
///     let client = DashboardClient::builder()
///         .base_url("https://dashboard.example.com")?
///         .accept_invalid_certs(false)
///         .build()?;
///
///     let snapshot = client.fetch_inventory().await?;
///     println!("{} hosts online", snapshot.hosts().len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DashboardClient {
    api_client: Arc<ApiClient>,
}

/// Builder for DashboardClient configuration
#[derive(Debug, Default)]
pub struct DashboardClientBuilder {
    base_url: Option<String>,
    accept_invalid_certs: bool,
    config: ClientConfig,
}

impl DashboardClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> DashboardResult<Self> {
        self.base_url = Some(base_url.into());
        Ok(self)
    }

    /// Accepts self-signed certificates. Only meant for lab setups.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> DashboardResult<Self> {
        let rate_limit = RateLimitConfig {
            requests_per_second,
            burst_size,
        };
        rate_limit.validate()?;
        self.config.rate_limit = Some(rate_limit);
        Ok(self)
    }

    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.config.refresh_delay = delay;
        self
    }

    pub fn build(self) -> DashboardResult<DashboardClient> {
        let base_url = DashboardUrl::new(self.base_url.ok_or_else(|| {
            DashboardError::Validation(ValidationError::Field {
                field: "base_url".to_string(),
                message: "Base URL is required".to_string(),
            })
        })?)?;

        let connection = DashboardConnection::new(base_url, self.accept_invalid_certs);
        let api_client = ApiClient::new(connection, self.config)?;

        Ok(DashboardClient {
            api_client: Arc::new(api_client),
        })
    }
}

impl DashboardClient {
    /// Creates a new builder for DashboardClient configuration
    pub fn builder() -> DashboardClientBuilder {
        DashboardClientBuilder::default()
    }

    pub fn base_url(&self) -> &DashboardUrl {
        self.api_client.connection().base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        self.api_client.config()
    }

    pub fn inventory_service(&self) -> InventoryService {
        InventoryService::new(Arc::clone(&self.api_client))
    }

    pub fn action_service(&self) -> ActionService {
        ActionService::new(Arc::clone(&self.api_client))
    }

    /// Fetches all four collections and reconciles them into one snapshot.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// - Any endpoint answers 401 (`AuthRequired`)
    /// - An endpoint is unreachable or answers a non-2xx status
    /// - A body is not valid JSON
    pub async fn fetch_inventory(&self) -> DashboardResult<InventorySnapshot> {
        self.inventory_service().fetch_inventory().await
    }

    /// Builds an action controller for `vm` wired to this client's session.
    pub fn controller(
        &self,
        vm: VirtualMachine,
        scheduler: Arc<dyn RefreshScheduler>,
    ) -> VmActionController {
        VmActionController::new(
            vm,
            Arc::new(self.action_service()),
            scheduler,
            self.config().refresh_delay,
        )
    }

    /// Builds a dashboard context that refreshes through this client.
    pub fn context(&self, scheduler: Arc<dyn RefreshScheduler>) -> DashboardContext {
        DashboardContext::new(
            self.inventory_service(),
            Arc::new(self.action_service()),
            scheduler,
            self.config().refresh_delay,
        )
    }
}
