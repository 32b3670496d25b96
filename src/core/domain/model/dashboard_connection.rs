use crate::core::domain::value_object::DashboardUrl;

/// Where and how to reach the dashboard backend.
#[derive(Debug, Clone)]
pub struct DashboardConnection {
    base_url: DashboardUrl,
    accept_invalid_certs: bool,
}

impl DashboardConnection {
    pub fn new(base_url: DashboardUrl, accept_invalid_certs: bool) -> Self {
        Self {
            base_url,
            accept_invalid_certs,
        }
    }

    pub fn base_url(&self) -> &DashboardUrl {
        &self.base_url
    }

    /// Returns `true` if self-signed or otherwise invalid certificates are tolerated.
    pub fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}
