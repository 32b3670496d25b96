mod dashboard_url;
pub mod serde_helpers;

pub use dashboard_url::{DashboardUrl, DashboardUrlConfig};
