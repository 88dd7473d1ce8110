use super::RealtimeClientOptions;
use crate::infrastructure::{endpoint_from_host, websocket_endpoint};
use crate::types::Result;
use crate::types::constants::DEFAULT_PAGE_HOST;
use url::Url;

/// Explicit API base, e.g. `http://localhost:8000/api/v1`
pub const ENV_API_URL: &str = "INVENTORY_API_URL";
/// Host the dashboard is served from, used when no API base is set
pub const ENV_PAGE_HOST: &str = "INVENTORY_PAGE_HOST";
/// `true`/`1` when the page is served over https
pub const ENV_PAGE_SECURE: &str = "INVENTORY_PAGE_SECURE";
/// Credential for the authenticate handshake
pub const ENV_ACCESS_TOKEN: &str = "INVENTORY_ACCESS_TOKEN";

/// Environment-supplied settings for the live-update connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub api_base: Option<String>,
    pub page_host: String,
    pub page_secure: bool,
    pub access_token: Option<String>,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            page_host: DEFAULT_PAGE_HOST.to_string(),
            page_secure: false,
            access_token: None,
        }
    }
}

impl RealtimeConfig {
    /// Reads the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            api_base: get(ENV_API_URL),
            page_host: get(ENV_PAGE_HOST).unwrap_or(defaults.page_host),
            page_secure: get(ENV_PAGE_SECURE)
                .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.page_secure),
            access_token: get(ENV_ACCESS_TOKEN),
        }
    }

    /// Socket URL: derived from the API base when set, else from the page host
    pub fn endpoint(&self) -> Result<Url> {
        match &self.api_base {
            Some(api_base) => websocket_endpoint(api_base),
            None => endpoint_from_host(&self.page_host, self.page_secure),
        }
    }

    pub fn options(&self) -> RealtimeClientOptions {
        RealtimeClientOptions {
            access_token: self.access_token.clone(),
            ..Default::default()
        }
    }
}
