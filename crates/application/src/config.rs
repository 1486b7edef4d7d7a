//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "/api";

/// Default namespace for persisted state.
pub const DEFAULT_NAMESPACE: &str = "peach-client";

/// Settings for one client instance.
///
/// # Example
///
/// ```
/// use peach_application::ClientConfig;
///
/// let config = ClientConfig::default().with_base_url("https://v1.peachapi.com");
/// assert_eq!(config.endpoint("/login"), "https://v1.peachapi.com/login");
/// assert_eq!(config.namespace, "peach-client");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root prepended to every endpoint path
    pub base_url: String,
    /// Scheme and host used to resolve a relative `base_url`
    pub origin: Option<Url>,
    /// Namespace the session is persisted under
    pub namespace: String,
    /// Whether to log in with stored credentials right after construction
    pub auto_init: bool,
    /// Delay before the automatic login attempt
    pub init_delay_ms: u64,
    /// Per-request transport timeout
    pub timeout_ms: u64,
    /// Directory for persisted state; the platform data directory if unset
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            origin: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            auto_init: true,
            init_delay_ms: 1,
            timeout_ms: 30_000,
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Sets the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the persisted-state namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Enables or disables the automatic login attempt.
    #[must_use]
    pub const fn with_auto_init(mut self, auto_init: bool) -> Self {
        self.auto_init = auto_init;
        self
    }

    /// Full URL for an endpoint path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Delay before the automatic login attempt.
    #[must_use]
    pub const fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }

    /// Per-request transport timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
