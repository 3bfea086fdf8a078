use std::path::PathBuf;
use std::time::Duration;

/// Client configuration for connecting to the Homify API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:8000/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Quiet window for coalescing filter changes
    pub debounce: Duration,

    /// Where session tokens are persisted, if anywhere
    pub token_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new configuration pointing at the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            debounce: Duration::from_millis(500),
            token_path: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the debounce window for filter changes
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Set the token persistence path
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Build a configuration from HOMIFY_* environment variables,
    /// falling back to defaults for anything unset
    pub fn from_env() -> Self {
        let mut config = match std::env::var("HOMIFY_API_URL") {
            Ok(url) => Self::new(url),
            Err(_) => Self::default(),
        };
        if let Ok(secs) = std::env::var("HOMIFY_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                config.timeout = secs;
            }
        }
        if let Ok(path) = std::env::var("HOMIFY_TOKEN_FILE") {
            config.token_path = Some(PathBuf::from(path));
        }
        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000/api")
    }
}
