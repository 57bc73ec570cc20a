use std::fmt;
use std::time::Duration;
use url::Url;

pub const ONE_GB_IN_BYTES: usize = 1024 * 1024 * 1024;
pub const DEFAULT_URL: &str = "https://localhost:9200";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("password cannot be empty")]
    EmptyPassword,
    #[error("Elasticsearch url parse failed: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Everything one maintenance pass needs to know about the cluster.
#[derive(Clone)]
pub struct MaintenanceConfig {
    pub url: Url,
    pub username: String,
    pub password: String,
    /// Skip certificate validation
    pub disable_ssl: bool,
    /// Indices with a larger store size are rolled over
    pub max_size_bytes: usize,
    /// Deadline for the whole pass
    pub timeout: Duration,
}

impl MaintenanceConfig {
    /// Validate the connection settings. A `max_size_bytes` of 0 falls back
    /// to 1GB.
    pub fn new(
        url: &str, username: &str, password: &str, disable_ssl: bool,
        max_size_bytes: usize,
    ) -> Result<Self, ConfigError> {
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        let url = Url::parse(url)?;
        let max_size_bytes = if max_size_bytes == 0 {
            ONE_GB_IN_BYTES
        } else {
            max_size_bytes
        };
        Ok(MaintenanceConfig {
            url,
            username: username.to_string(),
            password: password.to_string(),
            disable_ssl,
            max_size_bytes,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for MaintenanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaintenanceConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("disable_ssl", &self.disable_ssl)
            .field("max_size_bytes", &self.max_size_bytes)
            .field("timeout", &self.timeout)
            .finish()
    }
}
