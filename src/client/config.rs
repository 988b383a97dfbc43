//! Client configuration and application credentials.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use url::Url;

use crate::{Environment, Error, Result};

/// API version sent in the `trakt-api-version` header.
pub const API_VERSION: &str = "2";

/// Configuration for the Trakt client.
///
/// # Example
///
/// ```
/// use trakt_rs::{ClientConfig, Environment};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_environment(Environment::Staging)
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// assert_eq!(config.base_url, "https://api-staging.trakt.tv");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host, parsed when the client is built
    pub base_url: String,
    /// Environment the base URL belongs to; selects the site URL for PIN
    /// authorization
    pub environment: Environment,
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Value of the `trakt-api-version` header
    pub api_version: String,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: environment.api_base_url().to_string(),
            environment,
            timeout: Duration::from_secs(30),
            user_agent: format!("trakt-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            api_version: API_VERSION.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Target an environment, resetting the base URL to its API host.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self.base_url = environment.api_base_url().to_string();
        self
    }

    /// Override the API host, e.g. for a local mock server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Parse the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UrlParse`] if it is not a valid URL and
    /// [`Error::Config`] if it cannot be a base URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be a base URL", url)));
        }
        Ok(url)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Configuration for automatic retries.
///
/// Routes that allow retry are attempted again on transport failures,
/// timeouts and the configured status codes, with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// HTTP status codes to retry on
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the initial backoff duration.
    pub fn with_initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    /// Set the maximum backoff duration.
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Backoff before retry number `attempt` (0-based).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let backoff_millis = (self.initial_backoff.as_millis() as u64).saturating_mul(factor);
        let max_millis = self.max_backoff.as_millis() as u64;
        Duration::from_millis(backoff_millis.min(max_millis))
    }

    /// Check if a status code should be retried.
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// Check if an error should be retried.
    pub fn should_retry(&self, error: &Error) -> bool {
        match error {
            Error::Transport(_) | Error::Timeout => true,
            Error::RateLimited { .. } => self.retry_statuses.contains(&429),
            Error::Api { status, .. } => self.retry_statuses.contains(status),
            _ => false,
        }
    }
}

/// OAuth application credentials.
///
/// `application_id` is only needed for the PIN flow, which sends the user to
/// `https://trakt.tv/pin/{application_id}`.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth client id, also sent as `trakt-api-key`
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// Numeric application id
    pub application_id: Option<String>,
}

impl Credentials {
    /// Environment variable holding the client id.
    pub const CLIENT_ID_VAR: &'static str = "TRAKT_CLIENT_ID";
    /// Environment variable holding the client secret.
    pub const CLIENT_SECRET_VAR: &'static str = "TRAKT_CLIENT_SECRET";
    /// Environment variable holding the application id.
    pub const APPLICATION_ID_VAR: &'static str = "TRAKT_APPLICATION_ID";

    /// Create credentials without an application id.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            application_id: None,
        }
    }

    /// Set the application id used by the PIN flow.
    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    /// Read credentials from `TRAKT_CLIENT_ID`, `TRAKT_CLIENT_SECRET` and
    /// the optional `TRAKT_APPLICATION_ID`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the id or secret is missing or empty.
    pub fn from_env() -> Result<Self> {
        let client_id = required_var(Self::CLIENT_ID_VAR)?;
        let client_secret = required_var(Self::CLIENT_SECRET_VAR)?;
        let mut credentials = Self::new(client_id, client_secret);
        if let Ok(application_id) = std::env::var(Self::APPLICATION_ID_VAR) {
            if !application_id.is_empty() {
                credentials.application_id = Some(application_id);
            }
        }
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .finish()
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} is not set", name))),
    }
}
