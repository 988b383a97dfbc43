//! HTTP client implementation for the Trakt API.

use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{
    AuthService, DiscoverService, MediaService, PeopleService, SearchService, SyncService,
    UsersService,
};
use crate::auth::{MemoryTokenStore, Token, TokenStore};
use crate::route::Route;
use crate::{Error, Result};

use super::config::{ClientConfig, Credentials};
use super::transport::{HttpResponse, ReqwestTransport, Transport};

const API_KEY_HEADER: &str = "trakt-api-key";
const API_VERSION_HEADER: &str = "trakt-api-version";

/// The main client for interacting with the Trakt API.
///
/// Every request goes through [`submit`](Self::submit), which takes a
/// [`Route`]. The service structs returned by [`auth`](Self::auth),
/// [`sync`](Self::sync) and the other accessors wrap it with typed
/// operations.
///
/// Cloning is cheap; clones share the token slot and transport.
///
/// # Example
///
/// ```no_run
/// use trakt_rs::{Credentials, MediaType, TraktClient};
///
/// # async fn example() -> trakt_rs::Result<()> {
/// let client = TraktClient::new(Credentials::from_env()?)?;
///
/// for movie in client.discover().trending(MediaType::Movies, None).await? {
///     println!("{:?}", movie.title());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TraktClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) credentials: Credentials,
    pub(crate) config: ClientConfig,
    base_url: Url,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<Token>>,
}

impl TraktClient {
    /// Create a client with the default configuration and an in-memory
    /// token store.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client from `TRAKT_CLIENT_ID`, `TRAKT_CLIENT_SECRET` and
    /// `TRAKT_APPLICATION_ID`.
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    /// Create a client with a custom configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Self::with_parts(
            credentials,
            config,
            Arc::new(ReqwestTransport::new(http)),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    /// Create a client from explicit parts.
    ///
    /// The token slot is filled from `store` once, here.
    pub fn with_parts(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        let token = store.load()?;
        if token.is_some() {
            debug!("Loaded stored token");
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                credentials,
                config,
                base_url,
                transport,
                store,
                token: RwLock::new(token),
            }),
        })
    }

    /// Get the authorization service.
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.inner.clone())
    }

    /// Get the trending and recommendations service.
    pub fn discover(&self) -> DiscoverService {
        DiscoverService::new(self.inner.clone())
    }

    /// Get the watchlist, history, collection and ratings service.
    pub fn sync(&self) -> SyncService {
        SyncService::new(self.inner.clone())
    }

    /// Get the movie, show, season and episode service.
    pub fn media(&self) -> MediaService {
        MediaService::new(self.inner.clone())
    }

    /// Get the cast and credits service.
    pub fn people(&self) -> PeopleService {
        PeopleService::new(self.inner.clone())
    }

    /// Get the search service.
    pub fn search(&self) -> SearchService {
        SearchService::new(self.inner.clone())
    }

    /// Get the user profile service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.inner.clone())
    }

    /// Send a route and decode the response body as JSON.
    ///
    /// An empty body decodes to [`Value::Null`].
    ///
    /// # Errors
    ///
    /// - [`Error::AuthorizationRequired`] if the route needs a token and
    ///   none is set; nothing is sent
    /// - [`Error::Transport`] or [`Error::Timeout`] if no response arrived
    /// - [`Error::RateLimited`] or [`Error::Api`] for non-2xx responses
    /// - [`Error::Json`] if the body is not valid JSON
    pub async fn submit(&self, route: &Route) -> Result<Value> {
        self.inner.submit(route).await
    }

    /// Send a route and return the raw response, for callers that read
    /// status codes or headers.
    pub async fn submit_raw(&self, route: &Route) -> Result<HttpResponse> {
        self.inner.submit_raw(route).await
    }

    /// The current token, if any.
    pub async fn token(&self) -> Option<Token> {
        self.inner.token.read().await.clone()
    }

    /// Check whether a token is set.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Replace the token and persist it.
    ///
    /// Requests already in flight keep the token they started with.
    pub async fn set_token(&self, token: Token) -> Result<()> {
        self.inner.set_token(token).await
    }

    /// Drop the token locally and from the store.
    pub async fn clear_token(&self) -> Result<()> {
        self.inner.store.clear()?;
        *self.inner.token.write().await = None;
        info!("Cleared token");
        Ok(())
    }

    /// Application credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl ClientInner {
    pub(crate) async fn set_token(&self, token: Token) -> Result<()> {
        self.store.save(&token)?;
        *self.token.write().await = Some(token);
        info!("Stored new access token");
        Ok(())
    }

    pub(crate) async fn current_token(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    pub(crate) async fn submit(&self, route: &Route) -> Result<Value> {
        let response = self.submit_raw(route).await?;
        decode_body(&response.body)
    }

    pub(crate) async fn submit_raw(&self, route: &Route) -> Result<HttpResponse> {
        // Captured once; a token set while this request runs is not picked up.
        let bearer = if route.needs_authorization() {
            match self.token.read().await.as_ref() {
                Some(token) => Some(token.access_token().clone()),
                None => {
                    return Err(Error::AuthorizationRequired {
                        route: route.name(),
                    })
                }
            }
        } else {
            None
        };

        let retry = &self.config.retry;
        let mut attempt = 0;
        loop {
            match self.send_once(route, bearer.as_ref()).await {
                Err(e)
                    if route.retry_on_failure()
                        && attempt < retry.max_retries
                        && retry.should_retry(&e) =>
                {
                    let delay = retry.backoff_for_attempt(attempt);
                    warn!(
                        route = route.name(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(
        &self,
        route: &Route,
        bearer: Option<&SecretString>,
    ) -> Result<HttpResponse> {
        let mut request = route.prepare(&self.base_url)?;
        debug!(
            route = route.name(),
            method = %request.method(),
            path = request.path(),
            fingerprint = %route.fingerprint(),
            "Submitting request"
        );

        let headers = request.headers_mut();
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            header_value(&self.config.api_version)?,
        );
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            header_value(&self.credentials.client_id)?,
        );
        headers.insert(USER_AGENT, header_value(&self.config.user_agent)?);
        if let Some(token) = bearer {
            let mut value = header_value(&format!("Bearer {}", token.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let response = self.transport.execute(request).await?;
        check_status(route, response)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::InvalidInput(format!("invalid header value: {:?}", value)))
}

fn check_status(route: &Route, response: HttpResponse) -> Result<HttpResponse> {
    let status = response.status;
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .header("retry-after")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(1);
        warn!(route = route.name(), retry_after_secs, "Rate limited");
        return Err(Error::RateLimited { retry_after_secs });
    }

    let body = serde_json::from_slice(&response.body).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&response.body).trim().to_string())
    });
    let error = Error::from_api_response(status.as_u16(), body);
    warn!(route = route.name(), status = status.as_u16(), error = %error, "API error");
    Err(error)
}

pub(crate) fn decode_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

impl std::fmt::Debug for TraktClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraktClient")
            .field("credentials", &self.inner.credentials)
            .field("config", &self.inner.config)
            .finish()
    }
}
