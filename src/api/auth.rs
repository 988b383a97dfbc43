//! Authorization service: token exchange, refresh and device flow.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::auth::{classify_poll_status, DeviceCode, PinFlow, PollStatus, Token};
use crate::client::ClientInner;
use crate::route::Route;
use crate::{Error, Result};

/// Service for obtaining and refreshing user tokens.
///
/// Every successful exchange stores the token in the client's slot and
/// persists it through the configured token store.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: trakt_rs::TraktClient) -> trakt_rs::Result<()> {
/// let code = client.auth().device_code().await?;
/// println!("Enter {} at {}", code.user_code, code.verification_url);
///
/// let token = client.auth().wait_for_device(&code).await?;
/// assert!(client.is_authenticated().await);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<ClientInner>,
}

impl AuthService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Start a PIN flow for this application.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the credentials carry no application id.
    pub fn pin_flow(&self) -> Result<PinFlow> {
        let application_id = self
            .inner
            .credentials
            .application_id
            .as_deref()
            .ok_or_else(|| Error::Config("PIN flow needs an application id".to_string()))?;
        PinFlow::new(
            self.clone(),
            self.inner.config.environment.site_url(),
            application_id,
        )
    }

    /// Exchange a PIN for a token.
    pub async fn exchange_pin(&self, pin: &str) -> Result<Token> {
        let credentials = &self.inner.credentials;
        let route = Route::Token {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            pin: pin.to_string(),
        };
        self.acquire(&route).await
    }

    /// Exchange the current refresh token for a new token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if no token with a refresh token is
    /// set.
    pub async fn refresh(&self) -> Result<Token> {
        let refresh_token = self
            .inner
            .current_token()
            .await
            .and_then(|token| token.refresh_token().cloned())
            .ok_or_else(|| Error::Authentication("no refresh token available".to_string()))?;

        let credentials = &self.inner.credentials;
        let route = Route::RefreshToken {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            refresh_token,
        };
        self.acquire(&route).await
    }

    /// Request device and user codes.
    pub async fn device_code(&self) -> Result<DeviceCode> {
        let route = Route::GenerateCode {
            client_id: self.inner.credentials.client_id.clone(),
        };
        let data = self.inner.submit(&route).await?;
        DeviceCode::from_json(&data)
    }

    /// Poll once for the token of a device code.
    ///
    /// Returns `Ok(None)` while the user has not approved yet or when the
    /// API asks to slow down, and stores the token once it is issued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the code is invalid, already
    /// used, expired or denied.
    pub async fn poll_device(&self, code: &DeviceCode) -> Result<Option<Token>> {
        let credentials = &self.inner.credentials;
        let route = Route::PollDevice {
            device_code: code.device_code.clone(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
        };

        match self.inner.submit(&route).await {
            Ok(data) => {
                let token = Token::from_json(&data)?;
                self.inner.set_token(token.clone()).await?;
                info!("Device authorized");
                Ok(Some(token))
            }
            Err(e) => {
                let status = match &e {
                    Error::Api { status, .. } => *status,
                    Error::RateLimited { .. } => 429,
                    _ => return Err(e),
                };
                match classify_poll_status(status) {
                    Some(Ok(PollStatus::Pending)) => {
                        debug!("Device authorization pending");
                        Ok(None)
                    }
                    Some(Ok(PollStatus::SlowDown)) => {
                        debug!("Device polling too fast");
                        Ok(None)
                    }
                    Some(Err(reason)) => Err(reason),
                    None => Err(e),
                }
            }
        }
    }

    /// Poll every `interval` seconds until the user approves the device or
    /// the codes expire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] when the codes expire or are
    /// rejected.
    pub async fn wait_for_device(&self, code: &DeviceCode) -> Result<Token> {
        let deadline = Instant::now() + code.lifetime();
        loop {
            if let Some(token) = self.poll_device(code).await? {
                return Ok(token);
            }
            if Instant::now() + code.poll_interval() > deadline {
                return Err(Error::Authentication("device code expired".to_string()));
            }
            tokio::time::sleep(code.poll_interval()).await;
        }
    }

    async fn acquire(&self, route: &Route) -> Result<Token> {
        let data = self.inner.submit(route).await?;
        let token = Token::from_json(&data)?;
        self.inner.set_token(token.clone()).await?;
        info!(route = route.name(), "Access token acquired");
        Ok(token)
    }
}
