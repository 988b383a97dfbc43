//! PIN authorization driven by an embedded browser.
//!
//! The host application shows [`PinFlow::authorize_url`] in a web view and
//! asks [`PinFlow::decide`] about every navigation. Once the site redirects
//! to `/oauth/authorize/<pin>`, the PIN is intercepted and exchanged with
//! [`PinFlow::complete`].

use tracing::{info, warn};
use url::Url;

use crate::api::AuthService;
use crate::{Error, Result};

const AUTHORIZE_SEGMENT: &str = "/oauth/authorize/";

/// What the web view should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Load the page
    Allow,
    /// Stop loading; the page carries this PIN
    Intercept(String),
}

/// How a PIN flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOutcome {
    /// The PIN was exchanged and the token stored
    Authenticated,
    /// The exchange failed; load this URL to start over
    Reload(Url),
    /// The user dismissed the flow
    Cancelled,
}

/// An in-progress PIN authorization.
#[derive(Clone)]
pub struct PinFlow {
    auth: AuthService,
    authorize_url: Url,
}

impl PinFlow {
    pub(crate) fn new(auth: AuthService, site_url: &str, application_id: &str) -> Result<Self> {
        if application_id.is_empty() {
            return Err(Error::Config("PIN flow needs an application id".to_string()));
        }
        let authorize_url = Url::parse(&format!(
            "{}/pin/{}",
            site_url.trim_end_matches('/'),
            application_id
        ))?;
        Ok(Self {
            auth,
            authorize_url,
        })
    }

    /// Page the user authorizes the application on.
    pub fn authorize_url(&self) -> &Url {
        &self.authorize_url
    }

    /// Decide whether to load `url`.
    pub fn decide(&self, url: &Url) -> NavigationDecision {
        match extract_pin(url) {
            Some(pin) => NavigationDecision::Intercept(pin),
            None => NavigationDecision::Allow,
        }
    }

    /// Exchange an intercepted PIN for a token.
    pub async fn complete(&self, pin: &str) -> PinOutcome {
        match self.auth.exchange_pin(pin).await {
            Ok(_) => {
                info!("PIN authorization complete");
                PinOutcome::Authenticated
            }
            Err(e) => {
                warn!(error = %e, "PIN exchange failed; reloading authorization page");
                PinOutcome::Reload(self.authorize_url.clone())
            }
        }
    }

    /// Abandon the flow.
    pub fn cancel(self) -> PinOutcome {
        PinOutcome::Cancelled
    }
}

impl std::fmt::Debug for PinFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinFlow")
            .field("authorize_url", &self.authorize_url.as_str())
            .finish()
    }
}

/// The PIN in `/oauth/authorize/<pin>`, if `url` is that page.
pub fn extract_pin(url: &Url) -> Option<String> {
    let path = url.path();
    if !path.contains(AUTHORIZE_SEGMENT) {
        return None;
    }
    path.split('/')
        .nth(3)
        .filter(|pin| !pin.is_empty())
        .map(str::to_string)
}
