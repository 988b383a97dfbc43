//! Authorization for the Trakt API.
//!
//! Trakt issues OAuth tokens through two flows:
//!
//! 1. **Device code** - the user enters a short code at
//!    `https://trakt.tv/activate` while the client polls for the token
//! 2. **PIN** - the user authorizes in a browser and the resulting PIN is
//!    exchanged for a token
//!
//! Either way the token lands in the client's single token slot and is
//! persisted through a [`TokenStore`].
//!
//! # Device Code
//!
//! ```no_run
//! use trakt_rs::TraktClient;
//!
//! # async fn example(client: TraktClient) -> trakt_rs::Result<()> {
//! let code = client.auth().device_code().await?;
//! println!("Go to {} and enter {}", code.verification_url, code.user_code);
//! client.auth().wait_for_device(&code).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # PIN
//!
//! ```no_run
//! use trakt_rs::{NavigationDecision, TraktClient};
//!
//! # async fn example(client: TraktClient, next: url::Url) -> trakt_rs::Result<()> {
//! let flow = client.auth().pin_flow()?;
//! // show flow.authorize_url() in a web view, then for each navigation:
//! if let NavigationDecision::Intercept(pin) = flow.decide(&next) {
//!     let outcome = flow.complete(&pin).await;
//! }
//! # Ok(())
//! # }
//! ```

mod device;
mod pin;
mod token;

pub use device::DeviceCode;
pub(crate) use device::{classify_poll_status, PollStatus};
pub use pin::{extract_pin, NavigationDecision, PinFlow, PinOutcome};
pub use token::{FileTokenStore, MemoryTokenStore, Token, TokenStore};
