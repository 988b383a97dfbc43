//! HTTP client and service layer for the Trakt API.
//!
//! [`TraktClient`] is the main entry point. It submits [`Route`](crate::Route)
//! values through a [`Transport`] and hands out the typed services.
//!
//! # Example
//!
//! ```no_run
//! use trakt_rs::{ClientConfig, Credentials, Environment, TraktClient};
//!
//! # async fn example() -> trakt_rs::Result<()> {
//! let client = TraktClient::with_config(
//!     Credentials::new("client-id", "client-secret"),
//!     ClientConfig::default().with_environment(Environment::Staging),
//! )?;
//!
//! let show = client.media().show("game-of-thrones").await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
pub mod paginated;
pub mod transport;

pub use config::{ClientConfig, Credentials, RetryConfig, API_VERSION};
pub use http::TraktClient;
pub use paginated::{Page, PaginatedStream, PaginationInfo};
pub use transport::{BoxFuture, HttpResponse, ReqwestTransport, Transport};
pub(crate) use http::ClientInner;
