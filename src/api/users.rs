//! User profiles.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::client::ClientInner;
use crate::route::Route;
use crate::{Error, Result};

/// Service for user profiles.
pub struct UsersService {
    inner: Arc<ClientInner>,
}

impl UsersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Profile of `user`, or of the authenticated user when `None`.
    pub async fn profile(&self, user: Option<&str>) -> Result<Map<String, Value>> {
        let data = self
            .inner
            .submit(&Route::Profile(user.map(str::to_string)))
            .await?;
        match data {
            Value::Object(profile) => Ok(profile),
            _ => Err(Error::Decode("profile response is not an object".to_string())),
        }
    }
}
