//! Device-code authorization.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Codes returned by `/oauth/device/code`.
///
/// Show `user_code` and `verification_url` to the user, then poll with
/// `device_code` every `interval` seconds until `expires_in` runs out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceCode {
    /// Code identifying this device when polling
    pub device_code: String,
    /// Code the user types at the verification URL
    pub user_code: String,
    /// Where the user enters `user_code`
    pub verification_url: String,
    /// Seconds until the codes expire
    pub expires_in: u64,
    /// Seconds to wait between polls
    pub interval: u64,
}

impl DeviceCode {
    /// Decode a `/oauth/device/code` response.
    pub fn from_json(data: &Value) -> Result<Self> {
        DeviceCode::deserialize(data)
            .map_err(|e| Error::Decode(format!("invalid device code response: {}", e)))
    }

    /// Polling interval, at least one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    /// Lifetime of the codes.
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

/// Result of one device poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollStatus {
    /// The user has not acted yet (400)
    Pending,
    /// Polling too fast (429)
    SlowDown,
}

/// Map a polling status code to its meaning. `None` means the status is
/// not part of the polling protocol.
pub(crate) fn classify_poll_status(status: u16) -> Option<std::result::Result<PollStatus, Error>> {
    let failure = |reason: &str| Some(Err(Error::Authentication(reason.to_string())));
    match status {
        400 => Some(Ok(PollStatus::Pending)),
        429 => Some(Ok(PollStatus::SlowDown)),
        404 => failure("invalid device code"),
        409 => failure("device code already used"),
        410 => failure("device code expired"),
        418 => failure("user denied the device code"),
        _ => None,
    }
}
