use std::fmt;

use serde::{Deserialize, Serialize};

/// The SSID/password pair sent to the device.
///
/// Both fields must be non-empty by the time they are sent; nothing else is
/// validated. Quote characters are passed through verbatim, the device-side
/// parser defines what it accepts.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WifiCredentials {
    /// The network name.
    pub ssid: String,

    /// The network password.
    pub password: String,
}

impl WifiCredentials {
    /// Create credentials.
    pub fn new<S: AsRef<str>>(ssid: S, password: S) -> Self {
        Self {
            ssid: ssid.as_ref().into(),
            password: password.as_ref().into(),
        }
    }

    /// The command the device understands, without the line terminator.
    pub fn command_line(&self) -> String {
        format!("setWifi - '{}' --'{}'", self.ssid, self.password)
    }
}

// Keep the password out of logs.
impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}
