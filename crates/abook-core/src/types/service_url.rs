//! Service endpoint URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, ValidationError};

/// A validated address book service URL.
///
/// The service speaks JSON over HTTP. Remote endpoints must use HTTPS;
/// plain HTTP is accepted for loopback hosts, which is how the service is
/// normally reached on a single machine.
///
/// # Example
///
/// ```
/// use abook_core::ServiceUrl;
///
/// let url = ServiceUrl::new("http://127.0.0.1:8642").unwrap();
/// assert_eq!(url.rpc_url("com.canonical.pim.AddressBook.query"),
///            "http://127.0.0.1:8642/rpc/com.canonical.pim.AddressBook.query");
/// assert_eq!(url.ws_url("com.canonical.pim.AddressBook.subscribe"),
///            "ws://127.0.0.1:8642/rpc/com.canonical.pim.AddressBook.subscribe");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    /// Create a new service URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| ValidationError::ServiceUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the endpoint URL for a given method.
    pub fn rpc_url(&self, method: &str) -> String {
        // The URL crate always adds a trailing slash to root paths.
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/rpc/{}", base, method)
    }

    /// Returns the websocket URL for a streaming method.
    pub fn ws_url(&self, method: &str) -> String {
        let http = self.rpc_url(method);
        if let Some(rest) = http.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = http.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            http
        }
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns true if the endpoint uses TLS.
    pub fn is_secure(&self) -> bool {
        self.0.scheme() == "https"
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(ValidationError::ServiceUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_loopback = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]" || h == "::1");

        if scheme != "https" && !(scheme == "http" && is_loopback) {
            return Err(ValidationError::ServiceUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for loopback hosts)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(ValidationError::ServiceUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServiceUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServiceUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
