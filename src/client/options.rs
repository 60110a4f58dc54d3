//! Client connection and protocol options.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use lv20_client::ClientOptions;
//!
//! let options = ClientOptions::new()
//!     .with_url("wss://chat.example.org/sockjs/1/abc/websocket")
//!     .with_login_timeout(Duration::from_secs(10))
//!     .with_lang("fr");
//!
//! assert_eq!(options.lang, "fr");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default service endpoint.
pub const DEFAULT_URL: &str = "ws://megacorp.io/sockjs/252/agrjomew/websocket";

/// Protocol version requested in the handshake.
pub const DEFAULT_VERSION: &str = "pre2";

/// Protocol versions advertised in the handshake.
pub const DEFAULT_SUPPORT: [&str; 2] = ["pre2", "pre1"];

// ============================================================================
// ClientOptions
// ============================================================================

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// WebSocket endpoint.
    pub url: String,

    /// Bound on the transport handshake, then on each connect wait.
    pub connect_timeout: Duration,

    /// Bound on the wait for the login to be confirmed.
    pub login_timeout: Duration,

    /// Bound on the wait for the logout to be confirmed.
    pub logout_timeout: Duration,

    /// Fallback re-check interval while waiting on session state.
    pub poll_interval: Duration,

    /// Handshake protocol version.
    pub version: String,

    /// Handshake supported versions.
    pub support: Vec<String>,

    /// Language sent with the login call.
    pub lang: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ClientOptions {
    /// Creates options with the service defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            login_timeout: Duration::from_secs(5),
            logout_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(100),
            version: DEFAULT_VERSION.to_string(),
            support: DEFAULT_SUPPORT.iter().map(ToString::to_string).collect(),
            lang: "en".to_string(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Sets the WebSocket endpoint.
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the login timeout.
    #[inline]
    #[must_use]
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Sets the logout timeout.
    #[inline]
    #[must_use]
    pub fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    /// Sets the state poll interval.
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the handshake version and supported versions.
    #[must_use]
    pub fn with_version(
        mut self,
        version: impl Into<String>,
        support: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.version = version.into();
        self.support = support.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the login language.
    #[inline]
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("Poll interval must be greater than zero".to_string());
        }

        if self.version.trim().is_empty() {
            return Err("Protocol version must not be empty".to_string());
        }

        if !self.support.iter().any(|v| *v == self.version) {
            return Err(format!(
                "Supported versions {:?} must include {}",
                self.support, self.version
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.url, DEFAULT_URL);
        assert_eq!(options.connect_timeout, Duration::from_secs(5));
        assert_eq!(options.login_timeout, Duration::from_secs(5));
        assert_eq!(options.logout_timeout, Duration::from_secs(15));
        assert_eq!(options.poll_interval, Duration::from_millis(100));
        assert_eq!(options.version, "pre2");
        assert_eq!(options.support, vec!["pre2", "pre1"]);
        assert_eq!(options.lang, "en");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let options = ClientOptions::new()
            .with_url("ws://localhost:9000")
            .with_connect_timeout(Duration::from_millis(250))
            .with_logout_timeout(Duration::from_secs(1))
            .with_version("1", ["1", "pre2"]);

        assert_eq!(options.url, "ws://localhost:9000");
        assert_eq!(options.connect_timeout, Duration::from_millis(250));
        assert_eq!(options.logout_timeout, Duration::from_secs(1));
        assert_eq!(options.version, "1");
        assert_eq!(options.support, vec!["1", "pre2"]);
    }

    #[test]
    fn test_validate_rejects_zero_poll() {
        let options = ClientOptions::new().with_poll_interval(Duration::ZERO);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unsupported_version() {
        let options = ClientOptions::new().with_version("pre2", ["pre1"]);
        let err = options.validate().expect_err("should fail");
        assert!(err.contains("pre2"));
    }
}
