//! Authentication and transport selection for Trino connections.
//!
//! A profile with a password connects over HTTPS with HTTP basic
//! authentication; a profile without one connects over plain HTTP and only
//! identifies the user through the `X-Trino-User` header.

use crate::config::ConnectionProfile;
use std::fmt;

/// Transport used to reach the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Transport {
    /// URL scheme for this transport.
    pub fn scheme(&self) -> &'static str {
        match self {
            Transport::Http => "http",
            Transport::Https => "https",
        }
    }

    /// Whether the transport is encrypted.
    pub fn is_secure(&self) -> bool {
        matches!(self, Transport::Https)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scheme())
    }
}

/// Authentication mode for the session.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No credentials; the user is only asserted.
    Unauthenticated,

    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

impl AuthMode {
    /// Whether credentials are sent.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthMode::Basic { .. })
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Unauthenticated => write!(f, "Unauthenticated"),
            AuthMode::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Transport and authentication derived from a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSecurity {
    pub transport: Transport,
    pub auth: AuthMode,
}

impl ConnectionSecurity {
    /// Select transport and authentication for the profile.
    ///
    /// Secure transport and authentication are enabled together, iff a
    /// non-empty password is present.
    pub fn for_profile(profile: &ConnectionProfile) -> Self {
        match profile.password.as_deref() {
            Some(password) if !password.is_empty() => Self {
                transport: Transport::Https,
                auth: AuthMode::Basic {
                    username: profile.user.clone(),
                    password: password.to_string(),
                },
            },
            _ => Self {
                transport: Transport::Http,
                auth: AuthMode::Unauthenticated,
            },
        }
    }
}

/// Base URL of the coordinator for a profile and transport.
pub fn coordinator_url(profile: &ConnectionProfile, transport: Transport) -> String {
    format!("{}://{}:{}", transport.scheme(), profile.host, profile.port)
}

/// Truncate a string for logging purposes.
///
/// This is a shared utility for safe logging of potentially long strings.
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
