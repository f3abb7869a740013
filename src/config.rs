//! Configuration management for the Trino MCP Server.
//!
//! Configuration is loaded from environment variables following the 12-factor
//! app pattern. The profile is resolved per request, so every entry point sees
//! the environment as it is at call time.

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT};
use crate::error::ServerError;
use std::fmt;

/// Environment variable names.
pub mod env {
    pub const HOST: &str = "TRINO_HOST";
    pub const PORT: &str = "TRINO_PORT";
    pub const USER: &str = "TRINO_USER";
    pub const PASSWORD: &str = "TRINO_PASSWORD";
    pub const CATALOG: &str = "TRINO_CATALOG";
    pub const SCHEMA: &str = "TRINO_SCHEMA";
}

/// Validated connection settings for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Trino coordinator hostname or IP address
    pub host: String,

    /// Trino coordinator port (default: 8080)
    pub port: u16,

    /// User the session runs as
    pub user: String,

    /// Password; presence switches to HTTPS + basic authentication
    pub password: Option<String>,

    /// Catalog for unqualified names
    pub catalog: String,

    /// Schema for unqualified names
    pub schema: String,
}

impl ConnectionProfile {
    /// Load the profile from environment variables.
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `TRINO_USER`: User the session runs as
    /// - `TRINO_CATALOG`: Catalog to bind the session to
    /// - `TRINO_SCHEMA`: Schema to bind the session to
    ///
    /// ## Optional
    /// - `TRINO_HOST`: Coordinator hostname (default: localhost)
    /// - `TRINO_PORT`: Coordinator port (default: 8080)
    /// - `TRINO_PASSWORD`: Enables HTTPS with basic authentication
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the profile from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get(env::HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get(env::PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ServerError::config(format!("{} must be a valid port number, got '{}'", env::PORT, raw))
            })?,
            None => DEFAULT_PORT,
        };

        let user = get(env::USER);
        let password = get(env::PASSWORD);
        let catalog = get(env::CATALOG);
        let schema = get(env::SCHEMA);

        let mut missing = Vec::new();
        if user.is_none() {
            missing.push(env::USER);
        }
        if catalog.is_none() {
            missing.push(env::CATALOG);
        }
        if schema.is_none() {
            missing.push(env::SCHEMA);
        }
        if port == 0 {
            missing.push(env::PORT);
        }

        match (user, catalog, schema) {
            (Some(user), Some(catalog), Some(schema)) if missing.is_empty() => Ok(Self {
                host,
                port,
                user,
                password,
                catalog,
                schema,
            }),
            _ => Err(ServerError::config(format!(
                "Missing required Trino configuration: {}",
                missing.join(", ")
            ))),
        }
    }

    /// Whether the profile carries credentials.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// `catalog.schema`, the namespace tables are listed and sampled from.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.catalog, self.schema)
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .finish()
    }
}

impl fmt::Display for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}.{} as {}",
            self.host, self.port, self.catalog, self.schema, self.user
        )
    }
}

/// Source of the connection profile, consulted once per request.
pub trait ProfileResolver: Send + Sync {
    /// Produce a validated profile or fail with a configuration error.
    fn resolve(&self) -> Result<ConnectionProfile, ServerError>;
}

/// Resolves the profile from the process environment on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProfileResolver;

impl ProfileResolver for EnvProfileResolver {
    fn resolve(&self) -> Result<ConnectionProfile, ServerError> {
        ConnectionProfile::from_env()
    }
}

impl ProfileResolver for ConnectionProfile {
    fn resolve(&self) -> Result<ConnectionProfile, ServerError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full() -> Vec<(&'static str, &'static str)> {
        vec![
            (env::HOST, "trino.internal"),
            (env::PORT, "8443"),
            (env::USER, "analyst"),
            (env::PASSWORD, "s3cret"),
            (env::CATALOG, "hive"),
            (env::SCHEMA, "sales"),
        ]
    }

    #[test]
    fn test_full_profile() {
        let profile = ConnectionProfile::from_lookup(lookup_from(&full())).unwrap();
        assert_eq!(profile.host, "trino.internal");
        assert_eq!(profile.port, 8443);
        assert_eq!(profile.user, "analyst");
        assert_eq!(profile.password.as_deref(), Some("s3cret"));
        assert_eq!(profile.namespace(), "hive.sales");
        assert!(profile.has_password());
    }

    #[test]
    fn test_defaults_applied() {
        let profile = ConnectionProfile::from_lookup(lookup_from(&[
            (env::USER, "analyst"),
            (env::CATALOG, "hive"),
            (env::SCHEMA, "sales"),
        ]))
        .unwrap();
        assert_eq!(profile.host, "localhost");
        assert_eq!(profile.port, 8080);
        assert_eq!(profile.password, None);
        assert!(!profile.has_password());
    }

    #[test]
    fn test_each_required_field_missing_fails() {
        for key in [env::USER, env::CATALOG, env::SCHEMA] {
            let pairs: Vec<_> = full().into_iter().filter(|(k, _)| *k != key).collect();
            let err = ConnectionProfile::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(matches!(err, ServerError::Config(_)), "{key}");
            assert!(err.to_string().contains(key), "{key}");
        }
    }

    #[test]
    fn test_blank_required_field_fails() {
        let mut pairs = full();
        pairs.retain(|(k, _)| *k != env::CATALOG);
        pairs.push((env::CATALOG, "   "));
        let err = ConnectionProfile::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_invalid_port_fails() {
        let mut pairs = full();
        pairs.retain(|(k, _)| *k != env::PORT);
        pairs.push((env::PORT, "eighty"));
        let err = ConnectionProfile::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("TRINO_PORT"));

        let mut pairs = full();
        pairs.retain(|(k, _)| *k != env::PORT);
        pairs.push((env::PORT, "0"));
        assert!(ConnectionProfile::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let profile = ConnectionProfile::from_lookup(lookup_from(&full())).unwrap();
        let debug = format!("{:?}", profile);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(profile.to_string(), "trino.internal:8443/hive.sales as analyst");
    }

    #[test]
    #[serial]
    fn test_env_resolver_reads_process_env() {
        std::env::set_var(env::USER, "env-user");
        std::env::set_var(env::CATALOG, "memory");
        std::env::set_var(env::SCHEMA, "default");
        std::env::remove_var(env::PASSWORD);

        let profile = EnvProfileResolver.resolve().unwrap();
        assert_eq!(profile.user, "env-user");
        assert_eq!(profile.namespace(), "memory.default");

        std::env::remove_var(env::SCHEMA);
        assert!(EnvProfileResolver.resolve().is_err());

        std::env::remove_var(env::USER);
        std::env::remove_var(env::CATALOG);
    }
}
