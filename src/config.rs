use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::selector::{DEFAULT_CANDIDATE_POOL_SIZE, DEFAULT_SHORTLIST_SIZE};
use crate::core::{AcceptPolicy, RejectPolicy};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[REDACTED]")
            .field("leeway_secs", &self.leeway_secs)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

fn default_leeway_secs() -> u64 { 30 }
fn default_token_ttl_secs() -> u64 { 60 * 60 * 24 }

/// Which store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_shortlist_size")]
    pub shortlist_size: usize,
    #[serde(default = "default_candidate_pool_size")]
    pub candidate_pool_size: usize,
    /// Return a rejected requester to `none`. Off by default: rejection
    /// otherwise leaves the requester `waiting`.
    #[serde(default)]
    pub release_on_reject: bool,
    /// Refuse an accept while the responder is itself `waiting` or
    /// `accept`. Off by default.
    #[serde(default)]
    pub exclusive_accept: bool,
    #[serde(default)]
    pub store: StoreKind,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            shortlist_size: default_shortlist_size(),
            candidate_pool_size: default_candidate_pool_size(),
            release_on_reject: false,
            exclusive_accept: false,
            store: StoreKind::default(),
        }
    }
}

impl MatchingSettings {
    pub fn accept_policy(&self) -> AcceptPolicy {
        if self.exclusive_accept {
            AcceptPolicy::RequireFreeResponder
        } else {
            AcceptPolicy::Unconditional
        }
    }

    pub fn reject_policy(&self) -> RejectPolicy {
        if self.release_on_reject {
            RejectPolicy::ReleaseRequester
        } else {
            RejectPolicy::KeepStatus
        }
    }
}

fn default_shortlist_size() -> usize { DEFAULT_SHORTLIST_SIZE }
fn default_candidate_pool_size() -> usize { DEFAULT_CANDIDATE_POOL_SIZE }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables on top of loaded config
///
/// `DATABASE_URL` and `JWT_SECRET` take precedence when set.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [database]
        url = "postgres://localhost/matching"

        [auth]
        jwt_secret = "change-me"

        [matching]
        release_on_reject = true
        store = "memory"
    "#;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(SAMPLE, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.matching.shortlist_size, 4);
        assert_eq!(settings.matching.candidate_pool_size, 64);
        assert_eq!(settings.matching.store, StoreKind::Memory);
        assert_eq!(settings.matching.reject_policy(), RejectPolicy::ReleaseRequester);
        assert_eq!(settings.matching.accept_policy(), AcceptPolicy::Unconditional);
        assert_eq!(settings.auth.leeway_secs, 30);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_default_policies() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.reject_policy(), RejectPolicy::KeepStatus);
        assert_eq!(matching.accept_policy(), AcceptPolicy::Unconditional);
    }

    #[test]
    fn test_auth_debug_redacts_secret() {
        let auth = AuthSettings {
            jwt_secret: "hunter2".to_string(),
            leeway_secs: 0,
            token_ttl_secs: 60,
        };
        assert!(!format!("{:?}", auth).contains("hunter2"));
    }
}
