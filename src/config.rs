use std::env;

use serde::Deserialize;

use crate::db::models::Permission;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sharing: SharingConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Policy knobs for the sharing subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct SharingConfig {
    /// Permission applied when a caller does not specify one.
    pub default_permission: Permission,
    /// Expiry (days) applied to new share links when the caller gives none.
    /// `None` means links without an explicit TTL never expire.
    pub default_link_ttl_days: Option<i64>,
    /// Upper bound on active collaborators per prompt.
    pub max_collaborators: i64,
    /// Whether comment posting is enabled.
    pub allow_comments: bool,
    /// Whether version commits are enabled.
    pub allow_version_history: bool,
    /// Whether notification inserts are enabled.
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// Whether the periodic expired-link sweep worker is enabled.
    pub enabled: bool,
    /// How often (seconds) the sweep worker runs.
    pub interval_seconds: u64,
}

fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/prompt_share.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            sharing: SharingConfig {
                default_permission: match env::var("SHARE_DEFAULT_PERMISSION") {
                    Ok(v) => v
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SHARE_DEFAULT_PERMISSION".to_string()))?,
                    Err(_) => Permission::Read,
                },
                default_link_ttl_days: match env::var("SHARE_DEFAULT_LINK_TTL_DAYS") {
                    Ok(v) => Some(
                        v.parse()
                            .map_err(|_| ConfigError::InvalidValue("SHARE_DEFAULT_LINK_TTL_DAYS".to_string()))?,
                    ),
                    Err(_) => None,
                },
                max_collaborators: env::var("SHARE_MAX_COLLABORATORS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                allow_comments: env_bool("SHARE_ALLOW_COMMENTS", true),
                allow_version_history: env_bool("SHARE_ALLOW_VERSION_HISTORY", true),
                notifications_enabled: env_bool("SHARE_NOTIFICATIONS_ENABLED", true),
            },
            cleanup: CleanupConfig {
                enabled: env_bool("CLEANUP_ENABLED", true),
                interval_seconds: env::var("CLEANUP_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for SharingConfig {
    fn default() -> Self {
        SharingConfig {
            default_permission: Permission::Read,
            default_link_ttl_days: None,
            max_collaborators: 10,
            allow_comments: true,
            allow_version_history: true,
            notifications_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig {
                url: "sqlite://data/prompt_share.db".to_string(),
                max_connections: 5,
            },
            sharing: SharingConfig::default(),
            cleanup: CleanupConfig {
                enabled: true,
                interval_seconds: 3600,
            },
        }
    }
}
