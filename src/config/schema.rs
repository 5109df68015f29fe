use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Server configuration.
///
/// Every section is optional; omitted values fall back to the defaults below.
///
/// Example YAML:
/// ```yaml
/// server:
///   bind: "0.0.0.0:3000"
///   anonymous_nickname: "Anonymous"
/// storage:
///   backend: file
///   path: "/var/lib/card-trio/sessions.json"
///   retry_attempts: 3
///   retry_delay: "50ms"
/// leaderboard:
///   default_limit: 10
///   max_limit: 100
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Nickname used when a submission carries no `x-user-nickname` header
    #[serde(default = "default_anonymous_nickname")]
    pub anonymous_nickname: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            anonymous_nickname: default_anonymous_nickname(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Session file for the `file` backend (defaults to the user data dir)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Attempts per store write before the submission is reported as failed
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// First backoff delay between attempts, e.g. "50ms"
    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
            retry_attempts: default_retry_attempts(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl StorageConfig {
    /// Parsed `retry_delay`. Call after validation.
    pub fn retry_delay(&self) -> Option<Duration> {
        humantime::parse_duration(self.retry_delay.trim()).ok()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_anonymous_nickname() -> String {
    "Anonymous".to_string()
}

fn default_retry_attempts() -> usize {
    3
}

fn default_retry_delay() -> String {
    "50ms".to_string()
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}
