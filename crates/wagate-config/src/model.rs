// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Wagate gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Wagate configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WagateConfig {
    /// HTTP listener and logging settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dispatch pipeline settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// WhatsApp Cloud API transport settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Accounts served by this process.
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

/// HTTP listener configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bearer token required on API routes. `None` rejects every API call.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8900
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("wagate").join("wagate.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("wagate.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Dispatch pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Upper bound on waiting for the network acknowledgment of one send.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_send_timeout_secs() -> u64 {
    30
}

/// WhatsApp Cloud API transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Graph API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Graph API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_version: default_api_version(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v21.0".to_string()
}

/// One account served by the gateway (`[[instances]]`).
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    /// Instance identifier used in request paths.
    pub id: String,

    /// The account's own phone number.
    pub phone: String,

    /// Cloud API phone number id. Required for the instance to authenticate.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Cloud API access token. Without it the instance stays pending.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("id", &self.id)
            .field("phone", &self.phone)
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}
