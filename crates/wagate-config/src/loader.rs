// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wagate.toml` > `~/.config/wagate/wagate.toml` > `/etc/wagate/wagate.toml`
//! with environment variable overrides via `WAGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::WagateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wagate/wagate.toml`
/// 3. `~/.config/wagate/wagate.toml`
/// 4. `./wagate.toml`
/// 5. `WAGATE_*` environment variables
pub fn load_config() -> Result<WagateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<WagateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WagateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WagateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WagateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for XDG config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WagateConfig::default()))
        .merge(Toml::file("/etc/wagate/wagate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("wagate/wagate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("wagate.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `WAGATE_SERVER_BEARER_TOKEN`
/// must map to `server.bearer_token`, not `server.bearer.token`.
fn env_provider() -> Env {
    Env::prefixed("WAGATE_").map(|key| {
        // Keys arrive as written in the environment, i.e. uppercase.
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("whatsapp_", "whatsapp.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("wagate.toml", "[server]\nport = 9000\n")?;
            jail.set_env("WAGATE_SERVER_BEARER_TOKEN", "from-env");
            jail.set_env("WAGATE_DISPATCH_SEND_TIMEOUT_SECS", "5");

            let config = load_config_from_path(Path::new("wagate.toml"))?;
            assert_eq!(config.server.port, 9000);
            assert_eq!(config.server.bearer_token.as_deref(), Some("from-env"));
            assert_eq!(config.dispatch.send_timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn env_beats_file_for_same_key() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("wagate.toml", "[storage]\ndatabase_path = \"file.db\"\n")?;
            jail.set_env("WAGATE_STORAGE_DATABASE_PATH", "env.db");

            let config = load_config_from_path(Path::new("wagate.toml"))?;
            assert_eq!(config.storage.database_path, "env.db");
            Ok(())
        });
    }

    #[test]
    fn uppercase_env_keys_reach_every_section() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("wagate.toml", "")?;
            jail.set_env("WAGATE_SERVER_PORT", "9200");
            jail.set_env("WAGATE_WHATSAPP_API_VERSION", "v21.0");

            let config = build_figment().extract::<WagateConfig>()?;
            assert_eq!(config.server.port, 9200);
            assert_eq!(config.whatsapp.api_version, "v21.0");
            Ok(())
        });
    }
}
