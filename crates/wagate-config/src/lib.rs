// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Wagate gateway.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use wagate_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::WagateConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error the TOML sources are re-read so diagnostics can point
/// at the offending key.
pub fn load_and_validate() -> Result<WagateConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<WagateConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<WagateConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string("wagate.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("wagate.toml").display().to_string())
            .unwrap_or_else(|_| "wagate.toml".to_string());
        sources.push((path, content));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("wagate/wagate.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    let system_path = Path::new("/etc/wagate/wagate.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
