// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, positive timeouts, and resolvable instance phones.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::WagateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &WagateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.dispatch.send_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.send_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.whatsapp.api_base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.api_base_url must not be empty".to_string(),
        });
    }

    let mut seen_ids = HashSet::new();
    for (i, instance) in config.instances.iter().enumerate() {
        if instance.id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("instances[{i}].id must not be empty"),
            });
        } else if !seen_ids.insert(instance.id.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate instance id `{}` in [[instances]]", instance.id),
            });
        }

        if wagate_core::resolve(&instance.phone).is_none() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "instances[{i}].phone `{}` is not a valid phone number",
                    instance.phone
                ),
            });
        }

        if instance.access_token.is_some() && instance.phone_number_id.is_none() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "instances[{i}] has an access_token but no phone_number_id"
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstanceConfig;

    fn instance(id: &str, phone: &str) -> InstanceConfig {
        InstanceConfig {
            id: id.to_string(),
            phone: phone.to_string(),
            phone_number_id: None,
            access_token: None,
        }
    }

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&WagateConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = WagateConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = WagateConfig::default();
        config.dispatch.send_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "send_timeout_secs"));
    }

    #[test]
    fn bad_host_fails_validation() {
        let mut config = WagateConfig::default();
        config.server.host = "not a host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "server.host"));
    }

    #[test]
    fn duplicate_instance_ids_fail_validation() {
        let mut config = WagateConfig::default();
        config.instances = vec![
            instance("abc", "5511999990000"),
            instance("abc", "5511999990001"),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "duplicate instance id"));
    }

    #[test]
    fn unresolvable_phone_fails_validation() {
        let mut config = WagateConfig::default();
        config.instances = vec![instance("abc", "not-a-number")];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "not a valid phone number"));
    }

    #[test]
    fn token_without_phone_number_id_fails_validation() {
        let mut config = WagateConfig::default();
        let mut abc = instance("abc", "5511999990000");
        abc.access_token = Some("token".to_string());
        config.instances = vec![abc];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "phone_number_id"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = WagateConfig::default();
        config.storage.database_path = " ".to_string();
        config.dispatch.send_timeout_secs = 0;
        config.instances = vec![instance("", "x")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
