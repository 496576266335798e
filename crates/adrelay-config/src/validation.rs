// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-zero intervals and consistent chat lists.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::AdrelayConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &AdrelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate pacing interval and boost cadence are non-zero
    if config.relay.interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "relay.interval_secs must be at least 1".to_string(),
        });
    }

    if config.relay.boost_every == 0 {
        errors.push(ConfigError::Validation {
            message: "relay.boost_every must be at least 1".to_string(),
        });
    }

    // With a bot token configured, the relay needs somewhere to read from
    // and somewhere to send to.
    if config.telegram.bot_token.is_some() {
        if config.telegram.source_chats.is_empty() {
            errors.push(ConfigError::Validation {
                message: "telegram.source_chats must not be empty when a bot token is set"
                    .to_string(),
            });
        }
        if config.telegram.target_chats.is_empty() {
            errors.push(ConfigError::Validation {
                message: "telegram.target_chats must not be empty when a bot token is set"
                    .to_string(),
            });
        }
    }

    // A chat that is both source and target would relay into itself.
    let sources: HashSet<i64> = config.telegram.source_chats.iter().copied().collect();
    for target in &config.telegram.target_chats {
        if sources.contains(target) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "chat {target} appears in both telegram.source_chats and telegram.target_chats"
                ),
            });
        }
    }

    // Footer links must be non-empty strings
    for (i, link) in config.telegram.footer_links.iter().enumerate() {
        if link.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("telegram.footer_links[{i}] must not be empty"),
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

    #[test]
    fn default_config_validates() {
        let config = AdrelayConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = AdrelayConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut config = AdrelayConfig::default();
        config.relay.interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("interval_secs"))));
    }

    #[test]
    fn zero_boost_cadence_fails_validation() {
        let mut config = AdrelayConfig::default();
        config.relay.boost_every = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("boost_every"))));
    }

    #[test]
    fn token_without_chats_fails_validation() {
        let mut config = AdrelayConfig::default();
        config.telegram.bot_token = Some("123:abc".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("source_chats"))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("target_chats"))));
    }

    #[test]
    fn overlapping_source_and_target_fails_validation() {
        let mut config = AdrelayConfig::default();
        config.telegram.source_chats = vec![-100, -200];
        config.telegram.target_chats = vec![-200, -300];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("-200"))));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = AdrelayConfig::default();
        config.telegram.bot_token = Some("123:abc".to_string());
        config.telegram.source_chats = vec![-100];
        config.telegram.target_chats = vec![-200];
        config.telegram.admin_ids = vec![42];
        config.relay.interval_secs = 10;
        assert!(validate_config(&config).is_ok());
    }
}
