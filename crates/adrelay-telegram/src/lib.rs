// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport and command front end for adrelay.
//!
//! Implements [`Transport`] for the Telegram Bot API via teloxide, and the
//! inbound long-polling ingress feeding fragments to the aggregator and
//! operator commands to the engine.

pub mod commands;
pub mod ingress;
pub mod media;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, Recipient};

use adrelay_config::model::TelegramConfig;
use adrelay_core::types::{AdapterType, HealthStatus, MediaItem, SourceRef};
use adrelay_core::{PluginAdapter, RelayError, Transport};

/// Telegram transport implementing [`Transport`].
///
/// Sends are file-id based: forwards reference the original source message
/// and media groups re-use the stored file ids, so nothing is re-uploaded.
pub struct TelegramTransport {
    bot: Bot,
    config: TelegramConfig,
}

impl TelegramTransport {
    /// Creates a new Telegram transport.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, RelayError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RelayError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;

        if token.is_empty() {
            return Err(RelayError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        Ok(Self { bot, config })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Returns the Telegram configuration this transport was built from.
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    fn transport_err(context: &str, e: teloxide::RequestError) -> RelayError {
        RelayError::Transport {
            message: format!("{context}: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        // Long polling is owned by the ingress task; nothing to release here.
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn forward_message(&self, to_chat: i64, source: &SourceRef) -> Result<i32, RelayError> {
        let sent = self
            .bot
            .forward_message(
                Recipient::Id(ChatId(to_chat)),
                Recipient::Id(ChatId(source.chat_id)),
                MessageId(source.message_id),
            )
            .await
            .map_err(|e| Self::transport_err("failed to forward message", e))?;
        Ok(sent.id.0)
    }

    async fn send_media_group(
        &self,
        to_chat: i64,
        media: &[MediaItem],
        caption: Option<&str>,
    ) -> Result<Vec<i32>, RelayError> {
        let input = media::to_input_media(media, caption);
        let sent = self
            .bot
            .send_media_group(Recipient::Id(ChatId(to_chat)), input)
            .await
            .map_err(|e| Self::transport_err("failed to send media group", e))?;
        Ok(sent.iter().map(|m| m.id.0).collect())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), RelayError> {
        self.bot
            .delete_message(Recipient::Id(ChatId(chat_id)), MessageId(message_id))
            .await
            .map_err(|e| Self::transport_err("failed to delete message", e))?;
        Ok(())
    }

    async fn send_notice(&self, chat_id: i64, text: &str) -> Result<i32, RelayError> {
        let sent = self
            .bot
            .send_message(Recipient::Id(ChatId(chat_id)), text)
            .await
            .map_err(|e| Self::transport_err("failed to send notice", e))?;
        Ok(sent.id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(|s| s.to_string()),
            admin_ids: vec![1],
            source_chats: vec![-100],
            target_chats: vec![-200],
            notify_chat: None,
            footer_links: vec![],
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramTransport::new(make_config(None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramTransport::new(make_config(Some(""))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let transport =
            TelegramTransport::new(make_config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11")));
        assert!(transport.is_ok());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let transport = TelegramTransport::new(make_config(Some("test:token"))).unwrap();
        assert_eq!(transport.name(), "telegram");
        assert_eq!(transport.version(), semver::Version::new(0, 1, 0));
        assert_eq!(transport.adapter_type(), AdapterType::Transport);
    }
}
