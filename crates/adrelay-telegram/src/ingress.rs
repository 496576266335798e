// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message routing.
//!
//! Messages from configured source chats are converted to fragments and fed
//! to the aggregator; slash commands from operators are executed with a
//! synchronous acknowledgement. Everything else is ignored.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use adrelay_config::model::TelegramConfig;
use adrelay_engine::{Aggregator, Operations};

use crate::commands::{self, Command};
use crate::media;

/// Checks whether the message sender is an operator.
///
/// If `admin_ids` is empty, all commands are rejected (secure default).
/// Messages without a sender (e.g., channel posts) always return `false`.
pub fn is_admin(msg: &Message, admin_ids: &[i64]) -> bool {
    let Some(user) = msg.from.as_ref() else {
        return false;
    };
    admin_ids.contains(&(user.id.0 as i64))
}

/// Start long polling and route inbound messages until the dispatcher
/// stops. Returns the handle of the spawned polling task.
pub fn spawn(
    bot: Bot,
    aggregator: Aggregator,
    ops: Arc<Operations>,
    config: TelegramConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let username = match bot.get_me().await {
            Ok(me) => me.username().to_string(),
            Err(e) => {
                warn!(error = %e, "getMe failed, command mentions will not match");
                String::new()
            }
        };

        let source_chats: Arc<Vec<i64>> = Arc::new(config.source_chats.clone());
        let admin_ids: Arc<Vec<i64>> = Arc::new(config.admin_ids.clone());
        let username = Arc::new(username);

        info!(sources = source_chats.len(), "starting Telegram long polling");

        let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
            let aggregator = aggregator.clone();
            let ops = ops.clone();
            let source_chats = source_chats.clone();
            let admin_ids = admin_ids.clone();
            let username = username.clone();
            async move {
                handle_message(&bot, msg, &aggregator, &ops, &source_chats, &admin_ids, &username)
                    .await;
                respond(())
            }
        });

        Dispatcher::builder(bot, handler)
            .default_handler(|_| async {}) // Silently ignore non-message updates
            .build()
            .dispatch()
            .await;
    })
}

async fn handle_message(
    bot: &Bot,
    msg: Message,
    aggregator: &Aggregator,
    ops: &Operations,
    source_chats: &[i64],
    admin_ids: &[i64],
    bot_username: &str,
) {
    // Source-chat posts are listing fragments, never commands.
    if source_chats.contains(&msg.chat.id.0) {
        let fragment = media::fragment_from_message(&msg);
        if let Err(e) = aggregator.ingest(fragment).await {
            error!(
                chat_id = msg.chat.id.0,
                msg_id = msg.id.0,
                error = %e,
                "failed to ingest fragment"
            );
        }
        return;
    }

    let Some(text) = msg.text() else {
        return;
    };
    if !text.starts_with('/') {
        return;
    }

    if !is_admin(&msg, admin_ids) {
        debug!(chat_id = msg.chat.id.0, "rejecting command from non-operator");
        reply(bot, &msg, "unauthorized command").await;
        return;
    }

    match Command::parse(text, bot_username) {
        Ok(command) => {
            let response = commands::execute(command, ops).await;
            reply(bot, &msg, &response).await;
        }
        Err(e) => {
            debug!(chat_id = msg.chat.id.0, error = %e, "ignoring unrecognized command");
        }
    }
}

async fn reply(bot: &Bot, msg: &Message, text: &str) {
    if let Err(e) = bot.send_message(msg.chat.id, text).await {
        error!(chat_id = msg.chat.id.0, error = %e, "failed to send command reply");
    }
}

/// Publish the operator command menu to Telegram.
pub async fn register_command_menu(bot: &Bot) -> Result<(), adrelay_core::RelayError> {
    bot.set_my_commands(Command::bot_commands())
        .await
        .map_err(|e| adrelay_core::RelayError::Transport {
            message: format!("failed to register bot commands: {e}"),
            source: Some(Box::new(e)),
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_message(user_id: Option<u64>, text: &str) -> Message {
        let mut json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": 555i64,
                "type": "private",
                "first_name": "Op",
            },
            "text": text,
        });
        if let Some(id) = user_id {
            json["from"] = serde_json::json!({
                "id": id,
                "is_bot": false,
                "first_name": "Op",
            });
        }
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    #[test]
    fn admin_by_user_id() {
        let msg = make_message(Some(555), "/start");
        assert!(is_admin(&msg, &[555]));
        assert!(!is_admin(&msg, &[999]));
    }

    #[test]
    fn empty_admin_list_rejects_everyone() {
        let msg = make_message(Some(555), "/start");
        assert!(!is_admin(&msg, &[]));
    }

    #[test]
    fn message_without_sender_is_not_admin() {
        let msg = make_message(None, "/start");
        assert!(!is_admin(&msg, &[555]));
    }
}
