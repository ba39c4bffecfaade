//! Kensei moderation bot
//!
//! Отдельный процесс, независимый от API-сервера: приветствует
//! пользователей кнопкой Mini App и транслирует нажатия модераторских
//! кнопок (одобрить/отклонить) в API.

use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use teloxide::utils::command::BotCommands;

use kensei_core::core::config;

mod relay;

use relay::{ModerationVerdict, Relay};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
enum Command {
    #[command(description = "открыть мини-приложение трофеев")]
    Start,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();
    pretty_env_logger::init();

    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN не установлен");
    }

    log::info!("🤖 Запуск бота модерации трофеев...");
    log::info!("📡 API URL: {}", *config::api::BASE_URL);
    log::info!("🏆 Группа модерации: {}", *config::moderation::GROUP_CHAT_ID);

    let client = reqwest::ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.clone(), client.clone());
    let relay = Arc::new(Relay::new(client, config::api::BASE_URL.clone()));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// /start — приветствие с кнопкой Mini App.
async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            let first_name = msg
                .from
                .as_ref()
                .map(|u| u.first_name.clone())
                .unwrap_or_else(|| "самурай".to_string());

            let welcome = format!(
                "Привет, {}! 👋\n\n\
                Я бот системы трофеев.\n\n\
                🏆 Здесь вы можете:\n\
                • Подавать заявки на получение трофеев\n\
                • Делиться билдами\n\
                • Получать уведомления о статусе заявок\n\n\
                Для начала работы откройте мини-приложение:",
                first_name
            );

            let mut request = bot.send_message(msg.chat.id, welcome);
            if let Ok(app_url) = url::Url::parse(&format!("{}#trophies", *config::MINI_APP_URL)) {
                let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
                    "🏆 Открыть трофеи",
                    WebAppInfo { url: app_url },
                )]]);
                request = request.reply_markup(keyboard);
            }
            request.await?;
        }
    }
    Ok(())
}

/// Кнопки модерации: `trophy_approve:{user_id}:{trophy_id}` /
/// `trophy_reject:{user_id}:{trophy_id}`.
fn parse_moderation_callback(data: &str) -> Option<(ModerationVerdict, i64, &str)> {
    let mut parts = data.splitn(3, ':');
    let verdict = match parts.next()? {
        "trophy_approve" => ModerationVerdict::Approve,
        "trophy_reject" => ModerationVerdict::Reject,
        _ => return None,
    };
    let user_id = parts.next()?.parse().ok()?;
    let trophy_id = parts.next()?;
    Some((verdict, user_id, trophy_id))
}

async fn handle_callback(bot: Bot, q: CallbackQuery, relay: Arc<Relay>) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some((verdict, user_id, trophy_id)) = parse_moderation_callback(data) else {
        log::warn!("Unknown callback data: {}", data);
        return Ok(());
    };

    let text = match relay.moderate(verdict, user_id, trophy_id).await {
        Ok(()) => match verdict {
            ModerationVerdict::Approve => {
                format!("✅ Трофей {} одобрен для пользователя {}", trophy_id, user_id)
            }
            ModerationVerdict::Reject => {
                format!("❌ Трофей {} отклонён для пользователя {}", trophy_id, user_id)
            }
        },
        Err(e) => {
            log::error!("Moderation relay failed for {}:{}: {}", user_id, trophy_id, e);
            format!("⚠️ Ошибка обработки заявки на трофей {}", trophy_id)
        }
    };

    // Кнопки жили на отдельном сообщении — заменяем его итогом
    if let Some(message) = q.message.as_ref() {
        bot.edit_message_text(message.chat().id, message.id(), text).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moderation_callbacks() {
        let (verdict, user_id, trophy_id) =
            parse_moderation_callback("trophy_approve:123456789:wave-50").unwrap();
        assert!(matches!(verdict, ModerationVerdict::Approve));
        assert_eq!(user_id, 123456789);
        assert_eq!(trophy_id, "wave-50");

        let (verdict, _, _) = parse_moderation_callback("trophy_reject:1:x").unwrap();
        assert!(matches!(verdict, ModerationVerdict::Reject));
    }

    #[test]
    fn rejects_malformed_callbacks() {
        assert!(parse_moderation_callback("trophy_approve:notanum:x").is_none());
        assert!(parse_moderation_callback("trophy_approve:1").is_none());
        assert!(parse_moderation_callback("something_else:1:x").is_none());
        assert!(parse_moderation_callback("").is_none());
    }
}
