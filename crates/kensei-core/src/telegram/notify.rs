//! Outbound notification gateway
//!
//! Best-effort side effects: every send returns a [`NotifyOutcome`]
//! that call sites log and may discard. A failed notification is never
//! an error path — the workflow state is already durable by the time
//! anything is sent.

use async_trait::async_trait;
use std::path::PathBuf;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto, MessageId,
    ThreadId,
};

use crate::catalog::TrophyInfo;

/// Результат отправки уведомления.
///
/// `Failed` несёт причину для логов; вызывающий код вправе её
/// проигнорировать, но не вправе превратить в ошибку запроса.
#[derive(Debug, Clone)]
pub enum NotifyOutcome {
    Sent,
    Failed(String),
}

impl NotifyOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotifyOutcome::Sent)
    }

    /// Логирует неуспешный исход с контекстом.
    pub fn log(&self, context: &str) {
        if let NotifyOutcome::Failed(reason) = self {
            log::warn!("Notification failed ({}): {}", context, reason);
        }
    }
}

/// Уведомление модераторам о новой заявке на трофей.
#[derive(Debug, Clone)]
pub struct ModerationNotice {
    pub user_id: i64,
    pub psn_id: String,
    pub trophy_id: String,
    /// Метаданные из каталога; None — каталог недоступен, показываем
    /// сырой идентификатор
    pub trophy: Option<TrophyInfo>,
    pub comment: String,
    pub photos: Vec<PathBuf>,
}

impl ModerationNotice {
    /// Текст карточки заявки для модераторов.
    fn caption(&self) -> String {
        let title = match &self.trophy {
            Some(info) => format!("{} {}", info.emoji, info.name),
            None => self.trophy_id.clone(),
        };

        let mut text = format!(
            "🏆 Новая заявка на трофей\n\n{}\n\nИгрок: {} (id {})",
            title, self.psn_id, self.user_id
        );
        if !self.comment.trim().is_empty() {
            text.push_str(&format!("\n\nКомментарий:\n{}", self.comment.trim()));
        }
        text
    }
}

/// Шлюз уведомлений. Реализации обязаны быть fire-and-forget:
/// никаких паник, любая ошибка сворачивается в `NotifyOutcome::Failed`.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Отправляет заявку в модераторскую группу вместе с кнопками
    /// одобрить/отклонить.
    async fn notify_moderators(&self, notice: &ModerationNotice) -> NotifyOutcome;

    /// Отправляет личное уведомление пользователю.
    async fn notify_user(&self, user_id: i64, text: &str) -> NotifyOutcome;
}

/// Боевая реализация поверх Telegram Bot API (teloxide).
pub struct TelegramNotifier {
    bot: Bot,
    group_chat_id: ChatId,
    group_topic_id: Option<i32>,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, group_chat_id: i64, group_topic_id: Option<i32>) -> Self {
        Self {
            bot,
            group_chat_id: ChatId(group_chat_id),
            group_topic_id,
        }
    }

    fn thread_id(&self) -> Option<ThreadId> {
        self.group_topic_id.map(|id| ThreadId(MessageId(id)))
    }

    /// Клавиатура модерации; callback data кодирует (subject, trophy).
    fn moderation_keyboard(user_id: i64, trophy_id: &str) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("✅ Одобрить", format!("trophy_approve:{}:{}", user_id, trophy_id)),
            InlineKeyboardButton::callback("❌ Отклонить", format!("trophy_reject:{}:{}", user_id, trophy_id)),
        ]])
    }

    /// Отправка фото заявки: одно — send_photo, несколько — media
    /// group (Telegram требует 2-10 элементов в группе).
    async fn send_evidence(&self, notice: &ModerationNotice) -> Result<(), teloxide::RequestError> {
        let caption = notice.caption();

        if notice.photos.len() == 1 {
            let mut req = self
                .bot
                .send_photo(self.group_chat_id, InputFile::file(&notice.photos[0]))
                .caption(caption);
            if let Some(thread) = self.thread_id() {
                req = req.message_thread_id(thread);
            }
            req.await?;
        } else {
            let media: Vec<InputMedia> = notice
                .photos
                .iter()
                .enumerate()
                .map(|(i, path)| {
                    let mut photo = InputMediaPhoto::new(InputFile::file(path));
                    if i == 0 {
                        photo = photo.caption(caption.clone());
                    }
                    InputMedia::Photo(photo)
                })
                .collect();

            let mut req = self.bot.send_media_group(self.group_chat_id, media);
            if let Some(thread) = self.thread_id() {
                req = req.message_thread_id(thread);
            }
            req.await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify_moderators(&self, notice: &ModerationNotice) -> NotifyOutcome {
        if let Err(e) = self.send_evidence(notice).await {
            return NotifyOutcome::Failed(format!("media group: {}", e));
        }

        // Кнопки нельзя прикрепить к media group — отдельное сообщение.
        let mut req = self
            .bot
            .send_message(self.group_chat_id, "Решение по заявке:")
            .reply_markup(Self::moderation_keyboard(notice.user_id, &notice.trophy_id));
        if let Some(thread) = self.thread_id() {
            req = req.message_thread_id(thread);
        }

        match req.await {
            Ok(_) => NotifyOutcome::Sent,
            Err(e) => NotifyOutcome::Failed(format!("controls: {}", e)),
        }
    }

    async fn notify_user(&self, user_id: i64, text: &str) -> NotifyOutcome {
        match self.bot.send_message(ChatId(user_id), text).await {
            Ok(_) => NotifyOutcome::Sent,
            Err(e) => NotifyOutcome::Failed(e.to_string()),
        }
    }
}
