//! Trophy submission workflow
//!
//! State machine over submission records: submit → pending →
//! approved/rejected, with notifications at each transition. The
//! moderator-facing notification is only sent after the submission is
//! durably stored — it must never reference a record that does not yet
//! exist.
//!
//! Concurrency: no locking here. A concurrent approve + reject on the
//! same (user, trophy) pair is a last-writer-wins race on the stored
//! status; the trophy set-add itself is idempotent, so the profile
//! cannot end up with duplicates either way.

use std::sync::Arc;

use crate::catalog::TrophyCatalog;
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::validation;
use crate::storage::db::DbPool;
use crate::storage::photos::PhotoStore;
use crate::storage::{get_connection, profiles, submissions};
use crate::telegram::notify::{ModerationNotice, Notifier};

/// Одно фото из формы заявки.
#[derive(Debug, Clone)]
pub struct SubmissionPhoto {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Воркфлоу заявок на трофеи.
pub struct SubmissionWorkflow {
    db: Arc<DbPool>,
    photos: PhotoStore,
    catalog: Arc<TrophyCatalog>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionWorkflow {
    pub fn new(
        db: Arc<DbPool>,
        photos: PhotoStore,
        catalog: Arc<TrophyCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            photos,
            catalog,
            notifier,
        }
    }

    /// Подаёт заявку: создаёт/перезаписывает pending-запись и фото,
    /// затем асинхронно уведомляет модераторов.
    ///
    /// Предусловия: профиль с заполненным PSN, от 1 до 10 фото, все
    /// части — изображения. Ошибка записи фото компенсируется:
    /// частичные артефакты и строка заявки удаляются до возврата.
    pub async fn submit(
        &self,
        user_id: i64,
        trophy_id: &str,
        comment: &str,
        photos: Vec<SubmissionPhoto>,
    ) -> AppResult<()> {
        if !validation::is_safe_key(trophy_id) {
            return Err(AppError::Validation("некорректный идентификатор трофея".to_string()));
        }

        let content_types: Vec<String> = photos.iter().map(|p| p.content_type.clone()).collect();
        validation::validate_photo_set(&content_types, config::limits::MAX_SUBMISSION_PHOTOS)?;

        let psn_id = {
            let conn = get_connection(&self.db)?;
            match profiles::get_profile(&conn, user_id)? {
                Some(profile) if !profile.psn_id.is_empty() => profile.psn_id,
                _ => {
                    return Err(AppError::Validation(
                        "сначала заполните профиль с PSN никнеймом".to_string(),
                    ))
                }
            }
        };

        // Сначала запись в БД — уведомление не должно ссылаться на
        // несуществующую заявку.
        {
            let conn = get_connection(&self.db)?;
            submissions::upsert_pending(&conn, user_id, trophy_id, comment, photos.len())?;
        }

        // Повторная заявка по той же паре перезаписывает улики.
        if let Err(e) = self.write_photos(user_id, trophy_id, &photos).await {
            self.compensate_submit(user_id, trophy_id).await;
            return Err(e);
        }

        let stored = self.photos.get_all(user_id, trophy_id).await.unwrap_or_default();

        // Fire-and-forget: заявка уже сохранена, исход уведомления
        // только логируется.
        let notifier = Arc::clone(&self.notifier);
        let catalog = Arc::clone(&self.catalog);
        let trophy_id = trophy_id.to_string();
        let comment = comment.to_string();
        tokio::spawn(async move {
            // Каталог недоступен — показываем сырой идентификатор.
            let trophy = match catalog.get(&trophy_id).await {
                Ok(info) => info,
                Err(e) => {
                    log::warn!("Catalog lookup failed for {}: {}", trophy_id, e);
                    None
                }
            };

            let notice = ModerationNotice {
                user_id,
                psn_id,
                trophy_id: trophy_id.clone(),
                trophy,
                comment,
                photos: stored,
            };
            notifier
                .notify_moderators(&notice)
                .await
                .log(&format!("moderation notice for {}:{}", user_id, trophy_id));
        });

        Ok(())
    }

    /// Одобряет заявку: трофей добавляется в профиль (set-add), фото
    /// удаляются, пользователь получает уведомление.
    ///
    /// Порядок жёсткий: если запись трофея в профиль не удалась,
    /// артефакты не трогаем и возвращаем ошибку. Ошибка уведомления
    /// после успешного перехода не отдаётся вызывающему.
    pub async fn approve(&self, user_id: i64, trophy_id: &str) -> AppResult<()> {
        {
            let conn = get_connection(&self.db)?;
            if submissions::get_submission(&conn, user_id, trophy_id)?.is_none() {
                return Err(AppError::NotFound);
            }
            if profiles::get_profile(&conn, user_id)?.is_none() {
                return Err(AppError::NotFound);
            }

            // Set-семантика: повторное одобрение не дублирует трофей.
            profiles::add_trophy(&conn, user_id, trophy_id)?;
        }

        if let Err(e) = self.photos.delete_all(user_id, trophy_id).await {
            log::error!("Failed to purge photos for {}:{}: {}", user_id, trophy_id, e);
        }

        {
            let conn = get_connection(&self.db)?;
            submissions::set_status(&conn, user_id, trophy_id, submissions::STATUS_APPROVED)?;
        }

        let text = format!("✅ Ваша заявка на трофей {} одобрена!", self.display_name(trophy_id).await);
        self.notifier
            .notify_user(user_id, &text)
            .await
            .log(&format!("approve notice for {}:{}", user_id, trophy_id));

        Ok(())
    }

    /// Отклоняет заявку: фото удаляются, профиль не меняется,
    /// пользователь получает уведомление.
    pub async fn reject(&self, user_id: i64, trophy_id: &str) -> AppResult<()> {
        {
            let conn = get_connection(&self.db)?;
            if submissions::get_submission(&conn, user_id, trophy_id)?.is_none() {
                return Err(AppError::NotFound);
            }
        }

        if let Err(e) = self.photos.delete_all(user_id, trophy_id).await {
            log::error!("Failed to purge photos for {}:{}: {}", user_id, trophy_id, e);
        }

        {
            let conn = get_connection(&self.db)?;
            submissions::set_status(&conn, user_id, trophy_id, submissions::STATUS_REJECTED)?;
        }

        let text = format!("❌ Заявка на трофей {} отклонена.", self.display_name(trophy_id).await);
        self.notifier
            .notify_user(user_id, &text)
            .await
            .log(&format!("reject notice for {}:{}", user_id, trophy_id));

        Ok(())
    }

    async fn write_photos(
        &self,
        user_id: i64,
        trophy_id: &str,
        photos: &[SubmissionPhoto],
    ) -> AppResult<()> {
        self.photos.delete_all(user_id, trophy_id).await?;
        for (index, photo) in photos.iter().enumerate() {
            self.photos
                .put(user_id, trophy_id, index, &photo.content_type, &photo.bytes)
                .await?;
        }
        Ok(())
    }

    /// Компенсация полусозданной заявки: никаких осиротевших строк и
    /// частичных артефактов после ошибки.
    async fn compensate_submit(&self, user_id: i64, trophy_id: &str) {
        if let Err(e) = self.photos.delete_all(user_id, trophy_id).await {
            log::error!("Compensation: failed to remove partial photos: {}", e);
        }
        match get_connection(&self.db) {
            Ok(conn) => {
                if let Err(e) = submissions::delete_submission(&conn, user_id, trophy_id) {
                    log::error!("Compensation: failed to remove submission row: {}", e);
                }
            }
            Err(e) => log::error!("Compensation: no DB connection: {}", e),
        }
    }

    /// Имя трофея для пользовательских уведомлений, с откатом на сырой
    /// идентификатор.
    async fn display_name(&self, trophy_id: &str) -> String {
        match self.catalog.get(trophy_id).await {
            Ok(Some(info)) => format!("{} {}", info.emoji, info.name).trim().to_string(),
            _ => trophy_id.to_string(),
        }
    }
}
