//! HTTP-транслятор решений модерации в API

use anyhow::{anyhow, Result};

/// Решение модератора по заявке.
#[derive(Debug, Clone, Copy)]
pub enum ModerationVerdict {
    Approve,
    Reject,
}

impl ModerationVerdict {
    fn endpoint(self) -> &'static str {
        match self {
            ModerationVerdict::Approve => "/api/trophies.approve",
            ModerationVerdict::Reject => "/api/trophies.reject",
        }
    }
}

/// Клиент API-сервера. Бот не трогает базу напрямую — все переходы
/// заявок делает API.
pub struct Relay {
    http: reqwest::Client,
    base_url: String,
}

impl Relay {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Передаёт решение модератора API. Ошибка здесь означает, что
    /// заявка осталась в прежнем статусе — модератор видит её в чате
    /// и может нажать кнопку ещё раз.
    pub async fn moderate(&self, verdict: ModerationVerdict, user_id: i64, trophy_id: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, verdict.endpoint());
        let response = self
            .http
            .post(&url)
            .form(&[("user_id", user_id.to_string()), ("trophy_id", trophy_id.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("API returned {}", response.status()));
        }
        Ok(())
    }
}
