//! Trophy catalog cache
//!
//! Read-through cache over the external catalog JSON (trophy id →
//! name/emoji/description). One instance owns the cache state and is
//! shared by handle; the refresh policy is:
//! fresh → serve; stale → refetch, on failure serve stale; no cache at
//! all and the fetch fails → the dependent operation fails.
//!
//! The cache is read-mostly; two tasks racing on an expired cache just
//! perform a redundant fetch, which is acceptable staleness, not a
//! correctness hazard — no locking beyond the state mutex.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::config;
use crate::core::error::AppError;

/// Отображаемые метаданные трофея из каталога.
#[derive(Debug, Clone, Deserialize)]
pub struct TrophyInfo {
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug)]
struct CachedCatalog {
    entries: HashMap<String, TrophyInfo>,
    fetched_at: Instant,
}

/// Кэш каталога трофеев с TTL.
pub struct TrophyCatalog {
    http: reqwest::Client,
    url: String,
    ttl: Duration,
    cache: Mutex<Option<CachedCatalog>>,
}

impl TrophyCatalog {
    /// Creates a catalog cache for the given URL with the default TTL
    /// and a short outbound timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_ttl(url, config::catalog::ttl())
    }

    pub fn with_ttl(url: impl Into<String>, ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config::network::timeout())
            .build()
            .unwrap_or_default();

        Self {
            http,
            url: url.into(),
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// Возвращает метаданные трофея.
    ///
    /// `Ok(None)` — каталог получен, но такого id в нём нет.
    /// `Err(Dependency)` — каталога нет и получить его не удалось.
    pub async fn get(&self, trophy_id: &str) -> Result<Option<TrophyInfo>, AppError> {
        // Свежий кэш — отдаём сразу.
        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.as_ref() {
                if Instant::now().duration_since(cached.fetched_at) < self.ttl {
                    return Ok(cached.entries.get(trophy_id).cloned());
                }
            }
        }

        // Кэш устарел или пуст — пробуем обновить. Блокировку на время
        // запроса не держим: проигранная гонка — лишний фетч, не баг.
        match self.fetch().await {
            Ok(entries) => {
                let info = entries.get(trophy_id).cloned();
                let mut cache = self.cache.lock().await;
                *cache = Some(CachedCatalog {
                    entries,
                    fetched_at: Instant::now(),
                });
                Ok(info)
            }
            Err(e) => {
                let cache = self.cache.lock().await;
                match cache.as_ref() {
                    // Протухший кэш лучше, чем отказ.
                    Some(stale) => {
                        log::warn!("Trophy catalog refresh failed, serving stale cache: {}", e);
                        Ok(stale.entries.get(trophy_id).cloned())
                    }
                    None => Err(AppError::Dependency(format!("trophy catalog unavailable: {}", e))),
                }
            }
        }
    }

    async fn fetch(&self) -> Result<HashMap<String, TrophyInfo>, reqwest::Error> {
        let entries = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<HashMap<String, TrophyInfo>>()
            .await?;

        log::debug!("Fetched trophy catalog: {} entries", entries.len());
        Ok(entries)
    }
}
