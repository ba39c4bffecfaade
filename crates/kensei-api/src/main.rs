//! Kensei Mini App API server

use anyhow::Result;
use dotenvy::dotenv;
use std::path::Path;
use std::sync::Arc;
use teloxide::Bot;

use kensei_api::{create_router, ApiState};
use kensei_core::catalog::TrophyCatalog;
use kensei_core::core::config;
use kensei_core::storage::photos::PhotoStore;
use kensei_core::storage::create_pool;
use kensei_core::telegram::notify::{Notifier, TelegramNotifier};
use kensei_core::workflow::SubmissionWorkflow;

/// Bot instance для шлюза уведомлений, с коротким таймаутом на
/// исходящие запросы.
fn create_bot() -> Result<Bot> {
    let client = reqwest::ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(config::BOT_TOKEN.clone(), client))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();
    pretty_env_logger::init();

    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN не установлен");
    }
    if config::TROPHY_CATALOG_URL.is_empty() {
        log::warn!("TROPHY_CATALOG_URL не задан — заявки будут показывать сырые идентификаторы");
    }

    let db = Arc::new(create_pool(&config::DATABASE_PATH)?);
    log::info!("База данных: {}", *config::DATABASE_PATH);

    let uploads = Path::new(config::UPLOADS_DIR.as_str());
    let trophy_photos = PhotoStore::new(uploads.join("trophies"));
    let build_photos = PhotoStore::new(uploads.join("builds"));

    let catalog = Arc::new(TrophyCatalog::new(config::TROPHY_CATALOG_URL.clone()));

    let bot = create_bot()?;
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        bot,
        *config::moderation::GROUP_CHAT_ID,
        *config::moderation::GROUP_TOPIC_ID,
    ));

    let workflow = SubmissionWorkflow::new(Arc::clone(&db), trophy_photos, catalog, notifier);

    let state = Arc::new(ApiState {
        db,
        workflow,
        build_photos,
        bot_token: config::BOT_TOKEN.clone(),
    });

    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", *config::api::PORT);
    log::info!("🌐 Starting Mini App API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
