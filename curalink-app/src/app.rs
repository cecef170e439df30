use anyhow::{Context, Result};
use curalink_assistant::Assistant;
use curalink_catalog::{ForumBoard, MockSearchService, SearchService};
use curalink_config::CuralinkConfig;
use curalink_events::{Delivery, ProductEvent, WebhookNotifier};
use curalink_store::{FavoritesManager, JsonStore, ProfileStore, Scope, SqliteStore, open_pool};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, wired from configuration.
pub struct App {
    pub profiles: ProfileStore,
    pub favorites: FavoritesManager,
    pub search: Arc<dyn SearchService>,
    pub assistant: Assistant,
    pub events: WebhookNotifier,
    pub forum: ForumBoard,
    local: JsonStore,
    session: JsonStore,
}

impl App {
    pub async fn from_config(cfg: &CuralinkConfig) -> Result<Self> {
        let pool = open_pool(&cfg.storage.database_url)
            .await
            .with_context(|| "failed to open the local database")?;
        let local = JsonStore::new(Arc::new(SqliteStore::new(pool.clone(), Scope::Local)));
        let session = JsonStore::new(Arc::new(SqliteStore::new(pool, Scope::Session)));

        let search = Arc::new(MockSearchService::new(Duration::from_millis(
            cfg.search.latency_ms,
        )));
        let assistant = Assistant::from_config(&cfg.assistant);
        let events = WebhookNotifier::from_url(cfg.events.webhook_url.as_deref());

        Ok(Self::assemble(local, session, search, assistant, events))
    }

    /// Throwaway stores and an instant catalog.
    #[cfg(test)]
    pub fn in_memory(assistant: Assistant, events: WebhookNotifier) -> Self {
        Self::assemble(
            JsonStore::memory(),
            JsonStore::memory(),
            Arc::new(MockSearchService::instant()),
            assistant,
            events,
        )
    }

    fn assemble(
        local: JsonStore,
        session: JsonStore,
        search: Arc<dyn SearchService>,
        assistant: Assistant,
        events: WebhookNotifier,
    ) -> Self {
        Self {
            profiles: ProfileStore::new(local.clone()),
            favorites: FavoritesManager::new(local.clone()),
            forum: ForumBoard::new(session.clone()),
            search,
            assistant,
            events,
            local,
            session,
        }
    }

    pub fn session(&self) -> JsonStore {
        self.session.clone()
    }

    /// Report a product event; delivery problems are only logged.
    pub async fn emit(&self, event: ProductEvent) -> Delivery {
        let user_id = self.profiles.user_id().await.ok().flatten();
        self.events.notify(&event, user_id.as_deref()).await
    }

    /// Forget everything stored on this device.
    pub async fn logout(&self) -> Result<()> {
        self.local.clear().await?;
        self.session.clear().await?;
        tracing::info!("app.logout");
        Ok(())
    }
}
