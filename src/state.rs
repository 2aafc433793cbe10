use std::sync::Arc;

use crate::{
    auth::{
        jwt::SessionKeys,
        repo::{PgUserRepo, UserRepo},
    },
    config::AppConfig,
    db,
    moderation::{ContentFilter, DeepSeekFilter},
    posts::repo::{PgPostRepo, PostRepo},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: SessionKeys,
    pub users: Arc<dyn UserRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub filter: Arc<dyn ContentFilter>,
}

impl AppState {
    /// Builds the production state: Postgres repositories and the HTTP content filter.
    pub async fn init() -> anyhow::Result<(Self, sqlx::PgPool)> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config).await?;

        if config.moderation.api_key.is_none() {
            tracing::warn!(
                "DEEPSEEK_API_KEY not set; post creation will fail until it is configured"
            );
        }
        let filter = Arc::new(DeepSeekFilter::new(&config.moderation)?) as Arc<dyn ContentFilter>;

        let state = Self::from_parts(
            config,
            Arc::new(PgUserRepo::new(pool.clone())),
            Arc::new(PgPostRepo::new(pool.clone())),
            filter,
        );
        Ok((state, pool))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        posts: Arc<dyn PostRepo>,
        filter: Arc<dyn ContentFilter>,
    ) -> Self {
        let keys = SessionKeys::new(&config.jwt);
        Self {
            config,
            keys,
            users,
            posts,
            filter,
        }
    }
}
