use std::sync::Arc;

use collision_ai::{CollisionEnhancer, OpenAiConfig, OpenAiProvider};
use collision_core::{CollisionError, DomainTier, Result, Settings};
use collision_engine::{CatalogHandle, CollisionEngine, DomainCatalog};
use collision_store::{seeds, PostgresStore, RedisCache, SlidingWindowLimiter, UsageMeter};
use secrecy::ExposeSecret;
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "collision-dev-secret-change-in-production";

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<PostgresStore>,
    pub cache: RedisCache,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub usage: Arc<UsageMeter>,
    pub catalog: Arc<CatalogHandle>,
    pub engine: Arc<CollisionEngine>,
    pub enhancer: Option<Arc<CollisionEnhancer>>,
    jwt_secret: Arc<String>,
}

impl AppState {
    pub async fn new(settings: Settings) -> Result<Self> {
        let store = Arc::new(PostgresStore::connect(&settings.database).await?);
        let cache = RedisCache::connect(&settings.cache.url).await?;

        seeds::ensure_seeded(&store).await?;

        // Snapshot the full catalog once; tier gating happens per request.
        let domains = store.fetch_domains(DomainTier::Premium).await?;
        info!(domains = domains.len(), "materialized domain catalog");
        let catalog = Arc::new(CatalogHandle::new(DomainCatalog::new(domains)));
        let engine = Arc::new(CollisionEngine::new(catalog.clone()));

        let limiter = Arc::new(SlidingWindowLimiter::new(&cache));
        let usage = Arc::new(UsageMeter::new(
            store.clone(),
            cache.clone(),
            settings.cache.usage_ttl_seconds,
            settings.quota.weekly_limit_free,
        ));

        let enhancer = match &settings.llm.api_key {
            Some(key) => {
                let config = OpenAiConfig {
                    api_key: key.expose_secret().to_string(),
                    base_url: settings.llm.base_url.clone(),
                    model: settings.llm.model.clone(),
                    timeout_secs: 30,
                };
                let provider = OpenAiProvider::new(config)
                    .map_err(|e| CollisionError::Configuration(e.to_string()))?;
                Some(Arc::new(CollisionEnhancer::new(Arc::new(provider))))
            }
            None => {
                info!("no LLM API key configured, premium enrichment disabled");
                None
            }
        };

        let jwt_secret = match &settings.auth.jwt_secret {
            Some(secret) => secret.expose_secret().to_string(),
            None => {
                warn!("auth.jwt_secret not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            settings: Arc::new(settings),
            store,
            cache,
            limiter,
            usage,
            catalog,
            engine,
            enhancer,
            jwt_secret: Arc::new(jwt_secret),
        })
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
