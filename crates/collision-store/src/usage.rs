//! Weekly usage metering for free principals, cache-through over Postgres.

use std::sync::Arc;

use collision_core::{CollisionError, PrincipalId, Result, UsageCounter};
use tracing::{error, warn};

use crate::cache::RedisCache;
use crate::postgres::PostgresStore;

pub struct UsageMeter {
    store: Arc<PostgresStore>,
    cache: RedisCache,
    cache_ttl_seconds: u64,
    weekly_limit_free: i32,
}

impl UsageMeter {
    pub fn new(
        store: Arc<PostgresStore>,
        cache: RedisCache,
        cache_ttl_seconds: u64,
        weekly_limit_free: i32,
    ) -> Self {
        Self {
            store,
            cache,
            cache_ttl_seconds,
            weekly_limit_free,
        }
    }

    pub fn free_limit(&self) -> i32 {
        self.weekly_limit_free
    }

    /// Current-window counter for a principal. Cache first; a cache failure
    /// falls through to the database, and only a database failure surfaces
    /// as `usage_check_failed`.
    pub async fn current(&self, principal_id: PrincipalId) -> Result<UsageCounter> {
        match self.cache.get_usage(principal_id).await {
            Ok(Some(usage)) => return Ok(usage),
            Ok(None) => {}
            Err(e) => {
                warn!(principal_id = %principal_id, error = %e, "usage cache read failed, falling through to database");
            }
        }

        let usage = self
            .store
            .fetch_or_create_usage(principal_id)
            .await
            .map_err(|e| CollisionError::UsageCheckFailed(e.to_string()))?;

        if let Err(e) = self.cache.set_usage(&usage, self.cache_ttl_seconds).await {
            warn!(principal_id = %principal_id, error = %e, "usage cache fill failed");
        }

        Ok(usage)
    }

    /// Whether the principal has room for another generation this window.
    pub async fn check(&self, principal_id: PrincipalId) -> Result<UsageCounter> {
        let usage = self.current(principal_id).await?;
        if usage.count >= self.weekly_limit_free {
            return Err(CollisionError::UsageLimitExceeded {
                limit: self.weekly_limit_free,
            });
        }
        Ok(usage)
    }

    /// Post-generation accounting: increment the window row and drop the
    /// cached counter. Best-effort; failures are logged, never surfaced.
    pub async fn record(&self, principal_id: PrincipalId) {
        if let Err(e) = self.store.increment_usage(principal_id).await {
            error!(principal_id = %principal_id, error = %e, "usage increment failed");
        }
        if let Err(e) = self.cache.invalidate_usage(principal_id).await {
            warn!(principal_id = %principal_id, error = %e, "usage cache invalidation failed");
        }
    }
}
