//! Cache tier over Redis.
//!
//! One multiplexed connection per process; clones share the underlying
//! connection. All values are JSON strings. Callers decide whether a cache
//! error is fatal; the limiter and the usage meter both degrade gracefully.

use collision_core::{CollisionError, Domain, DomainTier, PrincipalId, Result, UsageCounter};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

pub fn domains_key(tier: DomainTier) -> String {
    format!("collision:domains:{}", tier)
}

pub fn usage_key(principal_id: PrincipalId) -> String {
    format!("user:usage:{}", principal_id)
}

/// Reserved for future memoization of collision results; no read or write
/// path uses it yet.
pub fn result_key(hash: &str) -> String {
    format!("collision:result:{}", hash)
}

pub fn rate_limit_key(principal_id: PrincipalId, window_seconds: u64) -> String {
    format!("rate:limit:{}:{}", principal_id, window_seconds)
}

fn cache_err(e: redis::RedisError) -> CollisionError {
    CollisionError::Cache(e.to_string())
}

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(cache_err)?;
        let conn = ConnectionManager::new(client).await.map_err(cache_err)?;
        Ok(Self { conn })
    }

    pub(crate) fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_err)
    }

    pub async fn get_domains(&self, tier: DomainTier) -> Result<Option<Vec<Domain>>> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(domains_key(tier)).await.map_err(cache_err)?;
        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub async fn set_domains(
        &self,
        tier: DomainTier,
        domains: &[Domain],
        ttl_seconds: u64,
    ) -> Result<()> {
        let mut conn = self.conn.clone();
        let data = serde_json::to_string(domains)?;
        conn.set_ex::<_, _, ()>(domains_key(tier), data, ttl_seconds)
            .await
            .map_err(cache_err)
    }

    pub async fn get_usage(&self, principal_id: PrincipalId) -> Result<Option<UsageCounter>> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(usage_key(principal_id)).await.map_err(cache_err)?;
        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub async fn set_usage(&self, usage: &UsageCounter, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let data = serde_json::to_string(usage)?;
        conn.set_ex::<_, _, ()>(usage_key(usage.principal_id), data, ttl_seconds)
            .await
            .map_err(cache_err)
    }

    pub async fn invalidate_usage(&self, principal_id: PrincipalId) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(usage_key(principal_id))
            .await
            .map_err(cache_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn key_formats_match_wire_contract() {
        let id = Uuid::nil();
        assert_eq!(domains_key(DomainTier::Basic), "collision:domains:basic");
        assert_eq!(domains_key(DomainTier::Premium), "collision:domains:premium");
        assert_eq!(
            usage_key(id),
            "user:usage:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(result_key("abc123"), "collision:result:abc123");
        assert_eq!(
            rate_limit_key(id, 60),
            "rate:limit:00000000-0000-0000-0000-000000000000:60"
        );
    }
}
