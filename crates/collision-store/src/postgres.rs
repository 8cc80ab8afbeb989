//! Durable store over Postgres.
//!
//! Four tables: principals, domains, sessions, usage_counters. Domains embed
//! keywords/examples/intensities as JSONB arrays; sessions store request and
//! result as opaque JSONB blobs with rating/notes denormalized alongside.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use collision_core::{
    CollisionError, CollisionRequest, CollisionResult, DatabaseConfig, Domain, DomainTier,
    Intensity, PrincipalId, Result, Session, SessionId, UsageCounter,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct DomainRow {
    id: Uuid,
    name: String,
    category: String,
    description: String,
    keywords: Json<Vec<String>>,
    examples: Json<Vec<String>>,
    intensities: Json<Vec<Intensity>>,
    tier: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DomainRow> for Domain {
    type Error = CollisionError;

    fn try_from(row: DomainRow) -> Result<Domain> {
        let tier = DomainTier::from_str(&row.tier).map_err(CollisionError::Database)?;
        Ok(Domain {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            keywords: row.keywords.0,
            examples: row.examples.0,
            intensities: row.intensities.0,
            tier,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    principal_id: Uuid,
    request: Json<CollisionRequest>,
    result: Json<CollisionResult>,
    rating: Option<i32>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Session {
        Session {
            id: row.id,
            principal_id: row.principal_id,
            request: row.request.0,
            result: row.result.0,
            rating: row.rating,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct UsageRow {
    id: Uuid,
    principal_id: Uuid,
    count: i32,
    window_start: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UsageRow> for UsageCounter {
    fn from(row: UsageRow) -> UsageCounter {
        UsageCounter {
            id: row.id,
            principal_id: row.principal_id,
            count: row.count,
            window_start: row.window_start,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_err(e: sqlx::Error) -> CollisionError {
    CollisionError::Database(e.to_string())
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(Duration::from_secs(config.max_lifetime_seconds))
            .connect(&config.url)
            .await
            .map_err(db_err)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Domains visible to a tier. Basic rows are always included, so passing
    /// `Premium` returns the entire catalog.
    pub async fn fetch_domains(&self, tier: DomainTier) -> Result<Vec<Domain>> {
        let rows: Vec<DomainRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, description, keywords, examples, intensities,
                   tier, created_at, updated_at
            FROM domains
            WHERE tier = $1 OR tier = 'basic'
            ORDER BY name
            "#,
        )
        .bind(tier.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Domain::try_from).collect()
    }

    pub async fn count_domains(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM domains")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count)
    }

    pub async fn insert_domain(&self, domain: &Domain) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO domains (id, name, category, description, keywords, examples,
                                 intensities, tier, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(domain.id)
        .bind(&domain.name)
        .bind(&domain.category)
        .bind(&domain.description)
        .bind(Json(&domain.keywords))
        .bind(Json(&domain.examples))
        .bind(Json(&domain.intensities))
        .bind(domain.tier.to_string())
        .bind(domain.created_at)
        .bind(domain.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn insert_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, principal_id, request, result, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id)
        .bind(session.principal_id)
        .bind(Json(&session.request))
        .bind(Json(&session.result))
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Newest-first session history for one principal.
    pub async fn session_history(
        &self,
        principal_id: PrincipalId,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, principal_id, request, result, rating, notes, created_at
            FROM sessions
            WHERE principal_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(principal_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    /// Overwrites any previous rating; returns false when the session does
    /// not exist or is owned by another principal.
    pub async fn rate_session(
        &self,
        session_id: SessionId,
        principal_id: PrincipalId,
        rating: i32,
        notes: Option<&str>,
    ) -> Result<bool> {
        let outcome = sqlx::query(
            r#"
            UPDATE sessions
            SET rating = $1, notes = $2
            WHERE id = $3 AND principal_id = $4
            "#,
        )
        .bind(rating)
        .bind(notes)
        .bind(session_id)
        .bind(principal_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(outcome.rows_affected() > 0)
    }

    /// The usage row whose window covers the last 7 days, created lazily with
    /// a zero count when the principal has none.
    pub async fn fetch_or_create_usage(&self, principal_id: PrincipalId) -> Result<UsageCounter> {
        let existing: Option<UsageRow> = sqlx::query_as(
            r#"
            SELECT id, principal_id, count, window_start, created_at, updated_at
            FROM usage_counters
            WHERE principal_id = $1 AND window_start >= NOW() - INTERVAL '7 days'
            ORDER BY window_start DESC
            LIMIT 1
            "#,
        )
        .bind(principal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = existing {
            return Ok(row.into());
        }

        let now = Utc::now();
        let counter = UsageCounter {
            id: Uuid::new_v4(),
            principal_id,
            count: 0,
            window_start: now,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO usage_counters (id, principal_id, count, window_start, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(counter.id)
        .bind(counter.principal_id)
        .bind(counter.count)
        .bind(counter.window_start)
        .bind(counter.created_at)
        .bind(counter.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(counter)
    }

    /// Unconditional increment of the current-window row. Never compensated.
    pub async fn increment_usage(&self, principal_id: PrincipalId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE usage_counters
            SET count = count + 1, updated_at = NOW()
            WHERE principal_id = $1 AND window_start >= NOW() - INTERVAL '7 days'
            "#,
        )
        .bind(principal_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collision_core::ProjectType;

    fn sample_result() -> CollisionResult {
        CollisionResult {
            id: Uuid::new_v4(),
            primary_domain: "Machine Learning".into(),
            collision_domain: "Mycology".into(),
            connection: "networks of nutrients".into(),
            spark_questions: vec!["q1".into(), "q2".into(), "q3".into()],
            examples: vec!["e1".into(), "e2".into()],
            next_steps: vec!["s1".into(), "s2".into(), "s3".into()],
            quality_score: 72.25,
            generated_at: Utc::now(),
            rating: None,
            notes: None,
        }
    }

    #[test]
    fn result_survives_json_blob_round_trip() {
        let result = sample_result();
        let blob = serde_json::to_string(&result).unwrap();
        let back: CollisionResult = serde_json::from_str(&blob).unwrap();

        assert_eq!(back.id, result.id);
        assert_eq!(back.primary_domain, result.primary_domain);
        assert_eq!(back.collision_domain, result.collision_domain);
        assert_eq!(back.connection, result.connection);
        assert_eq!(back.spark_questions, result.spark_questions);
        assert_eq!(back.examples, result.examples);
        assert_eq!(back.next_steps, result.next_steps);
        assert_eq!(back.quality_score, result.quality_score);
        assert_eq!(back.generated_at, result.generated_at);
    }

    #[test]
    fn request_survives_json_blob_round_trip() {
        let request = CollisionRequest {
            interests: vec!["machine learning".into(), "design".into()],
            project: "AI recommendation system".into(),
            project_type: ProjectType::Product,
            intensity: collision_core::Intensity::Moderate,
        };
        let blob = serde_json::to_value(&request).unwrap();
        let back: CollisionRequest = serde_json::from_value(blob).unwrap();
        assert_eq!(back.interests, request.interests);
        assert_eq!(back.project_type, request.project_type);
        assert_eq!(back.intensity, request.intensity);
    }
}
