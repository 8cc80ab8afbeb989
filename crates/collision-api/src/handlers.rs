use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use collision_core::{
    CollisionRequest, CollisionResult, Domain, DomainTier, Principal, Session, SubscriptionTier,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// POST /collisions/generate
///
/// The pipeline tail: the quota and rate gates have already admitted this
/// request. Engine work is CPU-only; persistence and metering are
/// best-effort; premium enrichment runs inline and is bypassable.
pub async fn generate_collision(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CollisionRequest>, JsonRejection>,
) -> ApiResult<Json<CollisionResult>> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    request.validate()?;

    let outcome = state.engine.generate(&request)?;

    let session = Session {
        id: Uuid::new_v4(),
        principal_id: principal.id,
        request: request.clone(),
        result: outcome.result.clone(),
        rating: None,
        notes: None,
        created_at: Utc::now(),
    };

    if let Err(e) = state.store.insert_session(&session).await {
        error!(session_id = %session.id, error = %e, "failed to persist collision session");
    }

    if !principal.tier.is_premium() {
        let usage = state.usage.clone();
        let principal_id = principal.id;
        tokio::spawn(async move {
            usage.record(principal_id).await;
        });
    }

    let mut result = outcome.result;
    if principal.tier.is_premium() {
        if let Some(enhancer) = &state.enhancer {
            enhancer.enhance(&mut result, &request, &outcome.domain).await;
        }
    }

    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
}

/// Out-of-range or unparsable limits fall back to the default rather than
/// failing the request.
fn clamp_history_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|s| s.parse::<i64>().ok()) {
        Some(limit) if (1..=100).contains(&limit) => limit,
        _ => DEFAULT_HISTORY_LIMIT,
    }
}

/// GET /collisions/history?limit=N
pub async fn collision_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Session>>> {
    let limit = clamp_history_limit(query.limit.as_deref());
    let sessions = state.store.session_history(principal.id, limit).await?;
    Ok(Json(sessions))
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// PUT /collisions/{id}/rate
pub async fn rate_collision(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let session_id =
        Uuid::parse_str(&id).map_err(|_| ApiError::validation("invalid session id"))?;

    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::validation("rating must be between 1 and 5"));
    }

    let updated = state
        .store
        .rate_session(session_id, principal.id, req.rating, req.notes.as_deref())
        .await?;

    if !updated {
        return Err(ApiError::not_found(format!(
            "Session {} not found",
            session_id
        )));
    }

    Ok(Json(json!({ "message": "Rating saved successfully" })))
}

#[derive(Debug, Serialize)]
pub struct UsageStatusResponse {
    pub tier: SubscriptionTier,
    pub used: i32,
    pub limit: i32,
    pub remaining: i32,
    pub reset_at: Option<DateTime<Utc>>,
    pub unlimited: bool,
}

/// GET /collisions/usage
pub async fn usage_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<UsageStatusResponse>> {
    if principal.tier.is_premium() {
        return Ok(Json(UsageStatusResponse {
            tier: principal.tier,
            used: 0,
            limit: -1,
            remaining: -1,
            reset_at: None,
            unlimited: true,
        }));
    }

    let usage = state.usage.current(principal.id).await?;
    let limit = state.usage.free_limit();
    let remaining = (limit - usage.count).max(0);

    Ok(Json(UsageStatusResponse {
        tier: principal.tier,
        used: usage.count,
        limit,
        remaining,
        reset_at: Some(usage.window_start + Duration::days(7)),
        unlimited: false,
    }))
}

/// Cache-aside domain listing shared by both tiers.
async fn domains_for_tier(state: &AppState, tier: DomainTier) -> ApiResult<Vec<Domain>> {
    if let Ok(Some(domains)) = state.cache.get_domains(tier).await {
        return Ok(domains);
    }

    let domains = state.store.fetch_domains(tier).await?;

    if let Err(e) = state
        .cache
        .set_domains(tier, &domains, state.settings.cache.catalog_ttl_seconds)
        .await
    {
        tracing::warn!(tier = %tier, error = %e, "domain cache fill failed");
    }

    Ok(domains)
}

/// GET /domains/basic (public)
pub async fn basic_domains(State(state): State<AppState>) -> ApiResult<Json<Vec<Domain>>> {
    Ok(Json(domains_for_tier(&state, DomainTier::Basic).await?))
}

/// GET /domains/premium (pro/team only)
pub async fn premium_domains(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Domain>>> {
    if !principal.tier.is_premium() {
        return Err(ApiError(collision_core::CollisionError::PremiumRequired(
            "Premium subscription required to access premium domains".into(),
        )));
    }
    Ok(Json(domains_for_tier(&state, DomainTier::Premium).await?))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    let mut status = "healthy";

    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(_) => {
            status = "unhealthy";
            "unavailable"
        }
    };

    let cache = match state.cache.ping().await {
        Ok(()) => "connected",
        Err(_) => {
            if status == "healthy" {
                status = "degraded";
            }
            "unavailable"
        }
    };

    let snapshot = state.catalog.snapshot();
    let engine = if snapshot.is_empty() { "empty" } else { "ready" };

    let code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = Json(json!({
        "service": "collision-engine",
        "status": status,
        "database": database,
        "cache": cache,
        "engine": engine,
        "domains": snapshot.len(),
        "timestamp": Utc::now(),
    }));

    (code, body).into_response()
}
