//! Quota and rate-limit gates for the generation route.
//!
//! Both run after authentication. The quota gate consults the weekly meter
//! for free principals; the rate-limit gate is a sliding window that fails
//! open when the cache tier is unreachable.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use collision_core::{CollisionError, Principal};
use collision_store::RateDecision;
use tracing::warn;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

/// Free principals must have quota left before anything else runs. Premium
/// principals never touch the meter on this path.
pub async fn usage_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("missing principal"))?;

    if !principal.tier.is_premium() {
        state.usage.check(principal.id).await?;
    }

    Ok(next.run(req).await)
}

/// Sliding-window gate. Emits X-RateLimit-* headers on both admitted and
/// denied responses.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("missing principal"))?;

    let config = &state.settings.rate_limit;
    if config.skip_premium && principal.tier.is_premium() {
        return Ok(next.run(req).await);
    }

    let decision = match state
        .limiter
        .check(principal.id, config.window_seconds, config.max_requests)
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            // Fail open: a cache outage must not block generations.
            warn!(principal_id = %principal.id, error = %e, "rate limit check failed, allowing request");
            return Ok(next.run(req).await);
        }
    };

    if !decision.allowed {
        let retry_after = (decision.reset_at - chrono::Utc::now().timestamp()).max(0);
        let err = CollisionError::RateLimitExceeded { retry_after };
        let (kind, status) = ApiError(err).kind_and_status();
        let body = Json(ErrorBody {
            error: kind.to_string(),
            message: format!("Rate limit exceeded. Try again in {} seconds", retry_after),
            code: status.as_u16(),
        });
        let mut response = (status, body).into_response();
        apply_rate_limit_headers(&mut response, &decision);
        return Ok(response);
    }

    let mut response = next.run(req).await;
    apply_rate_limit_headers(&mut response, &decision);
    Ok(response)
}

fn apply_rate_limit_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&decision.limit.to_string()) {
        headers.insert("X-RateLimit-Limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    #[test]
    fn headers_reflect_the_decision() {
        let decision = RateDecision {
            allowed: false,
            limit: 10,
            remaining: 0,
            reset_at: 1_700_000_060,
        };
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Body::empty()).into_response();
        apply_rate_limit_headers(&mut response, &decision);

        let headers = response.headers();
        assert_eq!(headers.get("X-RateLimit-Limit").unwrap(), "10");
        assert_eq!(headers.get("X-RateLimit-Remaining").unwrap(), "0");
        assert_eq!(headers.get("X-RateLimit-Reset").unwrap(), "1700000060");
    }
}
