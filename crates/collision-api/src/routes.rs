use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::auth_middleware;
use crate::handlers;
use crate::middleware::{rate_limit_middleware, usage_limit_middleware};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    // Gate ordering on the generation route: auth runs first (outermost),
    // then the weekly quota, then the sliding-window rate limit.
    let generate = Router::new()
        .route("/collisions/generate", post(handlers::generate_collision))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            usage_limit_middleware,
        ));

    let authenticated = Router::new()
        .merge(generate)
        .route("/collisions/history", get(handlers::collision_history))
        .route("/collisions/:id/rate", put(handlers::rate_collision))
        .route("/collisions/usage", get(handlers::usage_status))
        .route("/domains/premium", get(handlers::premium_domains))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/domains/basic", get(handlers::basic_domains))
        .merge(authenticated)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
}
