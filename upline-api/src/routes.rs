//! API Routes

use axum::{
    extract::State,
    middleware::{self, Next},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let enable_cors = state.config.enable_cors;

    let mut router = Router::new()
        // Health and status
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        // User-facing reads
        .route("/users/:user_id/balances", get(get_balances))
        .route("/users/:user_id/referrals", get(get_referrals))
        .route("/users/:user_id/rank", get(get_rank_info))
        .route("/users/:user_id/transactions", get(list_transactions))
        // User-facing writes
        .route("/users/:user_id/rank/claim", post(claim_reward))
        .route("/users/:user_id/referrer", post(assign_referrer))
        // Transaction lifecycle
        .route("/transactions/deposits", post(create_deposit))
        .route("/transactions/withdrawals", post(create_withdrawal))
        .route("/transactions/:transaction_id/approve", post(approve_transaction))
        .route("/transactions/:transaction_id/reject", post(reject_transaction))
        // Reward administration
        .route("/rewards/:reward_id/approve", post(approve_reward))
        .route("/rewards/:reward_id/reject", post(reject_reward))
        // Distribution
        .route("/distribution/run", post(run_distribution))
        .route("/distribution/schedule", put(set_schedule))
        .with_state(state.clone());

    // Count every request for /stats
    router = router.layer(middleware::from_fn_with_state(state, count_requests));

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.layer(TraceLayer::new_for_http())
}

/// Create a router for the V1 API with /api/v1 prefix
pub fn create_v1_router(state: Arc<AppState>) -> Router {
    Router::new().nest("/api/v1", create_router(state))
}

/// Build the full application router
pub fn build_app(state: AppState) -> Router {
    let state = Arc::new(state);

    let root_router = Router::new().route("/", get(|| async { "Upline API Service" }));

    let health_router = Router::new()
        .route("/healthz", get(health_check))
        .with_state(state.clone());

    root_router
        .merge(health_router)
        .merge(create_v1_router(state))
}

/// Request-counting middleware
async fn count_requests(
    State(state): State<Arc<AppState>>,
    request: axum::extract::Request,
    next: Next,
) -> axum::response::Response {
    state.increment_requests().await;
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ApiConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;
    use upline_store::Stores;

    fn create_test_state() -> AppState {
        AppState::new(ApiConfig::default(), Stores::in_memory())
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = build_app(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_app(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_v1_stats_endpoint() {
        let app = build_app(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_transaction_not_found() {
        let app = build_app(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/transactions/txn:nope/approve")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
