//! kelly-sizer HTTP Server
//!
//! Axum-based server exposing risk-adjusted Kelly position sizing to
//! reporting and trading front-ends.

mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kelly_sizer::{KellyOptimizer, SizingConfig};

use crate::handlers::{health_check, multi_market_handler, position_handler};
use crate::state::AppState;

/// Build the application router
fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/position", post(position_handler))
        .route("/api/positions", post(multi_market_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before reading any configuration
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SizingConfig::from_env()?;
    tracing::info!(
        mode = %config.kelly_mode,
        max_position = config.max_position_size,
        min_confidence = config.min_confidence_threshold,
        max_correlation_exposure = config.max_correlation_exposure,
        stress_test = config.enable_stress_test,
        "Sizing configuration loaded"
    );

    let state = AppState::new(KellyOptimizer::new(config)?);
    let app = router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("kelly-sizer server running on http://{}", addr);
    tracing::info!("  GET  /health         - Health check and active configuration");
    tracing::info!("  POST /api/position   - Size one opportunity");
    tracing::info!("  POST /api/positions  - Size a batch of opportunities");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::handlers::{ErrorResponse, PositionResponse};

    fn app() -> Router {
        router(AppState::new(KellyOptimizer::default()))
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_position_route_invalid_opportunity_is_hold() {
        let body = serde_json::json!({
            "opportunity": {
                "probability_estimate": 1.5,
                "market_price": 0.4,
                "confidence_level": 0.9,
                "liquidity": 5000.0,
                "bid_ask_spread": 0.01,
                "time_to_resolution": 48,
                "market_id": "broken"
            },
            "bankroll": "1000"
        });

        let response = app().oneshot(post_json("/api/position", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: PositionResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.result.final_position_size, 0.0);
        assert_eq!(parsed.result.reasoning, "Invalid opportunity parameters");
    }

    #[tokio::test]
    async fn test_position_route_rejects_negative_horizon() {
        let body = serde_json::json!({
            "opportunity": {
                "probability_estimate": 0.72,
                "market_price": 0.35,
                "confidence_level": 0.85,
                "liquidity": 5000.0,
                "bid_ask_spread": 0.02,
                "time_to_resolution": -5,
                "market_id": "past_due"
            },
            "bankroll": "1000"
        });

        let response = app().oneshot(post_json("/api/position", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_positions_route_rejects_negative_bankroll() {
        let body = serde_json::json!({ "opportunities": [], "bankroll": "-1" });

        let response = app().oneshot(post_json("/api/positions", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.code, "INVALID_BANKROLL");
    }
}
