//! HTTP Handlers

use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kelly_sizer::{
    CorrelationMatrix, KellyMode, KellyResult, MarketOpportunity, SizerError,
    portfolio::total_fraction,
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub kelly_mode: KellyMode,
    pub stress_test: bool,
    /// Active (confidence, multiplier) anchors
    pub confidence_curve: Vec<(f64, f64)>,
}

/// Single-opportunity request.
///
/// `time_to_resolution` is unsigned on the wire: a negative horizon is
/// rejected by the JSON extractor (422) before sizing. Every other bound
/// violation is sized as a zero HOLD.
#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub opportunity: MarketOpportunity,
    pub bankroll: Decimal,
    /// Current position sizes as fractions of bankroll
    #[serde(default)]
    pub existing_positions: Option<Vec<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PositionResponse {
    pub evaluation_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub result: KellyResult,
}

#[derive(Debug, Deserialize)]
pub struct MultiMarketRequest {
    pub opportunities: Vec<MarketOpportunity>,
    pub bankroll: Decimal,
    /// Row-major correlation matrix in opportunity order
    #[serde(default)]
    pub correlations: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MultiMarketResponse {
    pub evaluation_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub total_fraction: f64,
    pub results: HashMap<String, KellyResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(err: &SizerError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().into(),
        }),
    )
}

fn ensure_bankroll(bankroll: Decimal) -> Result<(), ApiError> {
    if bankroll <= Decimal::ZERO {
        return Err(bad_request(&SizerError::InvalidBankroll(bankroll)));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.optimizer.config();

    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        kelly_mode: config.kelly_mode,
        stress_test: config.enable_stress_test,
        confidence_curve: state.optimizer.curve().points().to_vec(),
    })
}

/// Size a single opportunity
pub async fn position_handler(
    State(state): State<AppState>,
    Json(payload): Json<PositionRequest>,
) -> Result<Json<PositionResponse>, ApiError> {
    ensure_bankroll(payload.bankroll)?;

    let result = state.optimizer.calculate_optimal_position(
        &payload.opportunity,
        payload.bankroll,
        payload.existing_positions.as_deref(),
    );

    tracing::info!("\n{}", result.summary());

    Ok(Json(PositionResponse {
        evaluation_id: Uuid::new_v4(),
        evaluated_at: Utc::now(),
        result,
    }))
}

/// Size a batch of opportunities, optionally under a correlation budget
pub async fn multi_market_handler(
    State(state): State<AppState>,
    Json(payload): Json<MultiMarketRequest>,
) -> Result<Json<MultiMarketResponse>, ApiError> {
    ensure_bankroll(payload.bankroll)?;

    let correlations = payload
        .correlations
        .map(CorrelationMatrix::new)
        .transpose()
        .map_err(|e| bad_request(&e))?;

    let optimizer = state.optimizer.clone();
    let opportunities = payload.opportunities;
    let bankroll = payload.bankroll;

    // Batch evaluation fans out on the rayon pool; keep it off the async workers
    let results = tokio::task::spawn_blocking(move || {
        optimizer.calculate_multi_market(&opportunities, correlations.as_ref(), bankroll)
    })
    .await
    .map_err(|e| {
        tracing::error!("Batch sizing task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Batch sizing failed".into(),
                code: "INTERNAL_ERROR".into(),
            }),
        )
    })?
    .map_err(|e| bad_request(&e))?;

    let total = total_fraction(results.values());
    let actionable = results.values().filter(|r| r.is_actionable()).count();
    tracing::info!(markets = results.len(), actionable, total, "Sized batch");

    Ok(Json(MultiMarketResponse {
        evaluation_id: Uuid::new_v4(),
        evaluated_at: Utc::now(),
        total_fraction: total,
        results,
    }))
}
