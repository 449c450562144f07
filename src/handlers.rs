use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::RiskAssessment;
use crate::normalizer::normalize_with_diagnostics;
use crate::profiles::{load_profile, Profile};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
}

/// Build the API routes. Tracing, CORS and rate limiting are layered on in `main`.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.body_limit_bytes;

    let api_routes: Router<Arc<AppState>> = Router::new()
        .route("/api/v1/profiles/:profile", get(get_profile_assessment))
        .route("/api/v1/assessments", post(create_assessment))
        .layer(RequestBodyLimitLayer::new(body_limit));

    Router::new()
        .route("/health", get(health))
        .merge(api_routes)
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "experian-risk-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Normalize a raw report and derive the assessment shown to the user.
pub fn assess(document: &Value) -> Result<RiskAssessment, AppError> {
    let normalized = normalize_with_diagnostics(document)?;
    if !normalized.diagnostics.is_empty() {
        tracing::info!(
            "Report normalized with {} diagnostic(s)",
            normalized.diagnostics.len()
        );
    }
    Ok(RiskAssessment::from_record(normalized.record))
}

/// GET /api/v1/profiles/:profile
///
/// Loads one of the bundled sample reports (`good` or `bad`) and returns its assessment.
pub async fn get_profile_assessment(
    State(state): State<Arc<AppState>>,
    Path(profile): Path<String>,
) -> Result<Json<RiskAssessment>, AppError> {
    let profile: Profile = profile.parse()?;
    tracing::info!("Assessing sample profile: {}", profile);

    let document = load_profile(&state.config.profiles_dir, profile).await?;
    let assessment = assess(&document).with_context(|| format!("assessing {} profile", profile))?;

    tracing::info!(
        "Profile {} assessed: risk_level={}, has_defaults={}",
        profile,
        assessment.record.risk_level,
        assessment.record.has_defaults
    );

    Ok(Json(assessment))
}

/// POST /api/v1/assessments
///
/// Accepts a raw bureau report as the JSON body and returns its assessment.
pub async fn create_assessment(Json(document): Json<Value>) -> Result<Json<RiskAssessment>, AppError> {
    let assessment = assess(&document).context("assessing submitted report")?;

    tracing::info!(
        "Submitted report assessed: risk_level={}, has_defaults={}",
        assessment.record.risk_level,
        assessment.record.has_defaults
    );

    Ok(Json(assessment))
}
