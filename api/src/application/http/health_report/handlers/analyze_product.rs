use axum::extract::State;
use labellens_core::domain::health_report::{
    entities::{AnalysisOutcome, AnalysisRequest},
    ports::HealthReportService,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::{
    health_report::validators::AnalyzeProductRequest,
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse, ValidateJson},
            response::Response,
        },
        app_state::AppState,
    },
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeProductResponse {
    pub data: AnalysisOutcome,
}

#[utoipa::path(
    post,
    path = "/analyze",
    tag = "health-report",
    summary = "Analyze a food product",
    description = "Produces a health report for a product name, label text or data-URI image. Backend failures are reported as a degraded outcome, never as an HTTP error.",
    responses(
        (status = 200, body = AnalyzeProductResponse),
        (status = 400, body = ApiErrorResponse)
    ),
    request_body = AnalyzeProductRequest
)]
pub async fn analyze_product(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<AnalyzeProductRequest>,
) -> Result<Response<AnalyzeProductResponse>, ApiError> {
    let provider_id = payload
        .provider_id
        .unwrap_or_else(|| state.service.default_provider());

    let outcome = state
        .service
        .analyze(AnalysisRequest::new(
            payload.product_info,
            payload.region_hint,
            provider_id,
            payload.local_model_name,
        ))
        .await;

    Ok(Response::OK(AnalyzeProductResponse { data: outcome }))
}
