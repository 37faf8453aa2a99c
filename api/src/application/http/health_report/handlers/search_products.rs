use axum::extract::State;
use labellens_core::domain::health_report::{
    entities::{SearchOutcome, SearchRequest},
    ports::HealthReportService,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::{
    health_report::validators::SearchProductsRequest,
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse, ValidateJson},
            response::Response,
        },
        app_state::AppState,
    },
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchProductsResponse {
    pub data: SearchOutcome,
}

#[utoipa::path(
    post,
    path = "/search",
    tag = "health-report",
    summary = "Search product names",
    description = "Returns up to ten product names resembling the query, for disambiguation before an analysis.",
    responses(
        (status = 200, body = SearchProductsResponse),
        (status = 400, body = ApiErrorResponse)
    ),
    request_body = SearchProductsRequest
)]
pub async fn search_products(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<SearchProductsRequest>,
) -> Result<Response<SearchProductsResponse>, ApiError> {
    let provider_id = payload
        .provider_id
        .unwrap_or_else(|| state.service.default_provider());

    let outcome = state
        .service
        .search(SearchRequest::new(
            payload.name.trim().to_string(),
            provider_id,
            payload.local_model_name,
        ))
        .await;

    Ok(Response::OK(SearchProductsResponse { data: outcome }))
}
