use axum::extract::State;
use labellens_core::domain::{
    health_report::ports::HealthReportService,
    provider::entities::{ProviderDescriptor, ProviderId},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::server::{
    api_entities::{api_error::ApiError, response::Response},
    app_state::AppState,
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersOverview {
    pub default_provider: ProviderId,
    pub providers: Vec<ProviderDescriptor>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GetProvidersResponse {
    pub data: ProvidersOverview,
}

#[utoipa::path(
    get,
    path = "/providers",
    tag = "health-report",
    summary = "List configured AI providers",
    description = "Hosted providers only appear when their credentials were present at startup.",
    responses(
        (status = 200, body = GetProvidersResponse)
    )
)]
pub async fn get_providers(
    State(state): State<AppState>,
) -> Result<Response<GetProvidersResponse>, ApiError> {
    Ok(Response::OK(GetProvidersResponse {
        data: ProvidersOverview {
            default_provider: state.service.default_provider(),
            providers: state.service.providers(),
        },
    }))
}
