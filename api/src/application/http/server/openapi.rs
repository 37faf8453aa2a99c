use utoipa::OpenApi;

use crate::application::http::{
    health::HealthApiDoc, health_report::router::HealthReportApiDoc,
    server::api_entities::api_error::ApiErrorResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabelLens API",
        description = "Health analysis of packaged food products through local or hosted AI models"
    ),
    components(schemas(ApiErrorResponse))
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Every documented route, relative to the configured root path.
    pub fn build() -> utoipa::openapi::OpenApi {
        ApiDoc::openapi()
            .merge_from(HealthReportApiDoc::openapi())
            .merge_from(HealthApiDoc::openapi())
    }
}
