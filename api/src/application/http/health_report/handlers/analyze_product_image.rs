use axum::extract::{Multipart, State};
use base64::{Engine as _, engine::general_purpose};
use labellens_core::domain::{
    health_report::{entities::AnalysisRequest, ports::HealthReportService},
    provider::entities::ProviderId,
};

use crate::application::http::{
    health_report::handlers::analyze_product::AnalyzeProductResponse,
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse},
            response::Response,
        },
        app_state::AppState,
    },
};

pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB

struct LabelImage {
    mime_type: String,
    data: Vec<u8>,
}

impl LabelImage {
    fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.data)
        )
    }
}

#[utoipa::path(
    post,
    path = "/analyze/image",
    tag = "health-report",
    summary = "Analyze a food product from a label photo",
    description = "Multipart form with an `image` part (image/*, at most 10MB) and optional `region_hint`, `provider_id` and `local_model_name` text parts.",
    responses(
        (status = 200, body = AnalyzeProductResponse),
        (status = 400, body = ApiErrorResponse),
        (status = 413, body = ApiErrorResponse),
        (status = 415, body = ApiErrorResponse)
    )
)]
pub async fn analyze_product_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response<AnalyzeProductResponse>, ApiError> {
    let mut image: Option<LabelImage> = None;
    let mut region_hint: Option<String> = None;
    let mut provider_id: Option<ProviderId> = None;
    let mut local_model_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let mime_type = field.content_type().unwrap_or("").to_string();
                if !mime_type.starts_with("image/") {
                    return Err(ApiError::UnsupportedMediaType(format!(
                        "image must have an image/* content type, got '{}'",
                        mime_type
                    )));
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;

                if data.is_empty() {
                    return Err(ApiError::BadRequest("Image cannot be empty".to_string()));
                }
                if data.len() > MAX_IMAGE_SIZE {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "Image too large. Max size is {} bytes",
                        MAX_IMAGE_SIZE
                    )));
                }

                image = Some(LabelImage {
                    mime_type,
                    data: data.to_vec(),
                });
            }
            "region_hint" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read region_hint: {}", e))
                })?;
                region_hint = Some(value);
            }
            "provider_id" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read provider_id: {}", e))
                })?;
                provider_id = Some(value.parse().map_err(ApiError::BadRequest)?);
            }
            "local_model_name" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read local_model_name: {}", e))
                })?;
                local_model_name = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("Missing image field".to_string()))?;
    let provider_id = provider_id.unwrap_or_else(|| state.service.default_provider());

    tracing::debug!(
        mime_type = %image.mime_type,
        bytes = image.data.len(),
        provider = %provider_id,
        "Analyzing label image"
    );

    let outcome = state
        .service
        .analyze(AnalysisRequest::new(
            image.to_data_uri(),
            region_hint,
            provider_id,
            local_model_name,
        ))
        .await;

    Ok(Response::OK(AnalyzeProductResponse { data: outcome }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_image_to_data_uri() {
        let image = LabelImage {
            mime_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        };
        assert_eq!(image.to_data_uri(), "data:image/png;base64,iVBORw==");
    }
}
