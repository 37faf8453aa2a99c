use labellens_core::domain::provider::entities::ProviderId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeProductRequest {
    /// Product name, free-text label description, or a `data:image/...;base64,` URI.
    #[validate(
        length(min = 1, max = 15728640, message = "productInfo must be between 1 and 15728640 characters"),
        custom(function = "non_blank", message = "productInfo must not be blank")
    )]
    #[schema(example = "Maggi 2-Minute Masala Noodles")]
    pub product_info: String,

    #[validate(length(max = 100, message = "regionHint must be at most 100 characters"))]
    #[schema(example = "India")]
    pub region_hint: Option<String>,

    /// Defaults to the server's configured provider.
    pub provider_id: Option<ProviderId>,

    /// Ollama model to use. Ignored unless the provider is `local`.
    #[validate(length(min = 1, max = 100, message = "localModelName must be between 1 and 100 characters"))]
    pub local_model_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchProductsRequest {
    #[validate(
        length(min = 1, max = 200, message = "name must be between 1 and 200 characters"),
        custom(function = "non_blank", message = "name must not be blank")
    )]
    #[schema(example = "maggi")]
    pub name: String,

    pub provider_id: Option<ProviderId>,

    #[validate(length(min = 1, max = 100, message = "localModelName must be between 1 and 100 characters"))]
    pub local_model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(product_info: &str) -> AnalyzeProductRequest {
        AnalyzeProductRequest {
            product_info: product_info.to_string(),
            region_hint: None,
            provider_id: None,
            local_model_name: None,
        }
    }

    #[test]
    fn test_blank_product_info_is_rejected() {
        assert!(analyze("").validate().is_err());
        assert!(analyze("   ").validate().is_err());
        assert!(analyze("Maggi Noodles").validate().is_ok());
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request: AnalyzeProductRequest = serde_json::from_str(
            r#"{"productInfo":"Oreo","regionHint":"UK","providerId":"local","localModelName":"mistral"}"#,
        )
        .unwrap();
        assert_eq!(request.provider_id, Some(ProviderId::Local));
        assert_eq!(request.local_model_name.as_deref(), Some("mistral"));
    }

    #[test]
    fn test_search_name_is_required() {
        let request = SearchProductsRequest {
            name: " ".to_string(),
            provider_id: None,
            local_model_name: None,
        };
        assert!(request.validate().is_err());
    }
}
