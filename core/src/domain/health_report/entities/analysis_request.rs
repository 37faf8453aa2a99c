use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::provider::entities::ProviderId;

/// One user query. `product_info` is forwarded untouched: free text or a
/// `data:<mime>;base64,<payload>` image string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub product_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_hint: Option<String>,
    pub provider_id: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_model_name: Option<String>,
}

impl AnalysisRequest {
    pub fn new(
        product_info: String,
        region_hint: Option<String>,
        provider_id: ProviderId,
        local_model_name: Option<String>,
    ) -> Self {
        Self {
            product_info,
            region_hint: region_hint.filter(|hint| !hint.trim().is_empty()),
            provider_id,
            local_model_name: local_model_name.filter(|_| provider_id == ProviderId::Local),
        }
    }

    pub fn is_image(&self) -> bool {
        self.product_info.starts_with("data:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub name: String,
    pub provider_id: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_model_name: Option<String>,
}

impl SearchRequest {
    pub fn new(name: String, provider_id: ProviderId, local_model_name: Option<String>) -> Self {
        Self {
            name,
            provider_id,
            local_model_name: local_model_name.filter(|_| provider_id == ProviderId::Local),
        }
    }
}
