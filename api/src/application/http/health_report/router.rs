use super::handlers::{
    analyze_product::{__path_analyze_product, analyze_product},
    analyze_product_image::{__path_analyze_product_image, analyze_product_image},
    get_providers::{__path_get_providers, get_providers},
    search_products::{__path_search_products, search_products},
};
use crate::application::http::server::app_state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use utoipa::OpenApi;

/// Request body cap; leaves room for a 10MB image once base64 encoded.
const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(paths(analyze_product, analyze_product_image, search_products, get_providers))]
pub struct HealthReportApiDoc;

pub fn health_report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/analyze", state.args.server.root_path),
            post(analyze_product),
        )
        .route(
            &format!("{}/analyze/image", state.args.server.root_path),
            post(analyze_product_image),
        )
        .route(
            &format!("{}/search", state.args.server.root_path),
            post(search_products),
        )
        .route(
            &format!("{}/providers", state.args.server.root_path),
            get(get_providers),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
}
