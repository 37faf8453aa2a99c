pub mod analyze_product;
pub mod analyze_product_image;
pub mod get_providers;
pub mod search_products;
