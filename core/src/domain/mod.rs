pub mod common;
pub mod health_report;
pub mod provider;
