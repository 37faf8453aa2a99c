pub mod health;
pub mod health_report;
pub mod server;
