pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::DashboardStats;
pub use router::admin_routes;
pub use services::StatsService;
