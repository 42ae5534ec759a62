pub mod auth;
pub mod user_service;
pub mod partner_service;
pub mod linkage_service;
pub mod finance_service;
pub mod cargo_service;
pub mod dashboard_service;

pub use auth::AuthService;
pub use cargo_service::CargoService;
pub use dashboard_service::DashboardService;
pub use finance_service::FinanceService;
pub use linkage_service::LinkageService;
pub use partner_service::PartnerService;
pub use user_service::UserService;
