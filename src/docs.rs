// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::session,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user_stats,
        handlers::users::get_me,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Parceiros ---
        handlers::partners::list_partners,
        handlers::partners::get_partner_stats,
        handlers::partners::get_partner,
        handlers::partners::create_partner,
        handlers::partners::update_partner,
        handlers::partners::block_partner,
        handlers::partners::unblock_partner,
        handlers::partners::delete_partner,

        // --- Motoristas ---
        handlers::partners::list_partner_drivers,
        handlers::partners::create_driver,
        handlers::partners::get_driver,
        handlers::partners::update_driver,
        handlers::partners::delete_driver,

        // --- Veículos ---
        handlers::partners::list_partner_vehicles,
        handlers::partners::create_vehicle,
        handlers::partners::get_vehicle,
        handlers::partners::update_vehicle,
        handlers::partners::delete_vehicle,

        // --- Vínculos ---
        handlers::partners::list_driver_candidates,
        handlers::partners::get_link_options,
        handlers::partners::link,
        handlers::partners::unlink,

        // --- Financeiro ---
        handlers::finance::list_movements,
        handlers::finance::get_finance_stats,
        handlers::finance::list_categories,
        handlers::finance::get_movement,
        handlers::finance::create_movement,
        handlers::finance::update_movement,
        handlers::finance::set_movement_status,
        handlers::finance::delete_movement,

        // --- Cargas ---
        handlers::cargo::list_cargoes,
        handlers::cargo::get_cargo_stats,
        handlers::cargo::get_cargo_link_options,
        handlers::cargo::get_cargo,
        handlers::cargo::create_cargo,
        handlers::cargo::update_cargo,
        handlers::cargo::change_cargo_status,
        handlers::cargo::link_cargo,
        handlers::cargo::delete_cargo,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::PermissionLevel,
            models::auth::Module,
            models::auth::ModulePermissions,
            models::auth::UserView,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::UserStats,

            // --- Parceiros ---
            models::partner::PartnerType,
            models::partner::DriverRef,
            models::partner::Partner,
            models::partner::Driver,
            models::partner::VehicleConfig,
            models::partner::Vehicle,
            models::partner::DriverCandidate,
            models::partner::CreatePartnerPayload,
            models::partner::UpdatePartnerPayload,
            models::partner::CreateDriverPayload,
            models::partner::UpdateDriverPayload,
            models::partner::CreateVehiclePayload,
            models::partner::UpdateVehiclePayload,
            models::partner::LinkKind,
            models::partner::LinkPayload,
            models::partner::UnlinkPayload,
            models::partner::LinkOptions,
            models::partner::PartnerStats,

            // --- Financeiro ---
            models::finance::MovementType,
            models::finance::MovementStatus,
            models::finance::FinancialMovement,
            models::finance::CreateMovementPayload,
            models::finance::UpdateMovementPayload,
            models::finance::MovementStatusPayload,
            models::finance::FinanceStats,
            models::finance::CategoryList,

            // --- Cargas ---
            models::cargo::CargoStatus,
            models::cargo::Cargo,
            models::cargo::CreateCargoPayload,
            models::cargo::UpdateCargoPayload,
            models::cargo::CargoStatusPayload,
            models::cargo::CargoLinkSelection,
            models::cargo::CargoLinkOptions,
            models::cargo::CargoStats,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e sessão"),
        (name = "Users", description = "Usuários e permissões por módulo"),
        (name = "Parceiros", description = "Parceiros PF/PJ"),
        (name = "Motoristas", description = "Motoristas dos parceiros"),
        (name = "Veículos", description = "Caminhões e conjuntos"),
        (name = "Vínculos", description = "Vínculos motorista ↔ veículo"),
        (name = "Financeiro", description = "Receitas e despesas"),
        (name = "Cargas", description = "Cargas e seus vínculos"),
        (name = "Dashboard", description = "Resumo da tela inicial")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
