// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app(app_state: AppState) -> Router {
    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/stats", get(handlers::users::get_user_stats))
        .route("/me", get(handlers::users::get_me))
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        );

    let partner_routes = Router::new()
        .route(
            "/",
            get(handlers::partners::list_partners).post(handlers::partners::create_partner),
        )
        .route("/stats", get(handlers::partners::get_partner_stats))
        .route("/driver-candidates", get(handlers::partners::list_driver_candidates))
        .route(
            "/links",
            post(handlers::partners::link).delete(handlers::partners::unlink),
        )
        .route(
            "/{id}",
            get(handlers::partners::get_partner)
                .put(handlers::partners::update_partner)
                .delete(handlers::partners::delete_partner),
        )
        .route("/{id}/block", post(handlers::partners::block_partner))
        .route("/{id}/unblock", post(handlers::partners::unblock_partner))
        .route(
            "/{id}/drivers",
            get(handlers::partners::list_partner_drivers).post(handlers::partners::create_driver),
        )
        .route(
            "/{id}/vehicles",
            get(handlers::partners::list_partner_vehicles).post(handlers::partners::create_vehicle),
        )
        .route("/{id}/link-options", get(handlers::partners::get_link_options));

    let finance_routes = Router::new()
        .route(
            "/movements",
            get(handlers::finance::list_movements).post(handlers::finance::create_movement),
        )
        .route(
            "/movements/{id}",
            get(handlers::finance::get_movement)
                .put(handlers::finance::update_movement)
                .delete(handlers::finance::delete_movement),
        )
        .route("/movements/{id}/status", patch(handlers::finance::set_movement_status))
        .route("/stats", get(handlers::finance::get_finance_stats))
        .route("/categories", get(handlers::finance::list_categories));

    let cargo_routes = Router::new()
        .route(
            "/",
            get(handlers::cargo::list_cargoes).post(handlers::cargo::create_cargo),
        )
        .route("/stats", get(handlers::cargo::get_cargo_stats))
        .route("/link-options", get(handlers::cargo::get_cargo_link_options))
        .route(
            "/{id}",
            get(handlers::cargo::get_cargo)
                .put(handlers::cargo::update_cargo)
                .delete(handlers::cargo::delete_cargo),
        )
        .route("/{id}/status", patch(handlers::cargo::change_cargo_status))
        .route("/{id}/link", put(handlers::cargo::link_cargo));

    // Tudo abaixo exige Bearer válido
    let protected = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .nest("/api/users", user_routes)
        .nest("/api/partners", partner_routes)
        .route(
            "/api/drivers/{id}",
            get(handlers::partners::get_driver)
                .put(handlers::partners::update_driver)
                .delete(handlers::partners::delete_driver),
        )
        .route(
            "/api/vehicles/{id}",
            get(handlers::partners::get_vehicle)
                .put(handlers::partners::update_vehicle)
                .delete(handlers::partners::delete_vehicle),
        )
        .nest("/api/finance", finance_routes)
        .nest("/api/cargoes", cargo_routes)
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        // Rotas públicas
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/session", get(handlers::auth::session))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
