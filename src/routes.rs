// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Tudo abaixo exige Bearer válido
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route(
            "/medicines",
            get(handlers::medicines::list_medicines).post(handlers::medicines::create_medicine),
        )
        .route(
            "/medicines/{id}",
            get(handlers::medicines::get_medicine)
                .put(handlers::medicines::update_medicine)
                .delete(handlers::medicines::delete_medicine),
        )
        .route("/medicines/{id}/receive", post(handlers::medicines::receive_stock))
        .route("/medicines/{id}/sell", post(handlers::medicines::sell_medicine))
        .route("/stock/adjust", post(handlers::stock::adjust_stock))
        .route("/dashboard", get(handlers::reports::get_dashboard))
        .route("/alerts", get(handlers::reports::get_alerts))
        .route("/alerts/low-stock", get(handlers::reports::get_low_stock))
        .route("/expired", get(handlers::reports::get_expired))
        .route("/expired/sweep", post(handlers::reports::sweep_expired))
        .route("/transactions", get(handlers::reports::list_transactions))
        .route("/sales", get(handlers::reports::list_sales))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
