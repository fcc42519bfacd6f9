// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::{db_utils::today, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        dashboard::{AlertsView, DashboardView},
        expiry::{ExpiredReport, SweepResult},
        ledger::{SaleEntry, TransactionEntry},
        medicine::{views, MedicineView, EXPIRING_MONTH_DAYS, EXPIRING_SOON_DAYS},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertsQuery {
    /// Janela em dias (0 a 365, padrão 30)
    pub days: Option<i64>,
}

// ---
// Handler: dashboard
// ---
// Abrir o painel também roda a varredura de vencidos.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Resumo, vencendo em 7 dias e estoque baixo", body = DashboardView)),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let today = today();
    let user_id = user.id();

    let sweep = app_state
        .expiry_service
        .sweep(&app_state.db_pool, user_id, today)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .alert_service
        .dashboard_summary(user_id, today)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let expiring_soon = app_state
        .alert_service
        .expiring_within(user_id, today, EXPIRING_SOON_DAYS)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let low_stock = app_state
        .alert_service
        .low_stock(user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let view = DashboardView {
        summary,
        expiring_soon: views(expiring_soon, today),
        low_stock: views(low_stock, today),
        newly_expired: sweep.created.len(),
    };

    Ok((StatusCode::OK, Json(view)))
}

// ---
// Handler: alerts
// ---
#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "Alerts",
    params(AlertsQuery),
    responses(
        (status = 200, description = "Vencendo na janela e estoque baixo", body = AlertsView),
        (status = 400, description = "Janela fora de 0..=365")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<AlertsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let today = today();
    let days = query.days.unwrap_or(EXPIRING_MONTH_DAYS);

    let expiring = app_state
        .alert_service
        .expiring_within(user.id(), today, days)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let low_stock = app_state
        .alert_service
        .low_stock(user.id())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let view = AlertsView {
        days,
        expiring: views(expiring, today),
        low_stock: views(low_stock, today),
    };

    Ok((StatusCode::OK, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/alerts/low-stock",
    tag = "Alerts",
    responses((status = 200, description = "Estoque no limite ou abaixo", body = Vec<MedicineView>)),
    security(("api_jwt" = []))
)]
pub async fn get_low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let low_stock = app_state
        .alert_service
        .low_stock(user.id())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(views(low_stock, today()))))
}

// ---
// Vencidos
// ---
#[utoipa::path(
    get,
    path = "/api/expired",
    tag = "Expired",
    responses((status = 200, description = "Registros de vencidos com totais", body = ExpiredReport)),
    security(("api_jwt" = []))
)]
pub async fn get_expired(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .expiry_service
        .report(user.id())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

#[utoipa::path(
    post,
    path = "/api/expired/sweep",
    tag = "Expired",
    responses((status = 200, description = "Registros criados nesta varredura", body = SweepResult)),
    security(("api_jwt" = []))
)]
pub async fn sweep_expired(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .expiry_service
        .sweep(&app_state.db_pool, user.id(), today())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// ---
// Histórico
// ---
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "History",
    responses((status = 200, description = "Movimentações, da mais recente", body = Vec<TransactionEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .ledger_service
        .transactions(user.id())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "History",
    responses((status = 200, description = "Vendas, da mais recente", body = Vec<SaleEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .ledger_service
        .sales(user.id())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}
