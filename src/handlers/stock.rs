// src/handlers/stock.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::today,
        error::{ApiError, AppError},
    },
    config::AppState,
    handlers::medicines::non_blank,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::ledger::StockAdjustment,
};

// Ajuste programático de estoque, para integrações
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    pub medicine_id: Uuid,

    /// "add" ou "sell" (sem diferenciar maiúsculas)
    #[validate(length(min = 1, message = "Action is required."))]
    pub action: String,

    #[validate(range(min = 1, message = "Quantity must be greater than zero."))]
    pub quantity: i32,

    #[validate(length(max = 200, message = "Note must have at most 200 characters."))]
    pub note: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/stock/adjust",
    tag = "Stock",
    request_body = AdjustStockPayload,
    responses(
        (status = 201, description = "Ajuste aplicado", body = StockAdjustment),
        (status = 400, description = "Ação inválida ou dados inválidos"),
        (status = 409, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let adjustment = app_state
        .ledger_service
        .adjust_stock(
            &app_state.db_pool,
            user.id(),
            payload.medicine_id,
            &payload.action,
            payload.quantity,
            non_blank(payload.note),
            today(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(adjustment)))
}
