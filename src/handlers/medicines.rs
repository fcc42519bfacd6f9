// src/handlers/medicines.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        db_utils::today,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        ledger::{SaleReceipt, SaleRequest, StockChange, StockReceipt},
        medicine::{
            check_price, views, MedicineCategory, MedicineChanges, MedicineDetail, MedicineFilter, MedicineView,
            NewMedicine, DEFAULT_LOW_STOCK_ALERT,
        },
    },
};

// ---
// Validações customizadas
// ---
// Mesmos limites da coluna NUMERIC(12,2): 0 a 9999999999.99, no máximo 2 casas.
pub(crate) fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    check_price(*val).map_err(|e| {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &9_999_999_999.99);
        err.message = Some(e.message().into());
        err
    })
}

/// Texto opcional em branco vira ausente.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicinePayload {
    #[validate(length(min = 1, max = 100, message = "Name must have between 1 and 100 characters."))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Batch number must have between 1 and 50 characters."))]
    pub batch_number: String,

    pub category: MedicineCategory,

    // Ignorada na edição: a quantidade só muda pelo livro-razão
    #[validate(range(min = 0, message = "Quantity cannot be negative."))]
    #[serde(default)]
    pub quantity: i32,

    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    pub expiry_date: NaiveDate,

    #[validate(range(min = 0, message = "Low stock alert cannot be negative."))]
    pub low_stock_alert: Option<i32>,
}

impl MedicinePayload {
    fn into_new(self) -> NewMedicine {
        NewMedicine {
            name: self.name.trim().to_string(),
            batch_number: self.batch_number.trim().to_string(),
            category: self.category,
            quantity: self.quantity,
            price: self.price,
            expiry_date: self.expiry_date,
            low_stock_alert: self.low_stock_alert.unwrap_or(DEFAULT_LOW_STOCK_ALERT),
        }
    }

    fn into_changes(self) -> MedicineChanges {
        MedicineChanges {
            name: self.name.trim().to_string(),
            batch_number: self.batch_number.trim().to_string(),
            category: self.category,
            price: self.price,
            expiry_date: self.expiry_date,
            low_stock_alert: self.low_stock_alert.unwrap_or(DEFAULT_LOW_STOCK_ALERT),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MedicineQuery {
    /// Trecho do nome
    pub search: Option<String>,
    pub category: Option<MedicineCategory>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStockPayload {
    #[validate(range(min = 1, message = "Quantity must be greater than zero."))]
    pub quantity: i32,

    #[validate(length(max = 200, message = "Note must have at most 200 characters."))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellPayload {
    #[validate(range(min = 1, message = "Quantity must be greater than zero."))]
    pub quantity: i32,

    // Sem preço: vende pelo preço cadastrado
    #[validate(custom(function = "validate_price"))]
    pub sale_price: Option<Decimal>,

    #[validate(length(max = 100, message = "Customer name must have at most 100 characters."))]
    pub customer_name: Option<String>,

    #[validate(length(max = 200, message = "Note must have at most 200 characters."))]
    pub note: Option<String>,
}

// ---
// Handler: list_medicines
// ---
#[utoipa::path(
    get,
    path = "/api/medicines",
    tag = "Medicines",
    params(MedicineQuery),
    responses(
        (status = 200, description = "Medicamentos do usuário com os indicadores", body = Vec<MedicineView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_medicines(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<MedicineQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = MedicineFilter { search: non_blank(query.search), category: query.category };

    let medicines = app_state
        .medicine_service
        .list(user.id(), &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(views(medicines, today()))))
}

// ---
// Handler: create_medicine
// ---
#[utoipa::path(
    post,
    path = "/api/medicines",
    tag = "Medicines",
    request_body = MedicinePayload,
    responses(
        (status = 201, description = "Medicamento cadastrado", body = MedicineView),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_medicine(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<MedicinePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let today = today();
    let medicine = app_state
        .medicine_service
        .create(&app_state.db_pool, user.id(), payload.into_new(), today)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(medicine.view(today))))
}

// ---
// Handler: get_medicine
// ---
#[utoipa::path(
    get,
    path = "/api/medicines/{id}",
    tag = "Medicines",
    params(("id" = Uuid, Path, description = "ID do medicamento")),
    responses(
        (status = 200, description = "Detalhe com movimentações e vendas", body = MedicineDetail),
        (status = 303, description = "Medicamento de outro usuário: volta para a listagem"),
        (status = 404, description = "Medicamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_medicine(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .medicine_service
        .get_detail(&app_state.db_pool, user.id(), id, today())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Handler: update_medicine
// ---
#[utoipa::path(
    put,
    path = "/api/medicines/{id}",
    tag = "Medicines",
    request_body = MedicinePayload,
    params(("id" = Uuid, Path, description = "ID do medicamento")),
    responses(
        (status = 200, description = "Medicamento atualizado", body = MedicineView),
        (status = 303, description = "Medicamento de outro usuário: volta para a listagem"),
        (status = 404, description = "Medicamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_medicine(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MedicinePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let today = today();
    let medicine = app_state
        .medicine_service
        .update(&app_state.db_pool, user.id(), id, payload.into_changes(), today)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(medicine.view(today))))
}

// ---
// Handler: delete_medicine
// ---
#[utoipa::path(
    delete,
    path = "/api/medicines/{id}",
    tag = "Medicines",
    params(("id" = Uuid, Path, description = "ID do medicamento")),
    responses(
        (status = 204, description = "Removido junto com o histórico"),
        (status = 303, description = "Medicamento de outro usuário: volta para a listagem"),
        (status = 404, description = "Medicamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_medicine(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .medicine_service
        .delete(&app_state.db_pool, user.id(), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handler: receive_stock
// ---
#[utoipa::path(
    post,
    path = "/api/medicines/{id}/receive",
    tag = "Stock",
    request_body = ReceiveStockPayload,
    params(("id" = Uuid, Path, description = "ID do medicamento")),
    responses(
        (status = 201, description = "Entrada registrada", body = StockChange),
        (status = 303, description = "Medicamento de outro usuário: volta para a listagem")
    ),
    security(("api_jwt" = []))
)]
pub async fn receive_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiveStockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let input = StockReceipt { quantity: payload.quantity, note: non_blank(payload.note) };
    let change = app_state
        .ledger_service
        .receive_stock(&app_state.db_pool, user.id(), id, input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(change)))
}

// ---
// Handler: sell_medicine
// ---
#[utoipa::path(
    post,
    path = "/api/medicines/{id}/sell",
    tag = "Stock",
    request_body = SellPayload,
    params(("id" = Uuid, Path, description = "ID do medicamento")),
    responses(
        (status = 201, description = "Venda registrada", body = SaleReceipt),
        (status = 409, description = "Estoque insuficiente"),
        (status = 303, description = "Medicamento de outro usuário: volta para a listagem")
    ),
    security(("api_jwt" = []))
)]
pub async fn sell_medicine(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SellPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = SaleRequest {
        quantity: payload.quantity,
        sale_price: payload.sale_price,
        customer_name: non_blank(payload.customer_name),
        note: non_blank(payload.note),
    };
    let receipt = app_state
        .ledger_service
        .record_sale(&app_state.db_pool, user.id(), id, request, today())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Ana ".into())), Some("Ana".to_string()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn payload_rules() {
        let json = serde_json::json!({
            "name": "",
            "batchNumber": "B1",
            "category": "syrup",
            "quantity": -1,
            "price": -2.5,
            "expiryDate": "2030-01-01"
        });
        let payload: MedicinePayload = serde_json::from_value(json).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("quantity"));
        assert!(fields.contains_key("price"));
        assert!(!fields.contains_key("batch_number"));
    }

    #[test]
    fn omitted_threshold_uses_default() {
        let json = serde_json::json!({
            "name": "Paracetamol",
            "batchNumber": "B12345",
            "category": "tablet",
            "quantity": 50,
            "price": 2.0,
            "expiryDate": "2030-01-01"
        });
        let payload: MedicinePayload = serde_json::from_value(json).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.into_new().low_stock_alert, DEFAULT_LOW_STOCK_ALERT);
    }

    #[test]
    fn prices_outside_the_column_are_rejected() {
        for price in ["100000000000", "2.555"] {
            let json = format!(
                r#"{{"name":"X","batchNumber":"B1","category":"tablet","price":"{price}","expiryDate":"2030-01-01"}}"#
            );
            let payload: MedicinePayload = serde_json::from_str(&json).unwrap();
            let errors = payload.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("price"), "{price}");
        }

        let payload: SellPayload =
            serde_json::from_str(r#"{"quantity":10,"salePrice":"10000000000000000000000000000"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn sell_payload_rejects_zero_and_negative_price() {
        let payload: SellPayload =
            serde_json::from_value(serde_json::json!({ "quantity": 0, "salePrice": -1.0 })).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
        assert_eq!(errors.field_errors().len(), 2);
    }
}
