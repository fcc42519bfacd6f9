// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::medicine::MedicineView;

// 1. Cards do topo. Conjuntos vazios viram zero, nunca null.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_medicines: i64,
    pub expired_count: i64,         // Registros em expired_medicines
    pub total_stock_value: Decimal, // Σ quantidade × preço, fora os já registrados como vencidos
    pub today_sales: Decimal,       // Vendas do dia (UTC)
    pub expired_value: Decimal,     // Σ original_value dos vencidos
    pub total_quantity: i64,
    pub expiring_week_count: i64,
    pub expiring_month_count: i64,
    pub low_stock_count: i64,
}

// 2. Tela inicial completa
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub summary: DashboardSummary,
    pub expiring_soon: Vec<MedicineView>,
    pub low_stock: Vec<MedicineView>,
    /// Quantos registros de vencidos a varredura desta visita criou
    pub newly_expired: usize,
}

// 3. Alertas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertsView {
    pub days: i64,
    pub expiring: Vec<MedicineView>,
    pub low_stock: Vec<MedicineView>,
}
