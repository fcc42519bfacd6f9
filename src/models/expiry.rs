// src/models/expiry.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::medicine::MedicineCategory;

// Fotografia de um medicamento no dia em que o vencimento foi detectado.
// No máximo uma por medicamento (UNIQUE no banco).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredMedicine {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub batch_number: String,
    pub category: MedicineCategory,
    pub quantity: i32,
    pub price: Decimal,
    pub expiry_date: NaiveDate,
    pub original_value: Decimal, // quantity × price na detecção
    pub expired_at: DateTime<Utc>,
}

// Relatório de vencidos com os totais
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredReport {
    pub records: Vec<ExpiredMedicine>,
    pub total_quantity: i64,
    pub total_value: Decimal,
}

impl ExpiredReport {
    pub fn from_records(records: Vec<ExpiredMedicine>) -> Self {
        let total_quantity = records.iter().map(|r| i64::from(r.quantity)).sum();
        let total_value = records.iter().map(|r| r.original_value).sum();
        Self { records, total_quantity, total_value }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    pub created: Vec<ExpiredMedicine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_totals_are_zero() {
        let report = ExpiredReport::from_records(Vec::new());
        assert_eq!(report.total_quantity, 0);
        assert_eq!(report.total_value, Decimal::ZERO);
    }

    #[test]
    fn report_sums_snapshots() {
        let record = |quantity: i32, value: i64| ExpiredMedicine {
            id: Uuid::new_v4(),
            medicine_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Amoxicillin".into(),
            batch_number: "A1".into(),
            category: MedicineCategory::Capsule,
            quantity,
            price: Decimal::new(300, 2),
            expiry_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            original_value: Decimal::new(value, 2),
            expired_at: Utc::now(),
        };

        let report = ExpiredReport::from_records(vec![record(5, 1500), record(2, 600)]);
        assert_eq!(report.total_quantity, 7);
        assert_eq!(report.total_value, Decimal::new(2100, 2));
    }
}
