// src/models/medicine.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ledger::{Sale, Transaction};

/// Janela do alerta "vence esta semana".
pub const EXPIRING_SOON_DAYS: i64 = 7;
/// Janela do alerta "vence este mês".
pub const EXPIRING_MONTH_DAYS: i64 = 30;
pub const DEFAULT_LOW_STOCK_ALERT: i32 = 10;
/// Casas decimais das colunas de preço (NUMERIC(12,2)).
pub const PRICE_SCALE: u32 = 2;

/// Maior preço que cabe em NUMERIC(12,2): 9 999 999 999.99.
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, PRICE_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    Negative,
    TooLarge,
    TooPrecise,
}

impl PriceError {
    pub fn message(self) -> &'static str {
        match self {
            PriceError::Negative => "The price cannot be negative.",
            PriceError::TooLarge => "The price cannot exceed 9999999999.99.",
            PriceError::TooPrecise => "The price cannot have more than 2 decimal places.",
        }
    }
}

/// Preço aceito como veio: nada de arredondar em silêncio.
pub fn check_price(price: Decimal) -> Result<(), PriceError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(PriceError::Negative);
    }
    if price > max_price() {
        return Err(PriceError::TooLarge);
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(PriceError::TooPrecise);
    }
    Ok(())
}

// --- 1. Forma farmacêutica ---
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "medicine_category", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum MedicineCategory {
    #[default]
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Ointment,
    Drops,
    Inhaler,
    Powder,
}

// --- 2. Medicamento (um lote de um produto) ---
// Dono explícito em user_id: toda consulta filtra por ele.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub batch_number: String,
    pub category: MedicineCategory,
    pub quantity: i32,
    pub price: Decimal,
    pub expiry_date: NaiveDate,
    pub low_stock_alert: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MedicineStatus {
    Expired,
    Expiring,
    Safe,
}

impl Medicine {
    /// Dias até o vencimento (negativo se já venceu).
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_alert
    }

    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        (0..=EXPIRING_SOON_DAYS).contains(&self.days_left(today))
    }

    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }

    pub fn status(&self, today: NaiveDate) -> MedicineStatus {
        match self.days_left(today) {
            d if d < 0 => MedicineStatus::Expired,
            d if d <= EXPIRING_SOON_DAYS => MedicineStatus::Expiring,
            _ => MedicineStatus::Safe,
        }
    }

    pub fn view(self, today: NaiveDate) -> MedicineView {
        MedicineView {
            days_left: self.days_left(today),
            status: self.status(today),
            is_expired: self.is_expired(today),
            is_low_stock: self.is_low_stock(),
            is_expiring_soon: self.is_expiring_soon(today),
            stock_value: self.stock_value(),
            medicine: self,
        }
    }
}

// --- 3. Visão para listagens e integrações ---
// O medicamento mais os indicadores calculados na data de hoje.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicineView {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub days_left: i64,
    pub status: MedicineStatus,
    pub is_expired: bool,
    pub is_low_stock: bool,
    pub is_expiring_soon: bool,
    pub stock_value: Decimal,
}

// Detalhe de um medicamento com o seu histórico
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDetail {
    pub medicine: MedicineView,
    pub transactions: Vec<Transaction>,
    pub sales: Vec<Sale>,
}

pub fn views(medicines: Vec<Medicine>, today: NaiveDate) -> Vec<MedicineView> {
    medicines.into_iter().map(|m| m.view(today)).collect()
}

// --- 4. Entradas já validadas (vindas dos payloads) ---

#[derive(Debug, Clone)]
pub struct NewMedicine {
    pub name: String,
    pub batch_number: String,
    pub category: MedicineCategory,
    pub quantity: i32,
    pub price: Decimal,
    pub expiry_date: NaiveDate,
    pub low_stock_alert: i32,
}

/// Tudo que pode ser editado. A quantidade fica de fora: só muda pelo livro-razão.
#[derive(Debug, Clone)]
pub struct MedicineChanges {
    pub name: String,
    pub batch_number: String,
    pub category: MedicineCategory,
    pub price: Decimal,
    pub expiry_date: NaiveDate,
    pub low_stock_alert: i32,
}

#[derive(Debug, Clone, Default)]
pub struct MedicineFilter {
    /// Trecho do nome (sem diferenciar maiúsculas)
    pub search: Option<String>,
    pub category: Option<MedicineCategory>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::medicine;
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn status_follows_days_left() {
        let t = today();
        let price = Decimal::new(200, 2);

        let expired = medicine(5, price, t - Duration::days(1));
        assert_eq!(expired.days_left(t), -1);
        assert_eq!(expired.status(t), MedicineStatus::Expired);
        assert!(expired.is_expired(t));
        assert!(!expired.is_expiring_soon(t));

        let today_exp = medicine(5, price, t);
        assert!(!today_exp.is_expired(t));
        assert!(today_exp.is_expiring_soon(t));

        let week = medicine(5, price, t + Duration::days(7));
        assert_eq!(week.status(t), MedicineStatus::Expiring);

        let later = medicine(5, price, t + Duration::days(8));
        assert_eq!(later.status(t), MedicineStatus::Safe);
        assert!(!later.is_expiring_soon(t));
    }

    #[test]
    fn low_stock_is_inclusive_of_threshold() {
        let t = today();
        let mut m = medicine(10, Decimal::ONE, t + Duration::days(60));
        assert!(m.is_low_stock());
        m.quantity = 11;
        assert!(!m.is_low_stock());
    }

    #[test]
    fn view_carries_flags_and_value() {
        let t = today();
        let m = medicine(3, Decimal::new(300, 2), t + Duration::days(3));
        let view = m.view(t);
        assert!(view.is_low_stock);
        assert!(view.is_expiring_soon);
        assert_eq!(view.stock_value, Decimal::new(900, 2));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Paracetamol");
        assert_eq!(json["category"], "tablet");
        assert_eq!(json["status"], "expiring");
        assert_eq!(json["daysLeft"], 3);
        assert_eq!(json["isLowStock"], true);
    }

    #[test]
    fn price_rules_match_the_column() {
        assert_eq!(check_price(Decimal::ZERO), Ok(()));
        assert_eq!(check_price(Decimal::new(250, 2)), Ok(()));
        // Zeros à direita não contam como precisão extra
        assert_eq!(check_price(Decimal::new(25000, 4)), Ok(()));
        assert_eq!(check_price(max_price()), Ok(()));

        assert_eq!(check_price(Decimal::new(-1, 2)), Err(PriceError::Negative));
        assert_eq!(check_price(Decimal::new(2555, 3)), Err(PriceError::TooPrecise));
        assert_eq!(check_price(max_price() + Decimal::new(1, 2)), Err(PriceError::TooLarge));
        assert_eq!(check_price(Decimal::from(100_000_000_000i64)), Err(PriceError::TooLarge));
    }

    #[test]
    fn category_parses_lowercase() {
        let c: MedicineCategory = serde_json::from_str("\"powder\"").unwrap();
        assert_eq!(c, MedicineCategory::Powder);
        assert!(serde_json::from_str::<MedicineCategory>("\"gel\"").is_err());
    }
}
