// src/models/ledger.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::error::AppError, models::medicine::Medicine};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,  // Vira "in"
    Out, // Vira "out"
}

// --- Movimentação (livro-razão, append-only) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub notes: Option<String>,
    pub transaction_date: DateTime<Utc>,
}

// --- Venda (sempre acompanhada de uma movimentação "out") ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub sale_price: Decimal,
    pub total_amount: Decimal,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub sale_date: DateTime<Utc>,
}

// Linhas do histórico, já com o nome do medicamento
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub transaction: Transaction,
    pub medicine_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sale: Sale,
    pub medicine_name: String,
}

// --- Entradas já validadas ---

#[derive(Debug, Clone)]
pub struct StockReceipt {
    pub quantity: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SaleRequest {
    pub quantity: i32,
    /// Sem preço informado, vende pelo preço cadastrado.
    pub sale_price: Option<Decimal>,
    pub customer_name: Option<String>,
    pub note: Option<String>,
}

/// Verbo do endpoint programático de ajuste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAction {
    Add,
    Sell,
}

impl FromStr for StockAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(StockAction::Add),
            "sell" => Ok(StockAction::Sell),
            _ => Err(AppError::InvalidAction(s.to_string())),
        }
    }
}

// --- Resultados das operações ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub medicine: Medicine,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub medicine: Medicine,
    pub sale: Sale,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub medicine: Medicine,
    pub transaction: Transaction,
    pub sale: Option<Sale>,
}

impl From<StockChange> for StockAdjustment {
    fn from(change: StockChange) -> Self {
        Self { medicine: change.medicine, transaction: change.transaction, sale: None }
    }
}

impl From<SaleReceipt> for StockAdjustment {
    fn from(receipt: SaleReceipt) -> Self {
        Self { medicine: receipt.medicine, transaction: receipt.transaction, sale: Some(receipt.sale) }
    }
}
