// src/services/ledger_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LedgerRepository, MedicineRepository},
    models::{
        ledger::{
            SaleEntry, SaleReceipt, SaleRequest, StockAction, StockAdjustment, StockChange,
            StockReceipt, TransactionEntry, TransactionType,
        },
        medicine::Medicine,
    },
    services::{access, medicine_service::ensure_valid_price},
};

/// Limite da coluna `notes` (VARCHAR(200)).
const NOTE_MAX_CHARS: usize = 200;

#[derive(Clone)]
pub struct LedgerService {
    medicine_repo: MedicineRepository,
    ledger_repo: LedgerRepository,
}

impl LedgerService {
    pub fn new(medicine_repo: MedicineRepository, ledger_repo: LedgerRepository) -> Self {
        Self { medicine_repo, ledger_repo }
    }

    // --- ENTRADA ---
    pub async fn receive_stock<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        medicine_id: Uuid,
        input: StockReceipt,
    ) -> Result<StockChange, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        ensure_positive_quantity(input.quantity)?;

        let mut tx = executor.begin().await?;

        // 1. Trava a linha e confere o dono
        let found = self.medicine_repo.find_by_id_for_update(&mut *tx, medicine_id).await?;
        let current = access::require_owned(found, user_id)?;
        if current.quantity.checked_add(input.quantity).is_none() {
            return Err(AppError::field("quantity", "range", "Quantity is too large."));
        }

        // 2. Soma no saldo
        let medicine = self
            .medicine_repo
            .increment_quantity(&mut *tx, user_id, medicine_id, input.quantity)
            .await?
            .ok_or(AppError::MedicineNotFound)?;

        // 3. Grava a movimentação
        let transaction = self
            .ledger_repo
            .record_transaction(
                &mut *tx,
                user_id,
                medicine_id,
                TransactionType::In,
                input.quantity,
                input.note.as_deref(),
            )
            .await?;

        // Se qualquer passo acima falhar, o tx cai no drop e sofre rollback
        tx.commit().await?;

        tracing::info!(
            %user_id, %medicine_id,
            quantity = input.quantity,
            new_quantity = medicine.quantity,
            "📦 Entrada de estoque registrada"
        );
        Ok(StockChange { medicine, transaction })
    }

    // --- VENDA (SAÍDA) ---
    pub async fn record_sale<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        medicine_id: Uuid,
        input: SaleRequest,
        today: NaiveDate,
    ) -> Result<SaleReceipt, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        ensure_positive_quantity(input.quantity)?;
        if let Some(price) = input.sale_price {
            ensure_valid_price("salePrice", price)?;
        }

        let mut tx = executor.begin().await?;

        // 1. Trava a linha, confere o dono e o saldo
        let found = self.medicine_repo.find_by_id_for_update(&mut *tx, medicine_id).await?;
        let current = access::require_owned(found, user_id)?;
        ensure_available(&current, input.quantity)?;

        if current.is_expired(today) {
            tracing::warn!(%user_id, %medicine_id, expiry_date = %current.expiry_date, "⚠️ Venda de medicamento vencido");
        }

        let sale_price = input.sale_price.unwrap_or(current.price);
        let total_amount = sale_total(input.quantity, sale_price)?;

        // 2. Baixa condicional: revalida o saldo no momento da escrita
        let medicine = self
            .medicine_repo
            .decrement_quantity_if_available(&mut *tx, user_id, medicine_id, input.quantity)
            .await?
            .ok_or(AppError::InsufficientStock {
                requested: input.quantity,
                available: current.quantity,
            })?;

        // 3. Venda + movimentação "out" pareada
        let sale = self
            .ledger_repo
            .record_sale(
                &mut *tx,
                user_id,
                medicine_id,
                input.quantity,
                sale_price,
                total_amount,
                input.customer_name.as_deref(),
                input.note.as_deref(),
            )
            .await?;

        let note = sale_note(input.customer_name.as_deref(), input.note.as_deref());
        let transaction = self
            .ledger_repo
            .record_transaction(
                &mut *tx,
                user_id,
                medicine_id,
                TransactionType::Out,
                input.quantity,
                Some(note.as_str()),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            %user_id, %medicine_id,
            quantity = input.quantity,
            total = %total_amount,
            new_quantity = medicine.quantity,
            "💰 Venda registrada"
        );
        Ok(SaleReceipt { medicine, sale, transaction })
    }

    // --- AJUSTE PROGRAMÁTICO (add / sell) ---
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        medicine_id: Uuid,
        action: &str,
        quantity: i32,
        note: Option<String>,
        today: NaiveDate,
    ) -> Result<StockAdjustment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        match action.parse::<StockAction>()? {
            StockAction::Add => {
                let change = self
                    .receive_stock(executor, user_id, medicine_id, StockReceipt { quantity, note })
                    .await?;
                Ok(change.into())
            }
            StockAction::Sell => {
                // Venda pelo preço cadastrado, sem cliente
                let request = SaleRequest { quantity, sale_price: None, customer_name: None, note };
                let receipt = self
                    .record_sale(executor, user_id, medicine_id, request, today)
                    .await?;
                Ok(receipt.into())
            }
        }
    }

    // --- HISTÓRICO ---
    pub async fn transactions(&self, user_id: Uuid) -> Result<Vec<TransactionEntry>, AppError> {
        self.ledger_repo.list_transactions(user_id).await
    }

    pub async fn sales(&self, user_id: Uuid) -> Result<Vec<SaleEntry>, AppError> {
        self.ledger_repo.list_sales(user_id).await
    }
}

// ---
// Regras puras do livro-razão
// ---

pub(crate) fn ensure_positive_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::field("quantity", "range", "Quantity must be greater than zero."));
    }
    Ok(())
}

pub(crate) fn ensure_available(medicine: &Medicine, requested: i32) -> Result<(), AppError> {
    if requested > medicine.quantity {
        return Err(AppError::InsufficientStock { requested, available: medicine.quantity });
    }
    Ok(())
}

/// Total exato (Decimal), sem arredondamento. Estouro vira erro de validação, nunca pânico.
pub(crate) fn sale_total(quantity: i32, sale_price: Decimal) -> Result<Decimal, AppError> {
    Decimal::from(quantity)
        .checked_mul(sale_price)
        .ok_or_else(|| AppError::field("salePrice", "range", "Sale total is too large."))
}

/// Observação da movimentação "out" a partir do cliente e da nota da venda.
pub(crate) fn sale_note(customer: Option<&str>, note: Option<&str>) -> String {
    let customer = customer.map(str::trim).filter(|c| !c.is_empty());
    let note = note.map(str::trim).filter(|n| !n.is_empty());

    let text = match (customer, note) {
        (Some(c), Some(n)) => format!("Sale to {c}: {n}"),
        (Some(c), None) => format!("Sale to {c}"),
        (None, Some(n)) => format!("Sale: {n}"),
        (None, None) => "Sale".to_string(),
    };

    text.chars().take(NOTE_MAX_CHARS).collect()
}
