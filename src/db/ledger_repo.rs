// src/db/ledger_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ledger::{Sale, SaleEntry, Transaction, TransactionEntry, TransactionType},
};

/// Quantas linhas os históricos devolvem, no máximo.
pub const HISTORY_LIMIT: i64 = 500;

// Livro-razão: movimentações e vendas. Só INSERT e SELECT; nada aqui atualiza ou apaga.
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_transaction<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        medicine_id: Uuid,
        transaction_type: TransactionType,
        quantity: i32,
        notes: Option<&str>,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (medicine_id, user_id, transaction_type, quantity, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(medicine_id)
        .bind(user_id)
        .bind(transaction_type)
        .bind(quantity)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(transaction)
    }

    pub async fn record_sale<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        medicine_id: Uuid,
        quantity: i32,
        sale_price: Decimal,
        total_amount: Decimal,
        customer_name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (medicine_id, user_id, quantity, sale_price, total_amount, customer_name, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(medicine_id)
        .bind(user_id)
        .bind(quantity)
        .bind(sale_price)
        .bind(total_amount)
        .bind(customer_name)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(sale)
    }

    // ---
    // Históricos
    // ---

    pub async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<TransactionEntry>, AppError> {
        let entries = sqlx::query_as::<_, TransactionEntry>(
            r#"
            SELECT t.*, m.name AS medicine_name
            FROM transactions t
            JOIN medicines m ON m.id = t.medicine_id
            WHERE t.user_id = $1
            ORDER BY t.transaction_date DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn list_sales(&self, user_id: Uuid) -> Result<Vec<SaleEntry>, AppError> {
        let entries = sqlx::query_as::<_, SaleEntry>(
            r#"
            SELECT s.*, m.name AS medicine_name
            FROM sales s
            JOIN medicines m ON m.id = s.medicine_id
            WHERE s.user_id = $1
            ORDER BY s.sale_date DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn transactions_for_medicine(
        &self,
        user_id: Uuid,
        medicine_id: Uuid,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1 AND medicine_id = $2
            ORDER BY transaction_date DESC
            "#,
        )
        .bind(user_id)
        .bind(medicine_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    pub async fn sales_for_medicine(&self, user_id: Uuid, medicine_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE user_id = $1 AND medicine_id = $2
            ORDER BY sale_date DESC
            "#,
        )
        .bind(user_id)
        .bind(medicine_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}
