// src/db/expiry_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::expiry::ExpiredMedicine};

#[derive(Clone)]
pub struct ExpiryRepository {
    pool: PgPool,
}

impl ExpiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fotografa os medicamentos vencidos (validade < `today`, quantidade > 0)
    /// que ainda não têm registro. Devolve só os registros criados agora.
    ///
    /// O `ON CONFLICT (medicine_id) DO NOTHING` torna a operação idempotente,
    /// inclusive com duas varreduras concorrentes.
    pub async fn insert_missing<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<ExpiredMedicine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, ExpiredMedicine>(
            r#"
            INSERT INTO expired_medicines (
                medicine_id, user_id, name, batch_number, category,
                quantity, price, expiry_date, original_value
            )
            SELECT m.id, m.user_id, m.name, m.batch_number, m.category,
                   m.quantity, m.price, m.expiry_date, m.quantity * m.price
            FROM medicines m
            WHERE m.user_id = $1
              AND m.expiry_date < $2
              AND m.quantity > 0
              AND NOT EXISTS (SELECT 1 FROM expired_medicines e WHERE e.medicine_id = m.id)
            ON CONFLICT (medicine_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(executor)
        .await?;

        Ok(created)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ExpiredMedicine>, AppError> {
        let records = sqlx::query_as::<_, ExpiredMedicine>(
            r#"
            SELECT * FROM expired_medicines
            WHERE user_id = $1
            ORDER BY expired_at DESC, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
