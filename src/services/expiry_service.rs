// src/services/expiry_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ExpiryRepository,
    models::expiry::{ExpiredReport, SweepResult},
};

#[derive(Clone)]
pub struct ExpiryService {
    expiry_repo: ExpiryRepository,
}

impl ExpiryService {
    pub fn new(expiry_repo: ExpiryRepository) -> Self {
        Self { expiry_repo }
    }

    // --- SWEEP ---
    // Registra cada lote vencido e ainda com saldo uma única vez.
    // Rodar de novo no mesmo dia não cria nada.
    pub async fn sweep<'e, E>(&self, executor: E, user_id: Uuid, today: NaiveDate) -> Result<SweepResult, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let created = self.expiry_repo.insert_missing(&mut *tx, user_id, today).await?;
        tx.commit().await?;

        for record in &created {
            tracing::warn!(
                %user_id,
                medicine_id = %record.medicine_id,
                name = %record.name,
                quantity = record.quantity,
                original_value = %record.original_value,
                "⏰ Medicamento vencido registrado"
            );
        }

        Ok(SweepResult { created })
    }

    // --- REPORT ---
    pub async fn report(&self, user_id: Uuid) -> Result<ExpiredReport, AppError> {
        let records = self.expiry_repo.list(user_id).await?;
        Ok(ExpiredReport::from_records(records))
    }
}
