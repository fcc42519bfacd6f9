// src/db/dashboard_repo.rs

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        dashboard::DashboardSummary,
        medicine::{EXPIRING_MONTH_DAYS, EXPIRING_SOON_DAYS},
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(&self, user_id: Uuid, today: NaiveDate) -> Result<DashboardSummary, AppError> {
        self.get_summary(&self.pool, user_id, today).await
    }

    // Resumo geral. Todo SUM/COUNT passa por COALESCE: sem linhas, o resultado é 0.
    // Abre a própria transação: o executor não pode estar no meio de outra.
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // REPEATABLE READ: as quatro consultas leem o mesmo snapshot
        let mut tx = executor.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        // A. Medicamentos (contagem, quantidade, janelas de vencimento e estoque baixo)
        let (total_medicines, total_quantity, expiring_week_count, expiring_month_count, low_stock_count) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(quantity), 0)::BIGINT,
                    COUNT(*) FILTER (WHERE expiry_date BETWEEN $2 AND $3),
                    COUNT(*) FILTER (WHERE expiry_date BETWEEN $2 AND $4),
                    COUNT(*) FILTER (WHERE quantity <= low_stock_alert)
                FROM medicines
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .bind(today)
            .bind(today + Duration::days(EXPIRING_SOON_DAYS))
            .bind(today + Duration::days(EXPIRING_MONTH_DAYS))
            .fetch_one(&mut *tx)
            .await?;

        // B. Valor em estoque, ignorando o que já foi registrado como vencido
        let total_stock_value: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(m.quantity * m.price), 0)
            FROM medicines m
            WHERE m.user_id = $1
              AND NOT EXISTS (SELECT 1 FROM expired_medicines e WHERE e.medicine_id = m.id)
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // C. Vendas de hoje (dia civil em UTC)
        let today_sales: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE user_id = $1 AND (sale_date AT TIME ZONE 'UTC')::date = $2
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        // D. Vencidos
        let (expired_count, expired_value) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(original_value), 0)
            FROM expired_medicines
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            total_medicines,
            expired_count,
            total_stock_value,
            today_sales,
            expired_value,
            total_quantity,
            expiring_week_count,
            expiring_month_count,
            low_stock_count,
        })
    }
}
