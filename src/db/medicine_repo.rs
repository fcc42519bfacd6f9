// src/db/medicine_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::medicine::{Medicine, MedicineChanges, MedicineFilter, NewMedicine},
};

#[derive(Clone)]
pub struct MedicineRepository {
    pool: PgPool,
}

impl MedicineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras (listagens usam a pool principal e SEMPRE filtram por user_id)
    // ---

    pub async fn list(&self, user_id: Uuid, filter: &MedicineFilter) -> Result<Vec<Medicine>, AppError> {
        let medicines = sqlx::query_as::<_, Medicine>(
            r#"
            SELECT * FROM medicines
            WHERE user_id = $1
              AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
              AND ($3::medicine_category IS NULL OR category = $3)
            ORDER BY expiry_date ASC, name ASC
            "#,
        )
        .bind(user_id)
        .bind(filter.search.as_deref())
        .bind(filter.category)
        .fetch_all(&self.pool)
        .await?;

        Ok(medicines)
    }

    /// Vencimento entre `from` e `to` (inclusive), do mais próximo ao mais distante.
    pub async fn expiring_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Medicine>, AppError> {
        let medicines = sqlx::query_as::<_, Medicine>(
            r#"
            SELECT * FROM medicines
            WHERE user_id = $1 AND expiry_date BETWEEN $2 AND $3
            ORDER BY expiry_date ASC, name ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(medicines)
    }

    pub async fn low_stock(&self, user_id: Uuid) -> Result<Vec<Medicine>, AppError> {
        let medicines = sqlx::query_as::<_, Medicine>(
            r#"
            SELECT * FROM medicines
            WHERE user_id = $1 AND quantity <= low_stock_alert
            ORDER BY quantity ASC, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(medicines)
    }

    /// Busca por id SEM filtrar o dono: quem chama passa pelo `access::authorize`.
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Medicine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(medicine)
    }

    /// Igual ao `find_by_id`, mas trava a linha até o fim da transação.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Medicine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(medicine)
    }

    // ---
    // Escritas (genéricas em 'Executor' para rodar dentro de uma transação)
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &NewMedicine,
    ) -> Result<Medicine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            INSERT INTO medicines
                (user_id, name, batch_number, category, quantity, price, expiry_date, low_stock_alert)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.batch_number)
        .bind(input.category)
        .bind(input.quantity)
        .bind(input.price)
        .bind(input.expiry_date)
        .bind(input.low_stock_alert)
        .fetch_one(executor)
        .await?;

        Ok(medicine)
    }

    /// Edita os dados cadastrais. `quantity` não é tocada aqui.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
        changes: &MedicineChanges,
    ) -> Result<Option<Medicine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            UPDATE medicines SET
                name = $3,
                batch_number = $4,
                category = $5,
                price = $6,
                expiry_date = $7,
                low_stock_alert = $8,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.batch_number)
        .bind(changes.category)
        .bind(changes.price)
        .bind(changes.expiry_date)
        .bind(changes.low_stock_alert)
        .fetch_optional(executor)
        .await?;

        Ok(medicine)
    }

    /// Remove o medicamento; movimentações, vendas e vencidos caem junto (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM medicines WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn increment_quantity<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
        quantity: i32,
    ) -> Result<Option<Medicine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            UPDATE medicines SET quantity = quantity + $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;

        Ok(medicine)
    }

    /// Baixa condicional ("compare-and-decrement"): só atualiza se ainda houver
    /// `quantity` em estoque no momento da escrita. `None` = saldo insuficiente.
    pub async fn decrement_quantity_if_available<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
        quantity: i32,
    ) -> Result<Option<Medicine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            UPDATE medicines SET quantity = quantity - $3, updated_at = now()
            WHERE id = $1 AND user_id = $2 AND quantity >= $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;

        Ok(medicine)
    }
}

// Usado só nos testes de banco para montar cenários com validade no passado,
// algo que o fluxo normal de criação recusa.
#[cfg(test)]
pub(crate) async fn insert_raw(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    quantity: i32,
    price: rust_decimal::Decimal,
    expiry_date: NaiveDate,
    low_stock_alert: i32,
) -> Result<Medicine, AppError> {
    let medicine = sqlx::query_as::<_, Medicine>(
        r#"
        INSERT INTO medicines
            (user_id, name, batch_number, category, quantity, price, expiry_date, low_stock_alert)
        VALUES ($1, $2, 'TEST-001', $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(crate::models::medicine::MedicineCategory::Tablet)
    .bind(quantity)
    .bind(price)
    .bind(expiry_date)
    .bind(low_stock_alert)
    .fetch_one(pool)
    .await?;

    Ok(medicine)
}
