// src/services/medicine_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LedgerRepository, MedicineRepository},
    models::medicine::{check_price, Medicine, MedicineChanges, MedicineDetail, MedicineFilter, NewMedicine},
    services::access,
};

#[derive(Clone)]
pub struct MedicineService {
    medicine_repo: MedicineRepository,
    ledger_repo: LedgerRepository,
}

impl MedicineService {
    pub fn new(medicine_repo: MedicineRepository, ledger_repo: LedgerRepository) -> Self {
        Self { medicine_repo, ledger_repo }
    }

    // --- CREATE ---
    // A quantidade inicial entra direto no cadastro, sem movimentação no livro-razão.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: NewMedicine,
        today: NaiveDate,
    ) -> Result<Medicine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        ensure_future_expiry(input.expiry_date, today)?;
        if input.quantity < 0 {
            return Err(AppError::field("quantity", "range", "Quantity cannot be negative."));
        }
        ensure_valid_price("price", input.price)?;

        let medicine = self.medicine_repo.create(executor, user_id, &input).await?;
        tracing::info!(%user_id, medicine_id = %medicine.id, name = %medicine.name, "💊 Medicamento cadastrado");
        Ok(medicine)
    }

    // --- LIST / SEARCH / FILTER ---
    pub async fn list(&self, user_id: Uuid, filter: &MedicineFilter) -> Result<Vec<Medicine>, AppError> {
        self.medicine_repo.list(user_id, filter).await
    }

    // --- DETAIL ---
    pub async fn get_detail<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        medicine_id: Uuid,
        today: NaiveDate,
    ) -> Result<MedicineDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found = self.medicine_repo.find_by_id(executor, medicine_id).await?;
        let medicine = access::require_owned(found, user_id)?;

        let transactions = self.ledger_repo.transactions_for_medicine(user_id, medicine_id).await?;
        let sales = self.ledger_repo.sales_for_medicine(user_id, medicine_id).await?;

        Ok(MedicineDetail { medicine: medicine.view(today), transactions, sales })
    }

    // --- UPDATE ---
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        medicine_id: Uuid,
        changes: MedicineChanges,
        today: NaiveDate,
    ) -> Result<Medicine, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        ensure_future_expiry(changes.expiry_date, today)?;
        ensure_valid_price("price", changes.price)?;

        let mut tx = executor.begin().await?;

        let found = self.medicine_repo.find_by_id_for_update(&mut *tx, medicine_id).await?;
        access::require_owned(found, user_id)?;

        let medicine = self
            .medicine_repo
            .update(&mut *tx, user_id, medicine_id, &changes)
            .await?
            .ok_or(AppError::MedicineNotFound)?;

        tx.commit().await?;
        Ok(medicine)
    }

    // --- DELETE ---
    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, medicine_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let found = self.medicine_repo.find_by_id_for_update(&mut *tx, medicine_id).await?;
        access::require_owned(found, user_id)?;

        self.medicine_repo.delete(&mut *tx, user_id, medicine_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %medicine_id, "🗑️ Medicamento removido (com histórico)");
        Ok(())
    }
}

/// Validade tem que ser estritamente depois de hoje no cadastro e na edição.
pub(crate) fn ensure_future_expiry(expiry_date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if expiry_date <= today {
        return Err(AppError::field("expiryDate", "future", "Expiry date must be in the future."));
    }
    Ok(())
}

/// Preço dentro do que a coluna guarda; `field` é o nome do campo no payload.
pub(crate) fn ensure_valid_price(field: &'static str, price: Decimal) -> Result<(), AppError> {
    check_price(price).map_err(|e| AppError::field(field, "range", e.message()))
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::{
        models::medicine::{MedicineCategory, DEFAULT_LOW_STOCK_ALERT},
        services::test_support::{create_user, medicine_service, today},
    };
    use chrono::Duration;
    use sqlx::PgPool;

    fn paracetamol() -> NewMedicine {
        NewMedicine {
            name: "Paracetamol".into(),
            batch_number: "B12345".into(),
            category: MedicineCategory::Tablet,
            quantity: 50,
            price: Decimal::new(200, 2),
            expiry_date: today() + Duration::days(60),
            low_stock_alert: DEFAULT_LOW_STOCK_ALERT,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn listings_never_leak_other_users(pool: PgPool) {
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let service = medicine_service(&pool);

        let med = service.create(&pool, alice, paracetamol(), today()).await.unwrap();

        assert_eq!(service.list(alice, &MedicineFilter::default()).await.unwrap().len(), 1);
        assert!(service.list(bob, &MedicineFilter::default()).await.unwrap().is_empty());

        let search = MedicineFilter { search: Some("PARA".into()), category: None };
        assert_eq!(service.list(alice, &search).await.unwrap().len(), 1);
        let syrup = MedicineFilter { search: None, category: Some(MedicineCategory::Syrup) };
        assert!(service.list(alice, &syrup).await.unwrap().is_empty());

        let err = service.get_detail(&pool, bob, med.id, today()).await.unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));
        let err = service.delete(&pool, bob, med.id).await.unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));

        let changes = MedicineChanges {
            name: "Hack".into(),
            batch_number: "X".into(),
            category: MedicineCategory::Syrup,
            price: Decimal::ZERO,
            expiry_date: today() + Duration::days(10),
            low_stock_alert: 0,
        };
        let err = service.update(&pool, bob, med.id, changes, today()).await.unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));

        let detail = service.get_detail(&pool, alice, med.id, today()).await.unwrap();
        assert_eq!(detail.medicine.medicine.name, "Paracetamol");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn delete_cascades_history(pool: PgPool) {
        let user = create_user(&pool, "carol").await;
        let service = medicine_service(&pool);
        let med = service.create(&pool, user, paracetamol(), today()).await.unwrap();

        crate::services::test_support::ledger_service(&pool)
            .receive_stock(&pool, user, med.id, crate::models::ledger::StockReceipt { quantity: 5, note: None })
            .await
            .unwrap();

        service.delete(&pool, user, med.id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE medicine_id = $1")
            .bind(med.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        let err = service.get_detail(&pool, user, med.id, today()).await.unwrap_err();
        assert!(matches!(err, AppError::MedicineNotFound));
    }
}
