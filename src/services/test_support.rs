// Helpers dos testes de banco (#[sqlx::test])

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{DashboardRepository, ExpiryRepository, LedgerRepository, MedicineRepository, UserRepository},
    services::{
        alert_service::AlertService, expiry_service::ExpiryService, ledger_service::LedgerService,
        medicine_service::MedicineService,
    },
};

pub(crate) fn today() -> NaiveDate {
    crate::common::db_utils::today()
}

pub(crate) async fn create_user(pool: &PgPool, username: &str) -> Uuid {
    UserRepository::new(pool.clone())
        .create_user(username, &format!("{username}@example.com"), "not-a-real-hash")
        .await
        .expect("falha ao criar usuário de teste")
        .id
}

pub(crate) fn ledger_service(pool: &PgPool) -> LedgerService {
    LedgerService::new(MedicineRepository::new(pool.clone()), LedgerRepository::new(pool.clone()))
}

pub(crate) fn medicine_service(pool: &PgPool) -> MedicineService {
    MedicineService::new(MedicineRepository::new(pool.clone()), LedgerRepository::new(pool.clone()))
}

pub(crate) fn expiry_service(pool: &PgPool) -> ExpiryService {
    ExpiryService::new(ExpiryRepository::new(pool.clone()))
}

pub(crate) fn alert_service(pool: &PgPool) -> AlertService {
    AlertService::new(MedicineRepository::new(pool.clone()), DashboardRepository::new(pool.clone()))
}
