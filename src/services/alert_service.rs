// src/services/alert_service.rs

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, MedicineRepository},
    models::{dashboard::DashboardSummary, medicine::Medicine},
};

/// Maior janela aceita em `/api/alerts?days=`.
pub const MAX_ALERT_WINDOW_DAYS: i64 = 365;

#[derive(Clone)]
pub struct AlertService {
    medicine_repo: MedicineRepository,
    dashboard_repo: DashboardRepository,
}

impl AlertService {
    pub fn new(medicine_repo: MedicineRepository, dashboard_repo: DashboardRepository) -> Self {
        Self { medicine_repo, dashboard_repo }
    }

    /// Medicamentos que vencem de hoje até `today + days` (inclusive).
    pub async fn expiring_within(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        days: i64,
    ) -> Result<Vec<Medicine>, AppError> {
        let until = alert_window(today, days)?;
        self.medicine_repo.expiring_between(user_id, today, until).await
    }

    pub async fn low_stock(&self, user_id: Uuid) -> Result<Vec<Medicine>, AppError> {
        self.medicine_repo.low_stock(user_id).await
    }

    pub async fn dashboard_summary(&self, user_id: Uuid, today: NaiveDate) -> Result<DashboardSummary, AppError> {
        self.dashboard_repo.summary(user_id, today).await
    }
}

fn alert_window(today: NaiveDate, days: i64) -> Result<NaiveDate, AppError> {
    if !(0..=MAX_ALERT_WINDOW_DAYS).contains(&days) {
        return Err(AppError::field("days", "range", "Days must be between 0 and 365."));
    }
    Ok(today + Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_bounded() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(alert_window(today, 0).unwrap(), today);
        assert_eq!(alert_window(today, 30).unwrap(), NaiveDate::from_ymd_opt(2026, 11, 18).unwrap());
        assert!(alert_window(today, -1).is_err());
        assert!(alert_window(today, 366).is_err());
    }
}

#[cfg(test)]
mod db_tests {
    use crate::{
        db::medicine_repo::insert_raw,
        models::{
            ledger::{SaleRequest, StockReceipt},
            medicine::EXPIRING_SOON_DAYS,
        },
        services::test_support::{alert_service, create_user, expiry_service, ledger_service, today},
    };
    use chrono::Duration;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn empty_account_summary_is_all_zeros(pool: PgPool) {
        let user = create_user(&pool, "erin").await;
        let summary = alert_service(&pool).dashboard_summary(user, today()).await.unwrap();

        assert_eq!(summary.total_medicines, 0);
        assert_eq!(summary.expired_count, 0);
        assert_eq!(summary.total_quantity, 0);
        assert_eq!(summary.total_stock_value, Decimal::ZERO);
        assert_eq!(summary.today_sales, Decimal::ZERO);
        assert_eq!(summary.expired_value, Decimal::ZERO);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn alerts_and_summary_reflect_stock(pool: PgPool) {
        let user = create_user(&pool, "frank").await;
        let alerts = alert_service(&pool);

        let soon = insert_raw(&pool, user, "Cough Syrup", 40, Decimal::new(500, 2), today() + Duration::days(3), 10)
            .await
            .unwrap();
        let low = insert_raw(&pool, user, "Insulin", 2, Decimal::new(2000, 2), today() + Duration::days(90), 5)
            .await
            .unwrap();
        insert_raw(&pool, user, "Amoxicillin", 5, Decimal::new(300, 2), today() - Duration::days(1), 1)
            .await
            .unwrap();

        let expiring = alerts.expiring_within(user, today(), EXPIRING_SOON_DAYS).await.unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, soon.id);

        let low_stock = alerts.low_stock(user).await.unwrap();
        assert_eq!(low_stock.len(), 1);
        assert_eq!(low_stock[0].id, low.id);

        ledger_service(&pool)
            .record_sale(
                &pool,
                user,
                soon.id,
                SaleRequest { quantity: 4, sale_price: None, customer_name: None, note: None },
                today(),
            )
            .await
            .unwrap();
        expiry_service(&pool).sweep(&pool, user, today()).await.unwrap();

        let summary = alerts.dashboard_summary(user, today()).await.unwrap();
        assert_eq!(summary.total_medicines, 3);
        assert_eq!(summary.expired_count, 1);
        assert_eq!(summary.expired_value, Decimal::new(1500, 2));
        assert_eq!(summary.today_sales, Decimal::new(2000, 2));
        // 36 × 5.00 + 2 × 20.00; o lote vencido já não conta
        assert_eq!(summary.total_stock_value, Decimal::new(22000, 2));
        assert_eq!(summary.expiring_week_count, 1);
        assert_eq!(summary.low_stock_count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn restocking_clears_the_low_stock_alert(pool: PgPool) {
        let user = create_user(&pool, "gina").await;
        let alerts = alert_service(&pool);

        let med = insert_raw(&pool, user, "Salbutamol", 3, Decimal::new(1200, 2), today() + Duration::days(120), 10)
            .await
            .unwrap();

        let low = alerts.low_stock(user).await.unwrap();
        assert!(low.iter().any(|m| m.id == med.id));

        let change = ledger_service(&pool)
            .receive_stock(&pool, user, med.id, StockReceipt { quantity: 20, note: None })
            .await
            .unwrap();
        assert_eq!(change.medicine.quantity, 23);

        let low = alerts.low_stock(user).await.unwrap();
        assert!(low.iter().all(|m| m.id != med.id));
        assert_eq!(alerts.dashboard_summary(user, today()).await.unwrap().low_stock_count, 0);
    }
}
