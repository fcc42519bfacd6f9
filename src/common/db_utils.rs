// src/common/db_utils.rs

use chrono::{NaiveDate, Utc};

/// Nome da constraint violada, se o erro for de UNIQUE.
pub(crate) fn unique_violation_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

/// "Hoje" em UTC. Os serviços recebem a data como parâmetro; só a borda chama isto.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
