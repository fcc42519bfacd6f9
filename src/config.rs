// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{DashboardRepository, ExpiryRepository, LedgerRepository, MedicineRepository, UserRepository},
    services::{
        alert_service::AlertService, auth::AuthService, expiry_service::ExpiryService,
        ledger_service::LedgerService, medicine_service::MedicineService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_TTL_DAYS: i64 = 7;

// Configuração lida do ambiente (.env é carregado antes, se existir)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub jwt_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave → valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let jwt_ttl_days = match lookup("JWT_TTL_DAYS") {
            Some(raw) => raw.parse().with_context(|| format!("JWT_TTL_DAYS inválido: {raw}"))?,
            None => DEFAULT_JWT_TTL_DAYS,
        };

        Ok(Self { database_url, jwt_secret, bind_addr, max_connections, jwt_ttl_days })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub medicine_service: MedicineService,
    pub ledger_service: LedgerService,
    pub expiry_service: ExpiryService,
    pub alert_service: AlertService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Monta o grafo de dependências ---
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let medicine_repo = MedicineRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let expiry_repo = ExpiryRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), config.jwt_ttl_days);
        let medicine_service = MedicineService::new(medicine_repo.clone(), ledger_repo.clone());
        let ledger_service = LedgerService::new(medicine_repo.clone(), ledger_repo);
        let expiry_service = ExpiryService::new(expiry_repo);
        let alert_service = AlertService::new(medicine_repo, dashboard_repo);

        Self {
            db_pool,
            config,
            i18n_store: I18nStore::new(),
            auth_service,
            medicine_service,
            ledger_service,
            expiry_service,
            alert_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/pharmacy"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.jwt_ttl_days, 7);
    }

    #[test]
    fn required_vars_are_enforced() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "segredo")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("JWT_TTL_DAYS", "1"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.jwt_ttl_days, 1);

        assert!(Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("DATABASE_MAX_CONNECTIONS", "muitas"),
        ]))
        .is_err());
    }
}
