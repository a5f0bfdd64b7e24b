// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    common::money::normalize_currency,
    db::{
        AccountRepository, ContactRepository, DebtRepository, LedgerRepository, PaymentRepository,
    },
    services::{
        auth::AuthService, contact_service::ContactService, debt_service::DebtService,
        identity_bridge::IdentityBridge, payment_service::PaymentService,
    },
};

// Variáveis de ambiente lidas na inicialização
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub default_currency: String,
    pub token_ttl_days: i64,
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} inválida: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let default_currency = env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "PHP".to_string());
        let default_currency = normalize_currency(&default_currency)
            .map_err(|_| anyhow::anyhow!("DEFAULT_CURRENCY não suportada: {}", default_currency))?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            default_currency,
            token_ttl_days: var_or("TOKEN_TTL_DAYS", 7)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub contact_service: ContactService,
    pub debt_service: DebtService,
    pub payment_service: PaymentService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        // --- Monta o gráfico de dependências ---
        let accounts = Arc::new(AccountRepository::new(db_pool.clone()));
        let contacts = Arc::new(ContactRepository::new(db_pool.clone()));
        let debts = Arc::new(DebtRepository::new(db_pool.clone()));
        let payments = Arc::new(PaymentRepository::new(db_pool.clone()));
        let ledger = Arc::new(LedgerRepository::new(db_pool.clone()));

        let bridge = IdentityBridge::new(accounts.clone(), contacts.clone());
        let debt_service = DebtService::new(
            debts,
            payments.clone(),
            contacts.clone(),
            bridge.clone(),
            ledger,
            config.default_currency.clone(),
        );
        let payment_service = PaymentService::new(payments, debt_service.clone());
        let contact_service = ContactService::new(contacts, accounts.clone(), bridge.clone());
        let auth_service = AuthService::new(
            accounts,
            bridge,
            config.jwt_secret.clone(),
            config.token_ttl_days,
        );

        Ok(Self {
            db_pool,
            config,
            auth_service,
            contact_service,
            debt_service,
            payment_service,
        })
    }
}
