// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, money::normalize_email},
    db::AccountStore,
    models::auth::{Account, Claims, LoginUserPayload, RegisterUserPayload},
    services::identity_bridge::IdentityBridge,
};

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    bridge: IdentityBridge,
    jwt_secret: String,
    token_ttl_days: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        bridge: IdentityBridge,
        jwt_secret: String,
        token_ttl_days: i64,
    ) -> Self {
        Self {
            accounts,
            bridge,
            jwt_secret,
            token_ttl_days,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    #[cfg(test)]
    pub fn with_bcrypt_cost(self, bcrypt_cost: u32) -> Self {
        Self { bcrypt_cost, ..self }
    }

    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        payload.validate()?;
        let email = normalize_email(&payload.email);

        // 1. Hashing fora da thread do runtime
        let password = payload.password;
        let cost = self.bcrypt_cost;
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Cria a conta
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email,
            display_name: payload.display_name.trim().to_string(),
            password_hash: hashed_password,
            created_at: now,
            updated_at: now,
        };
        let account = self.accounts.create_account(&account).await?;
        tracing::info!("🙋 Conta {} registrada", account.id);

        // 3. Contatos criados antes do registro passam a apontar para a conta.
        //    Falhar aqui não desfaz o registro.
        if let Err(e) = self.bridge.retrofit_on_registration(&account).await {
            tracing::warn!("⚠️ Falha ao vincular contatos da conta {}: {}", account.id, e);
        }

        self.create_token(account.id)
    }

    pub async fn login_user(&self, payload: LoginUserPayload) -> Result<String, AppError> {
        payload.validate()?;

        let account = self
            .accounts
            .find_account_by_email(&normalize_email(&payload.email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = payload.password;
        let password_hash = account.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(account.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Account, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.accounts
            .find_account_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, account_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.token_ttl_days);

        let claims = Claims {
            sub: account_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
