// src/db/contact_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::ContactStore,
    models::contact::{AccountContact, Contact},
};

#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Violação de UNIQUE vira "contato já existe"
fn map_unique(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::ContactAlreadyExists;
        }
    }
    e.into()
}

#[async_trait]
impl ContactStore for ContactRepository {
    // =========================================================================
    //  IDENTIDADE (tabela 'contacts')
    // =========================================================================

    async fn create_contact(&self, contact: &Contact) -> Result<Contact, AppError> {
        let created = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, email, phone, is_account_holder, account_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(contact.id)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(contact.is_account_holder)
            .bind(contact.account_id)
            .bind(contact.created_at)
            .bind(contact.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;

        Ok(created)
    }

    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, AppError> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, AppError> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn update_contact(&self, contact: &Contact) -> Result<Contact, AppError> {
        let updated = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET email = $2, phone = $3, is_account_holder = $4, account_id = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(contact.id)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(contact.is_account_holder)
            .bind(contact.account_id)
            .bind(contact.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ContactNotFound)?;

        Ok(updated)
    }

    // =========================================================================
    //  RELACIONAMENTOS (tabela 'account_contacts')
    // =========================================================================

    async fn create_relationship(&self, rel: &AccountContact) -> Result<AccountContact, AppError> {
        let created = sqlx::query_as::<_, AccountContact>(
            r#"
            INSERT INTO account_contacts
                (id, account_id, contact_id, display_name, email, phone, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
            .bind(rel.id)
            .bind(rel.account_id)
            .bind(rel.contact_id)
            .bind(&rel.display_name)
            .bind(&rel.email)
            .bind(&rel.phone)
            .bind(&rel.notes)
            .bind(rel.created_at)
            .bind(rel.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;

        Ok(created)
    }

    async fn get_relationship(
        &self,
        account_id: Uuid,
        contact_id: Uuid,
    ) -> Result<Option<AccountContact>, AppError> {
        let rel = sqlx::query_as::<_, AccountContact>(
            "SELECT * FROM account_contacts WHERE account_id = $1 AND contact_id = $2",
        )
            .bind(account_id)
            .bind(contact_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rel)
    }

    async fn list_relationships_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<AccountContact>, AppError> {
        let rels = sqlx::query_as::<_, AccountContact>(
            "SELECT * FROM account_contacts WHERE account_id = $1 ORDER BY display_name ASC",
        )
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rels)
    }

    async fn list_relationships_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<AccountContact>, AppError> {
        let rels = sqlx::query_as::<_, AccountContact>(
            "SELECT * FROM account_contacts WHERE contact_id = $1 ORDER BY created_at ASC",
        )
            .bind(contact_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rels)
    }

    async fn update_relationship(&self, rel: &AccountContact) -> Result<AccountContact, AppError> {
        let updated = sqlx::query_as::<_, AccountContact>(
            r#"
            UPDATE account_contacts
            SET display_name = $3, email = $4, phone = $5, notes = $6, updated_at = $7
            WHERE account_id = $1 AND contact_id = $2
            RETURNING *
            "#,
        )
            .bind(rel.account_id)
            .bind(rel.contact_id)
            .bind(&rel.display_name)
            .bind(&rel.email)
            .bind(&rel.phone)
            .bind(&rel.notes)
            .bind(rel.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ContactNotFound)?;

        Ok(updated)
    }

    async fn delete_relationship(&self, account_id: Uuid, contact_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM account_contacts WHERE account_id = $1 AND contact_id = $2")
            .bind(account_id)
            .bind(contact_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
