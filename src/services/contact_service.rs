// src/services/contact_service.rs

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, money::normalize_email},
    db::{AccountStore, ContactStore},
    models::{
        auth::Account,
        contact::{AccountContact, Contact, ContactView, CreateContactRequest, UpdateContactRequest},
    },
    services::identity_bridge::IdentityBridge,
};

// "" vira None
fn clean_email(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_email).filter(|e| !e.is_empty())
}

#[derive(Clone)]
pub struct ContactService {
    contacts: Arc<dyn ContactStore>,
    accounts: Arc<dyn AccountStore>,
    bridge: IdentityBridge,
}

impl ContactService {
    pub fn new(
        contacts: Arc<dyn ContactStore>,
        accounts: Arc<dyn AccountStore>,
        bridge: IdentityBridge,
    ) -> Self {
        Self { contacts, accounts, bridge }
    }

    pub async fn create_contact(
        &self,
        owner: &Account,
        req: CreateContactRequest,
    ) -> Result<ContactView, AppError> {
        req.validate()?;
        let email = clean_email(req.email.as_deref());

        if email.as_deref() == Some(owner.email.as_str()) {
            return Err(AppError::SelfContact);
        }

        // Uma identidade por e-mail, compartilhada entre as contas
        let contact = match &email {
            Some(email) => self.shared_identity(email, req.phone.clone()).await?,
            None => {
                self.contacts
                    .create_contact(&Contact::new(None, req.phone.clone()))
                    .await?
            }
        };

        if self.contacts.get_relationship(owner.id, contact.id).await?.is_some() {
            return Err(AppError::ContactAlreadyExists);
        }

        let rel = AccountContact::new(
            owner.id,
            contact.id,
            req.name.trim(),
            email.clone(),
            req.phone,
            req.notes,
        );
        let rel = self.contacts.create_relationship(&rel).await?;

        // E-mail de conta registrada: liga os dois lados
        let contact = match &email {
            Some(email) => match self.accounts.find_account_by_email(email).await? {
                Some(counterparty) => {
                    self.bridge
                        .bind_reciprocal_contact(owner, &contact, &counterparty)
                        .await?
                }
                None => contact,
            },
            None => contact,
        };

        tracing::info!("👤 Contato {} adicionado por {}", contact.id, owner.id);
        Ok(ContactView::new(&rel, &contact))
    }

    async fn shared_identity(&self, email: &str, phone: Option<String>) -> Result<Contact, AppError> {
        if let Some(existing) = self.contacts.find_contact_by_email(email).await? {
            return Ok(existing);
        }
        match self
            .contacts
            .create_contact(&Contact::new(Some(email.to_string()), phone))
            .await
        {
            Ok(contact) => Ok(contact),
            Err(AppError::ContactAlreadyExists) => self
                .contacts
                .find_contact_by_email(email)
                .await?
                .ok_or(AppError::ContactNotFound),
            Err(e) => Err(e),
        }
    }

    async fn relationship(&self, owner_id: Uuid, contact_id: Uuid) -> Result<AccountContact, AppError> {
        self.contacts
            .get_relationship(owner_id, contact_id)
            .await?
            .ok_or(AppError::ContactNotFound)
    }

    async fn view(&self, rel: &AccountContact) -> Result<ContactView, AppError> {
        let contact = self
            .contacts
            .get_contact(rel.contact_id)
            .await?
            .ok_or(AppError::ContactNotFound)?;
        Ok(ContactView::new(rel, &contact))
    }

    pub async fn get_contact(&self, owner_id: Uuid, contact_id: Uuid) -> Result<ContactView, AppError> {
        let rel = self.relationship(owner_id, contact_id).await?;
        self.view(&rel).await
    }

    pub async fn list_contacts(&self, owner_id: Uuid) -> Result<Vec<ContactView>, AppError> {
        let mut views = Vec::new();
        for rel in self.contacts.list_relationships_for_account(owner_id).await? {
            views.push(self.view(&rel).await?);
        }
        Ok(views)
    }

    /// Edita só o relacionamento; a identidade nunca é revinculada aqui.
    pub async fn update_contact(
        &self,
        owner_id: Uuid,
        contact_id: Uuid,
        req: UpdateContactRequest,
    ) -> Result<ContactView, AppError> {
        req.validate()?;
        let rel = self.relationship(owner_id, contact_id).await?;

        let edited = AccountContact {
            display_name: req
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| rel.display_name.clone()),
            email: clean_email(req.email.as_deref()).or_else(|| rel.email.clone()),
            phone: req.phone.or_else(|| rel.phone.clone()),
            notes: req.notes.or_else(|| rel.notes.clone()),
            updated_at: Utc::now(),
            ..rel
        };
        let rel = self.contacts.update_relationship(&edited).await?;
        self.view(&rel).await
    }

    /// Remove o contato da agenda; identidade e dívidas continuam.
    pub async fn delete_contact(&self, owner_id: Uuid, contact_id: Uuid) -> Result<(), AppError> {
        if !self.contacts.delete_relationship(owner_id, contact_id).await? {
            return Err(AppError::ContactNotFound);
        }
        tracing::info!("👤 Contato {} removido da agenda de {}", contact_id, owner_id);
        Ok(())
    }
}
