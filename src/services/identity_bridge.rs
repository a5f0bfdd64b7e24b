// src/services/identity_bridge.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountStore, ContactStore},
    models::{
        auth::Account,
        contact::{AccountContact, Contact},
        debt::{ContactRef, DebtRecord, DebtView, Perspective},
    },
};

/// Liga contatos a contas registradas e projeta a dívida para cada lado.
/// A dívida existe uma única vez; a contraparte a enxerga invertida na leitura.
#[derive(Clone)]
pub struct IdentityBridge {
    accounts: Arc<dyn AccountStore>,
    contacts: Arc<dyn ContactStore>,
}

impl IdentityBridge {
    pub fn new(accounts: Arc<dyn AccountStore>, contacts: Arc<dyn ContactStore>) -> Self {
        Self { accounts, contacts }
    }

    /// A conta por trás do contato, se houver.
    pub fn is_counterparty_account_holder(contact: &Contact) -> Option<Uuid> {
        if contact.is_account_holder { contact.account_id } else { None }
    }

    /// A conta `owner` adicionou um contato cujo e-mail é da conta `counterparty`:
    /// marca o contato e garante o caminho de volta (counterparty -> owner).
    pub async fn bind_reciprocal_contact(
        &self,
        owner: &Account,
        contact: &Contact,
        counterparty: &Account,
    ) -> Result<Contact, AppError> {
        let bound = self.bind_contact(contact, counterparty.id).await?;

        if self.ensure_reciprocal(owner, counterparty).await? {
            tracing::info!(
                "🔗 Contato recíproco criado: {} agora vê {}",
                counterparty.id,
                owner.id
            );
        }
        Ok(bound)
    }

    /// Nova conta com e-mail que outras contas já tinham como contato:
    /// vincula o contato existente e cria os caminhos de volta.
    /// Retorna quantos relacionamentos recíprocos foram criados.
    pub async fn retrofit_on_registration(&self, new_account: &Account) -> Result<usize, AppError> {
        let Some(contact) = self.contacts.find_contact_by_email(&new_account.email).await? else {
            return Ok(0);
        };
        let contact = self.bind_contact(&contact, new_account.id).await?;

        let mut created = 0;
        for rel in self.contacts.list_relationships_for_contact(contact.id).await? {
            if rel.account_id == new_account.id {
                continue;
            }
            let Some(owner) = self.accounts.find_account_by_id(rel.account_id).await? else {
                continue;
            };
            if self.ensure_reciprocal(&owner, new_account).await? {
                created += 1;
            }
        }

        if created > 0 {
            tracing::info!(
                "🔗 Conta {} vinculada retroativamente a {} contato(s).",
                new_account.id,
                created
            );
        }
        Ok(created)
    }

    async fn bind_contact(&self, contact: &Contact, account_id: Uuid) -> Result<Contact, AppError> {
        if contact.is_bound_to(account_id) {
            return Ok(contact.clone());
        }
        self.contacts.update_contact(&contact.bound_to(account_id)).await
    }

    // Identidade de contato da própria conta (criada sob demanda)
    async fn identity_contact_of(&self, account: &Account) -> Result<Contact, AppError> {
        match self.contacts.find_contact_by_email(&account.email).await? {
            Some(contact) => self.bind_contact(&contact, account.id).await,
            None => {
                let contact = Contact::new(Some(account.email.clone()), None).bound_to(account.id);
                match self.contacts.create_contact(&contact).await {
                    Ok(created) => Ok(created),
                    // Outra requisição criou no meio do caminho
                    Err(AppError::ContactAlreadyExists) => self
                        .contacts
                        .find_contact_by_email(&account.email)
                        .await?
                        .ok_or(AppError::ContactNotFound),
                    Err(e) => Err(e),
                }
            }
        }
    }

    // true se o relacionamento counterparty -> owner precisou ser criado
    async fn ensure_reciprocal(&self, owner: &Account, counterparty: &Account) -> Result<bool, AppError> {
        let owner_contact = self.identity_contact_of(owner).await?;

        if self
            .contacts
            .get_relationship(counterparty.id, owner_contact.id)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let rel = AccountContact::new(
            counterparty.id,
            owner_contact.id,
            &owner.display_name,
            Some(owner.email.clone()),
            None,
            None,
        );
        match self.contacts.create_relationship(&rel).await {
            Ok(_) => Ok(true),
            Err(AppError::ContactAlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // --- Projeções de leitura ---

    pub async fn view_for_owner(&self, debt: &DebtRecord) -> Result<DebtView, AppError> {
        let contact = self
            .contacts
            .get_contact(debt.counterparty_contact_id)
            .await?
            .ok_or(AppError::ContactNotFound)?;
        let rel = self
            .contacts
            .get_relationship(debt.owner_id, contact.id)
            .await?;

        // O relacionamento pode ter sido removido; a dívida continua
        let display_name = rel
            .as_ref()
            .map(|r| r.display_name.clone())
            .or_else(|| contact.email.clone())
            .unwrap_or_default();

        let contact_ref = ContactRef {
            contact_id: Some(contact.id),
            account_id: Self::is_counterparty_account_holder(&contact),
            display_name,
            email: rel.and_then(|r| r.email).or(contact.email.clone()),
            is_account_holder: contact.is_account_holder,
        };
        Ok(DebtView::project(debt, Perspective::Owner, contact_ref))
    }

    /// Mesma dívida, direção invertida, e o "contato" passa a ser quem a criou.
    pub async fn view_for_counterparty(
        &self,
        debt: &DebtRecord,
        viewer_id: Uuid,
    ) -> Result<DebtView, AppError> {
        let creator = self
            .accounts
            .find_account_by_id(debt.owner_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Se o leitor tem o criador na agenda, usa o nome que ele deu
        let creator_contact = self.contacts.find_contact_by_email(&creator.email).await?;
        let rel = match &creator_contact {
            Some(c) => self.contacts.get_relationship(viewer_id, c.id).await?,
            None => None,
        };

        let contact_ref = ContactRef {
            contact_id: creator_contact.map(|c| c.id),
            account_id: Some(creator.id),
            display_name: rel
                .map(|r| r.display_name)
                .unwrap_or_else(|| creator.display_name.clone()),
            email: Some(creator.email),
            is_account_holder: true,
        };
        Ok(DebtView::project(debt, Perspective::Counterparty, contact_ref))
    }

    /// Dono -> visão do dono; contraparte registrada -> visão invertida;
    /// qualquer outro -> não encontrada.
    pub async fn view_for(&self, debt: &DebtRecord, viewer_id: Uuid) -> Result<DebtView, AppError> {
        match self.perspective_of(debt, viewer_id).await? {
            Some(Perspective::Owner) => self.view_for_owner(debt).await,
            Some(Perspective::Counterparty) => self.view_for_counterparty(debt, viewer_id).await,
            None => Err(AppError::DebtRecordNotFound),
        }
    }

    pub async fn perspective_of(
        &self,
        debt: &DebtRecord,
        viewer_id: Uuid,
    ) -> Result<Option<Perspective>, AppError> {
        if debt.owner_id == viewer_id {
            return Ok(Some(Perspective::Owner));
        }
        let contact = self.contacts.get_contact(debt.counterparty_contact_id).await?;
        let holder = contact.as_ref().and_then(Self::is_counterparty_account_holder);

        Ok((holder == Some(viewer_id)).then_some(Perspective::Counterparty))
    }
}
