// src/services/test_support.rs

// Dados de apoio para os testes dos serviços (sobre o MemoryStore)

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{AccountStore, ContactStore, DebtStore, MemoryStore},
    models::{
        auth::Account,
        contact::{AccountContact, Contact, CreateContactRequest},
        debt::{Cadence, CreateDebtRequest, DebtRecord, DebtStatus, DebtView, Direction},
    },
    services::{
        auth::AuthService, contact_service::ContactService, debt_service::DebtService,
        identity_bridge::IdentityBridge, payment_service::PaymentService,
        schedule,
    },
};

pub struct Services {
    pub auth: AuthService,
    pub contacts: ContactService,
    pub debts: DebtService,
    pub payments: PaymentService,
}

pub fn services(store: &MemoryStore) -> Services {
    let shared = Arc::new(store.clone());
    let bridge = IdentityBridge::new(shared.clone(), shared.clone());
    let debts = DebtService::new(
        shared.clone(),
        shared.clone(),
        shared.clone(),
        bridge.clone(),
        shared.clone(),
        "PHP".to_string(),
    );

    Services {
        // Custo mínimo do bcrypt para os testes não demorarem
        auth: AuthService::new(shared.clone(), bridge.clone(), "segredo-de-teste".into(), 7)
            .with_bcrypt_cost(4),
        contacts: ContactService::new(shared.clone(), shared.clone(), bridge),
        payments: PaymentService::new(shared, debts.clone()),
        debts,
    }
}

pub async fn seed_account(store: &MemoryStore, email: &str, name: &str) -> Account {
    let now = Utc::now();
    let account = Account {
        id: Uuid::new_v4(),
        email: email.to_string(),
        display_name: name.to_string(),
        password_hash: "hash".to_string(),
        created_at: now,
        updated_at: now,
    };
    store.create_account(&account).await.unwrap()
}

/// Contato na agenda de `owner`, sem vínculo com conta.
pub async fn seed_contact(store: &MemoryStore, owner: &Account, email: &str, name: &str) -> Contact {
    let contact = match store.find_contact_by_email(email).await.unwrap() {
        Some(existing) => existing,
        None => store
            .create_contact(&Contact::new(Some(email.to_string()), None))
            .await
            .unwrap(),
    };
    store
        .create_relationship(&AccountContact::new(
            owner.id,
            contact.id,
            name,
            Some(email.to_string()),
            None,
            None,
        ))
        .await
        .unwrap();
    contact
}

/// 1200.00 em 3 parcelas mensais, gravada direto no store.
pub async fn seed_debt(
    store: &MemoryStore,
    owner: &Account,
    contact: &Contact,
    direction: Direction,
) -> DebtRecord {
    let now = Utc::now();
    let total = dec!(1200.00);
    let debt = DebtRecord {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        counterparty_contact_id: contact.id,
        direction,
        total_amount: total,
        currency: "PHP".to_string(),
        cadence: Cadence::Monthly,
        installment_amount: schedule::installment_amount(total, 3),
        due_date: schedule::due_date_from_installments(now, 3, Cadence::Monthly),
        installment_count: Some(3),
        amount_paid: Decimal::ZERO,
        amount_remaining: total,
        status: DebtStatus::Active,
        next_due_date: schedule::advance(now, Cadence::Monthly, 1),
        description: None,
        notes: None,
        created_at: now,
        updated_at: now,
    };
    store.create_debt(&debt).await.unwrap()
}

/// Ana (dona) e Bruno (contraparte registrada) com uma dívida de 1200 em 3x.
pub async fn linked_debt(store: &MemoryStore, svc: &Services) -> (Account, Account, DebtView) {
    let ana = seed_account(store, "ana@exemplo.com", "Ana").await;
    let bruno = seed_account(store, "bruno@exemplo.com", "Bruno").await;

    let contact = svc
        .contacts
        .create_contact(&ana, CreateContactRequest {
            name: "Bruno".into(),
            email: Some(bruno.email.clone()),
            phone: None,
            notes: None,
        })
        .await
        .unwrap();

    let debt = svc
        .debts
        .create(ana.id, CreateDebtRequest {
            counterparty_contact_id: contact.contact_id,
            direction: Direction::OwedToOwner,
            total_amount: "1200.00".into(),
            currency: None,
            cadence: Some(Cadence::Monthly),
            due_date: None,
            installment_count: Some(3),
            description: None,
            notes: None,
        })
        .await
        .unwrap();

    (ana, bruno, debt)
}
