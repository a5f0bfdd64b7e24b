// src/services/debt_service.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        money::{normalize_currency, parse_amount},
    },
    db::{ContactStore, DebtStore, DebtTransaction, LedgerStore, PaymentStore},
    models::{
        debt::{
            Cadence, CreateDebtRequest, DebtRecord, DebtStatus, DebtView, Perspective,
            UpcomingPayment, UpdateDebtRequest,
        },
        payment::{PaymentRecord, PaymentSummary},
        schedule::ScheduleLine,
    },
    services::{
        identity_bridge::IdentityBridge,
        schedule::{self, MAX_INSTALLMENTS},
    },
};

// Campos derivados pela calculadora
#[derive(Debug, Clone, Copy, PartialEq)]
struct Terms {
    due_date: DateTime<Utc>,
    installment_count: Option<i32>,
    installment_amount: Decimal,
}

fn check_installment_count(count: Option<i32>) -> Result<Option<u32>, AppError> {
    match count {
        None => Ok(None),
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|n| (1..=MAX_INSTALLMENTS).contains(n))
            .map(Some)
            .ok_or(AppError::InvalidInstallmentCount),
    }
}

/// Contagem explícita manda; sem ela, o vencimento; sem os dois, uma parcela
/// um período à frente. Parcela única sempre exige o vencimento.
fn derive_terms(
    created_at: DateTime<Utc>,
    cadence: Cadence,
    total: Decimal,
    due_date: Option<DateTime<Utc>>,
    count: Option<u32>,
) -> Result<Terms, AppError> {
    if cadence == Cadence::OneTime {
        if count.is_some_and(|n| n > 1) {
            return Err(AppError::MissingCadence);
        }
        return Ok(Terms {
            due_date: due_date.ok_or(AppError::InvalidDueDate)?,
            installment_count: Some(1),
            installment_amount: total,
        });
    }

    let terms = match (count, due_date) {
        (Some(n), _) => Terms {
            due_date: schedule::due_date_from_installments(created_at, n, cadence),
            installment_count: Some(n as i32),
            installment_amount: schedule::installment_amount(total, n),
        },
        (None, Some(due)) => {
            let n = schedule::installments_from_due_date(created_at, due, cadence);
            if n > MAX_INSTALLMENTS {
                return Err(AppError::InvalidInstallmentCount);
            }
            Terms {
                due_date: due,
                installment_count: None,
                installment_amount: schedule::installment_amount(total, n),
            }
        }
        (None, None) => Terms {
            due_date: schedule::advance(created_at, cadence, 1),
            installment_count: None,
            installment_amount: total,
        },
    };
    Ok(terms)
}

/// Totais, status e próximo vencimento a partir dos pagamentos concluídos.
fn rolled_up(debt: &DebtRecord, payments: &[PaymentRecord], now: DateTime<Utc>) -> DebtRecord {
    let completed = payments.iter().filter(|p| p.counts_towards_total());

    let amount_paid: Decimal = completed.clone().map(|p| p.amount).sum();
    let last_payment = completed.map(|p| p.payment_date).max();

    let next_due = schedule::next_due_date(debt, last_payment);
    debt.with_rollup(amount_paid, next_due, now)
}

#[derive(Clone)]
pub struct DebtService {
    debts: Arc<dyn DebtStore>,
    payments: Arc<dyn PaymentStore>,
    contacts: Arc<dyn ContactStore>,
    bridge: IdentityBridge,
    ledger: Arc<dyn LedgerStore>,
    default_currency: String,
}

impl DebtService {
    pub fn new(
        debts: Arc<dyn DebtStore>,
        payments: Arc<dyn PaymentStore>,
        contacts: Arc<dyn ContactStore>,
        bridge: IdentityBridge,
        ledger: Arc<dyn LedgerStore>,
        default_currency: String,
    ) -> Self {
        Self { debts, payments, contacts, bridge, ledger, default_currency }
    }

    /// Abre a transação de escrita; quem chama trava a dívida antes de mexer nela.
    pub(crate) async fn begin(&self) -> Result<Box<dyn DebtTransaction>, AppError> {
        self.ledger.begin().await
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create(&self, owner_id: Uuid, req: CreateDebtRequest) -> Result<DebtView, AppError> {
        req.validate()?;

        let total = parse_amount(&req.total_amount)?;
        let currency = normalize_currency(req.currency.as_deref().unwrap_or(&self.default_currency))?;
        let count = check_installment_count(req.installment_count)?;

        if req.cadence.is_none() && count.is_some_and(|n| n > 1) {
            return Err(AppError::MissingCadence);
        }
        let cadence = req.cadence.unwrap_or(Cadence::OneTime);

        // O contato precisa estar na agenda do dono
        self.contacts
            .get_relationship(owner_id, req.counterparty_contact_id)
            .await?
            .ok_or(AppError::ContactNotFound)?;
        self.contacts
            .get_contact(req.counterparty_contact_id)
            .await?
            .ok_or(AppError::ContactNotFound)?;

        let now = Utc::now();
        let terms = derive_terms(now, cadence, total, req.due_date, count)?;
        if terms.due_date <= now {
            return Err(AppError::InvalidDueDate);
        }

        let draft = DebtRecord {
            id: Uuid::new_v4(),
            owner_id,
            counterparty_contact_id: req.counterparty_contact_id,
            direction: req.direction,
            total_amount: total,
            currency,
            cadence,
            installment_amount: terms.installment_amount,
            due_date: terms.due_date,
            installment_count: terms.installment_count,
            amount_paid: Decimal::ZERO,
            amount_remaining: total,
            status: DebtStatus::Active,
            next_due_date: terms.due_date,
            description: req.description,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        let debt = DebtRecord {
            next_due_date: schedule::next_due_date(&draft, None),
            ..draft
        };

        let debt = self.debts.create_debt(&debt).await?;
        tracing::info!(
            "💸 Dívida {} criada por {} ({} {}, {:?})",
            debt.id,
            owner_id,
            debt.total_amount,
            debt.currency,
            debt.cadence
        );

        self.bridge.view_for_owner(&debt).await
    }

    pub async fn update(
        &self,
        debt_id: Uuid,
        owner_id: Uuid,
        patch: UpdateDebtRequest,
    ) -> Result<DebtView, AppError> {
        patch.validate()?;

        let total = patch.total_amount.as_deref().map(parse_amount).transpose()?;
        let currency = patch.currency.as_deref().map(normalize_currency).transpose()?;
        let count = check_installment_count(patch.installment_count)?;

        let mut tx = self.ledger.begin().await?;
        let debt = tx
            .lock_debt(debt_id)
            .await?
            .filter(|d| d.owner_id == owner_id)
            .ok_or(AppError::DebtRecordNotFound)?;
        let payments = tx.list_payments_for_debt(debt.id).await?;
        let now = Utc::now();

        let total = total.unwrap_or(debt.total_amount);
        let cadence = patch.cadence.unwrap_or(debt.cadence);

        if let Some(currency) = &currency {
            if *currency != debt.currency && !payments.is_empty() {
                return Err(AppError::CurrencyMismatch);
            }
        }

        let terms = if let Some(due) = patch.due_date {
            // Vencimento explícito: a contagem deixa de valer
            if due <= now {
                return Err(AppError::InvalidDueDate);
            }
            derive_terms(debt.created_at, cadence, total, Some(due), None)?
        } else if patch.touches_terms() {
            // Ao virar parcela única, a contagem antiga não se aplica
            let count = if cadence == Cadence::OneTime {
                count
            } else {
                count.or_else(|| debt.installment_count.and_then(|n| u32::try_from(n).ok()))
            };
            let due = if count.is_none() || cadence == Cadence::OneTime {
                Some(debt.due_date)
            } else {
                None
            };
            derive_terms(debt.created_at, cadence, total, due, count)?
        } else {
            Terms {
                due_date: debt.due_date,
                installment_count: debt.installment_count,
                installment_amount: debt.installment_amount,
            }
        };

        let status = match patch.archived {
            Some(true) => DebtStatus::Archived,
            Some(false) if debt.status == DebtStatus::Archived => DebtStatus::Active,
            _ => debt.status,
        };

        let edited = DebtRecord {
            total_amount: total,
            currency: currency.unwrap_or_else(|| debt.currency.clone()),
            cadence,
            installment_amount: terms.installment_amount,
            due_date: terms.due_date,
            installment_count: terms.installment_count,
            status,
            description: patch.description.or_else(|| debt.description.clone()),
            notes: patch.notes.or_else(|| debt.notes.clone()),
            updated_at: now,
            ..debt.clone()
        };

        // Termos novos e roll-up numa única escrita
        let debt = tx.update_debt(&rolled_up(&edited, &payments, now)).await?;
        tx.commit().await?;

        tracing::info!("✏️ Dívida {} atualizada", debt.id);
        self.bridge.view_for_owner(&debt).await
    }

    /// Só o dono exclui, e só sem pagamentos (senão: arquivar).
    pub async fn delete(&self, debt_id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.ledger.begin().await?;
        let debt = tx
            .lock_debt(debt_id)
            .await?
            .filter(|d| d.owner_id == owner_id)
            .ok_or(AppError::DebtRecordNotFound)?;

        if !tx.list_payments_for_debt(debt.id).await?.is_empty() {
            return Err(AppError::DebtHasPayments);
        }
        if !tx.delete_debt(debt.id).await? {
            return Err(AppError::DebtRecordNotFound);
        }
        tx.commit().await?;

        tracing::info!("🗑️ Dívida {} excluída por {}", debt_id, owner_id);
        Ok(())
    }

    // =========================================================================
    //  ROLL-UP
    // =========================================================================

    pub async fn recompute_rollup(&self, debt_id: Uuid) -> Result<DebtRecord, AppError> {
        let mut tx = self.ledger.begin().await?;
        let debt = tx.lock_debt(debt_id).await?.ok_or(AppError::DebtRecordNotFound)?;
        let debt = Self::apply_rollup(tx.as_mut(), &debt).await?;
        tx.commit().await?;
        Ok(debt)
    }

    /// Recalcula e grava o roll-up dentro da transação de quem chamou, que
    /// já travou `debt` e já aplicou a própria mutação.
    pub(crate) async fn apply_rollup(
        tx: &mut dyn DebtTransaction,
        debt: &DebtRecord,
    ) -> Result<DebtRecord, AppError> {
        let payments = tx.list_payments_for_debt(debt.id).await?;
        tx.update_debt(&rolled_up(debt, &payments, Utc::now())).await
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// A dívida e a perspectiva de quem lê; terceiros recebem "não encontrada".
    pub async fn authorize(
        &self,
        debt_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<(DebtRecord, Perspective), AppError> {
        let debt = self
            .debts
            .get_debt(debt_id)
            .await?
            .ok_or(AppError::DebtRecordNotFound)?;

        match self.bridge.perspective_of(&debt, viewer_id).await? {
            Some(perspective) => Ok((debt, perspective)),
            None => Err(AppError::DebtRecordNotFound),
        }
    }

    pub async fn get_debt(&self, debt_id: Uuid, viewer_id: Uuid) -> Result<DebtView, AppError> {
        let debt = self
            .debts
            .get_debt(debt_id)
            .await?
            .ok_or(AppError::DebtRecordNotFound)?;
        self.bridge.view_for(&debt, viewer_id).await
    }

    /// Dívidas próprias e, invertidas, aquelas em que o leitor é a contraparte.
    pub async fn list_debts(&self, viewer_id: Uuid) -> Result<Vec<DebtView>, AppError> {
        let mut views = Vec::new();

        for debt in self.debts.list_debts_for_account(viewer_id).await? {
            views.push(self.bridge.view_for_owner(&debt).await?);
        }
        for debt in self.debts.list_debts_where_counterparty(viewer_id).await? {
            views.push(self.bridge.view_for_counterparty(&debt, viewer_id).await?);
        }

        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(views)
    }

    pub async fn payment_schedule(
        &self,
        debt_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Vec<ScheduleLine>, AppError> {
        let (debt, _) = self.authorize(debt_id, viewer_id).await?;
        let payments = self.payments.list_payments_for_debt(debt.id).await?;

        Ok(schedule::build_schedule(&debt, &payments, Utc::now()))
    }

    pub async fn payment_summary(
        &self,
        debt_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<PaymentSummary, AppError> {
        let (debt, _) = self.authorize(debt_id, viewer_id).await?;
        let payments: Vec<_> = self
            .payments
            .list_payments_for_debt(debt.id)
            .await?
            .into_iter()
            .filter(|p| p.counts_towards_total())
            .collect();

        Ok(PaymentSummary {
            debt_id: debt.id,
            total_amount: debt.total_amount,
            amount_paid: debt.amount_paid,
            amount_remaining: debt.amount_remaining,
            percentage_paid: schedule::percentage_paid(&debt),
            completed_payments: payments.len(),
            remaining_installments: schedule::remaining_installments(&debt),
            currency: debt.currency.clone(),
            payments,
        })
    }

    /// Dívidas próprias em aberto com vencimento nos próximos `days` dias.
    pub async fn upcoming_payments(
        &self,
        viewer_id: Uuid,
        days: i64,
    ) -> Result<Vec<UpcomingPayment>, AppError> {
        let now = Utc::now();
        let horizon = now + Duration::days(days.clamp(0, 3650));

        let mut upcoming = Vec::new();
        for debt in self.debts.list_debts_for_account(viewer_id).await? {
            let open = matches!(debt.status, DebtStatus::Active | DebtStatus::Overdue);
            if !open || debt.next_due_date <= now || debt.next_due_date > horizon {
                continue;
            }

            let view = self.bridge.view_for_owner(&debt).await?;
            upcoming.push(UpcomingPayment {
                debt_id: debt.id,
                contact_name: view.contact.display_name,
                direction: debt.direction,
                next_due_date: debt.next_due_date,
                amount: debt.installment_amount.min(debt.amount_remaining),
                currency: debt.currency.clone(),
                description: debt.description.clone(),
            });
        }

        upcoming.sort_by(|a, b| a.next_due_date.cmp(&b.next_due_date));
        Ok(upcoming)
    }

    /// O status das visões já é recalculado na leitura.
    pub async fn overdue_debts(&self, viewer_id: Uuid) -> Result<Vec<DebtView>, AppError> {
        Ok(self
            .list_debts(viewer_id)
            .await?
            .into_iter()
            .filter(|v| v.status == DebtStatus::Overdue)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{LedgerStore, MemoryStore};
    use crate::models::{
        contact::{Contact, CreateContactRequest},
        debt::Direction,
        payment::{PaymentMethod, PaymentRecord, PaymentStatus},
    };
    use crate::services::test_support::{seed_account, seed_contact, services};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn request(contact: &Contact, total: &str) -> CreateDebtRequest {
        CreateDebtRequest {
            counterparty_contact_id: contact.id,
            direction: Direction::OwedToOwner,
            total_amount: total.to_string(),
            currency: None,
            cadence: Some(Cadence::Monthly),
            due_date: None,
            installment_count: Some(3),
            description: Some("Empréstimo".into()),
            notes: None,
        }
    }

    // Grava o pagamento sem passar pelo roll-up
    async fn insert_completed(store: &MemoryStore, debt_id: Uuid, amount: Decimal) {
        let now = Utc::now();
        let mut tx = store.begin().await.unwrap();
        tx.create_payment(&PaymentRecord {
            id: Uuid::new_v4(),
            debt_id,
            amount,
            currency: "PHP".into(),
            payment_date: now,
            method: PaymentMethod::Cash,
            description: None,
            receipt_reference: None,
            status: PaymentStatus::Completed,
            recorded_by: Uuid::new_v4(),
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();
    }

    // Reescreve a dívida gravada, como se o tempo tivesse passado
    async fn overwrite_debt(store: &MemoryStore, debt: DebtRecord) {
        let mut tx = store.begin().await.unwrap();
        tx.update_debt(&debt).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn create_with_count_derives_due_date_and_amount() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;

        let view = svc.debts.create(ana.id, request(&bruno, "1200.00")).await.unwrap();

        assert_eq!(view.installment_amount, dec!(400.00));
        assert_eq!(view.installment_count, Some(3));
        assert_eq!(view.due_date, schedule::advance(view.created_at, Cadence::Monthly, 3));
        assert_eq!(view.next_due_date, schedule::advance(view.created_at, Cadence::Monthly, 1));
        assert_eq!(view.amount_remaining, dec!(1200.00));
        assert_eq!(view.status, DebtStatus::Active);
        assert_eq!(view.currency, "PHP");
        assert_eq!(view.contact.display_name, "Bruno");
    }

    #[tokio::test]
    async fn create_with_due_date_derives_installments() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;

        let req = CreateDebtRequest {
            cadence: Some(Cadence::Weekly),
            installment_count: None,
            due_date: Some(Utc::now() + Duration::days(21) + Duration::hours(1)),
            ..request(&bruno, "900")
        };
        let view = svc.debts.create(ana.id, req).await.unwrap();

        assert_eq!(view.installment_count, None);
        assert_eq!(view.installment_amount, dec!(300));
    }

    #[tokio::test]
    async fn one_time_requires_future_due_date() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;

        let no_due = CreateDebtRequest { cadence: None, installment_count: None, ..request(&bruno, "50") };
        assert!(matches!(svc.debts.create(ana.id, no_due).await, Err(AppError::InvalidDueDate)));

        let due = Utc::now() + Duration::days(10);
        let ok = CreateDebtRequest {
            cadence: Some(Cadence::OneTime),
            installment_count: None,
            due_date: Some(due),
            ..request(&bruno, "50")
        };
        let view = svc.debts.create(ana.id, ok).await.unwrap();
        assert_eq!(view.installment_amount, dec!(50));
        assert_eq!(view.installment_count, Some(1));
        assert_eq!(view.next_due_date, due);
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_before_writing() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;

        let past = CreateDebtRequest {
            installment_count: None,
            due_date: Some(Utc::now() - Duration::days(1)),
            ..request(&bruno, "100")
        };
        assert!(matches!(svc.debts.create(ana.id, past).await, Err(AppError::InvalidDueDate)));
        assert!(matches!(svc.debts.create(ana.id, request(&bruno, "-1")).await, Err(AppError::InvalidAmount)));
        assert!(matches!(svc.debts.create(ana.id, request(&bruno, "abc")).await, Err(AppError::InvalidAmount)));

        let bad_currency = CreateDebtRequest { currency: Some("XXX".into()), ..request(&bruno, "100") };
        assert!(matches!(svc.debts.create(ana.id, bad_currency).await, Err(AppError::InvalidCurrency)));

        let zero = CreateDebtRequest { installment_count: Some(0), ..request(&bruno, "100") };
        assert!(matches!(svc.debts.create(ana.id, zero).await, Err(AppError::InvalidInstallmentCount)));

        let too_many = CreateDebtRequest { installment_count: Some(1001), ..request(&bruno, "100") };
        assert!(matches!(svc.debts.create(ana.id, too_many).await, Err(AppError::InvalidInstallmentCount)));

        let no_cadence = CreateDebtRequest { cadence: None, ..request(&bruno, "100") };
        assert!(matches!(svc.debts.create(ana.id, no_cadence).await, Err(AppError::MissingCadence)));

        assert!(svc.debts.list_debts(ana.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_requires_owners_contact() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let carla = seed_account(&store, "carla@exemplo.com", "Carla").await;
        let bruno_da_carla = seed_contact(&store, &carla, "bruno@exemplo.com", "Bruno").await;

        let result = svc.debts.create(ana.id, request(&bruno_da_carla, "100")).await;
        assert!(matches!(result, Err(AppError::ContactNotFound)));
    }

    #[tokio::test]
    async fn update_rederives_terms_without_touching_paid_amount() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();

        insert_completed(&store, view.id, dec!(300)).await;
        svc.debts.recompute_rollup(view.id).await.unwrap();

        let patch = UpdateDebtRequest { total_amount: Some("1500".into()), ..Default::default() };
        let updated = svc.debts.update(view.id, ana.id, patch).await.unwrap();

        assert_eq!(updated.installment_amount, dec!(500));
        assert_eq!(updated.amount_paid, dec!(300));
        assert_eq!(updated.amount_remaining, dec!(1200));

        let patch = UpdateDebtRequest { installment_count: Some(5), ..Default::default() };
        let updated = svc.debts.update(view.id, ana.id, patch).await.unwrap();
        assert_eq!(updated.installment_amount, dec!(300));
        assert_eq!(updated.due_date, schedule::advance(updated.created_at, Cadence::Monthly, 5));
    }

    #[tokio::test]
    async fn explicit_due_date_edit_clears_installment_count() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();

        let new_due = schedule::advance(view.created_at, Cadence::Monthly, 6);
        let patch = UpdateDebtRequest { due_date: Some(new_due), ..Default::default() };
        let updated = svc.debts.update(view.id, ana.id, patch).await.unwrap();

        assert_eq!(updated.installment_count, None);
        assert_eq!(updated.due_date, new_due);
        assert_eq!(updated.installment_amount, dec!(200));

        let past = UpdateDebtRequest { due_date: Some(Utc::now() - Duration::days(2)), ..Default::default() };
        assert!(matches!(svc.debts.update(view.id, ana.id, past).await, Err(AppError::InvalidDueDate)));
    }

    #[tokio::test]
    async fn archive_and_unarchive() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();

        let archived = svc
            .debts
            .update(view.id, ana.id, UpdateDebtRequest { archived: Some(true), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(archived.status, DebtStatus::Archived);

        // Roll-up preserva o arquivamento
        let rolled = svc.debts.recompute_rollup(view.id).await.unwrap();
        assert_eq!(rolled.status, DebtStatus::Archived);

        let active = svc
            .debts
            .update(view.id, ana.id, UpdateDebtRequest { archived: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(active.status, DebtStatus::Active);
    }

    #[tokio::test]
    async fn only_owner_edits_or_deletes() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let eva = seed_account(&store, "eva@exemplo.com", "Eva").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();

        let patch = UpdateDebtRequest { notes: Some("x".into()), ..Default::default() };
        assert!(matches!(svc.debts.update(view.id, eva.id, patch).await, Err(AppError::DebtRecordNotFound)));
        assert!(matches!(svc.debts.delete(view.id, eva.id).await, Err(AppError::DebtRecordNotFound)));
        assert!(matches!(svc.debts.get_debt(view.id, eva.id).await, Err(AppError::DebtRecordNotFound)));
    }

    #[tokio::test]
    async fn delete_is_rejected_while_payments_exist() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let with_payment = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();
        let without = svc.debts.create(ana.id, request(&bruno, "300")).await.unwrap();

        insert_completed(&store, with_payment.id, dec!(10)).await;

        assert!(matches!(
            svc.debts.delete(with_payment.id, ana.id).await,
            Err(AppError::DebtHasPayments)
        ));
        svc.debts.delete(without.id, ana.id).await.unwrap();
        assert!(matches!(svc.debts.get_debt(without.id, ana.id).await, Err(AppError::DebtRecordNotFound)));
    }

    #[tokio::test]
    async fn registered_counterparty_sees_the_same_debt_inverted() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "A").await;
        let bruno = seed_account(&store, "bruno@exemplo.com", "B").await;
        let added = svc
            .contacts
            .create_contact(&ana, CreateContactRequest {
                name: "B".into(),
                email: Some("bruno@exemplo.com".into()),
                phone: None,
                notes: None,
            })
            .await
            .unwrap();
        assert!(added.is_account_holder);
        let contact = store.get_contact(added.contact_id).await.unwrap().unwrap();

        let created = svc.debts.create(ana.id, request(&contact, "1200")).await.unwrap();

        let seen_by_bruno = svc.debts.list_debts(bruno.id).await.unwrap();
        assert_eq!(seen_by_bruno.len(), 1);
        assert_eq!(seen_by_bruno[0].id, created.id);
        assert_eq!(seen_by_bruno[0].direction, Direction::OwedByOwner);
        assert_eq!(seen_by_bruno[0].contact.display_name, "A");

        // Nenhuma cópia da dívida
        assert_eq!(store.list_debts_for_account(bruno.id).await.unwrap().len(), 0);
        assert_eq!(svc.debts.list_debts(ana.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn schedule_summary_and_upcoming() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200.00")).await.unwrap();

        insert_completed(&store, view.id, dec!(400.00)).await;
        insert_completed(&store, view.id, dec!(250.00)).await;
        svc.debts.recompute_rollup(view.id).await.unwrap();

        let lines = svc.debts.payment_schedule(view.id, ana.id).await.unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].owed_amount, dec!(150.00));

        let summary = svc.debts.payment_summary(view.id, ana.id).await.unwrap();
        assert_eq!(summary.amount_paid, dec!(650.00));
        assert_eq!(summary.amount_remaining, dec!(550.00));
        assert_eq!(summary.percentage_paid, dec!(54.17));
        assert_eq!(summary.completed_payments, 2);
        assert_eq!(summary.remaining_installments, 2);

        let upcoming = svc.debts.upcoming_payments(ana.id, 45).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].contact_name, "Bruno");
        assert_eq!(upcoming[0].amount, dec!(400.00));
        assert!(svc.debts.upcoming_payments(ana.id, 1).await.unwrap().is_empty());
        assert!(svc.debts.overdue_debts(ana.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cadence_only_edit_rederives_terms() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();

        // Mensal -> semanal: mantém as 3 parcelas, o vencimento encurta
        let weekly = UpdateDebtRequest { cadence: Some(Cadence::Weekly), ..Default::default() };
        let updated = svc.debts.update(view.id, ana.id, weekly).await.unwrap();
        assert_eq!(updated.cadence, Cadence::Weekly);
        assert_eq!(updated.installment_count, Some(3));
        assert_eq!(updated.installment_amount, dec!(400));
        assert_eq!(updated.due_date, schedule::advance(view.created_at, Cadence::Weekly, 3));
        assert_eq!(updated.next_due_date, schedule::advance(view.created_at, Cadence::Weekly, 1));

        // Semanal -> parcela única: uma parcela do total, no vencimento atual
        let one_time = UpdateDebtRequest { cadence: Some(Cadence::OneTime), ..Default::default() };
        let updated = svc.debts.update(view.id, ana.id, one_time).await.unwrap();
        assert_eq!(updated.installment_count, Some(1));
        assert_eq!(updated.installment_amount, dec!(1200));
        assert_eq!(updated.due_date, schedule::advance(view.created_at, Cadence::Weekly, 3));
        assert_eq!(updated.next_due_date, updated.due_date);

        // De volta ao mensal: a contagem única vale um período
        let monthly = UpdateDebtRequest { cadence: Some(Cadence::Monthly), ..Default::default() };
        let updated = svc.debts.update(view.id, ana.id, monthly).await.unwrap();
        assert_eq!(updated.installment_count, Some(1));
        assert_eq!(updated.installment_amount, dec!(1200));
        assert_eq!(updated.due_date, schedule::advance(view.created_at, Cadence::Monthly, 1));
    }

    #[tokio::test]
    async fn failed_update_leaves_the_debt_untouched() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();
        insert_completed(&store, view.id, dec!(300)).await;
        let before = svc.debts.recompute_rollup(view.id).await.unwrap();

        store.fail_debt_updates(true);
        let patch = UpdateDebtRequest { total_amount: Some("1500".into()), ..Default::default() };
        assert!(svc.debts.update(view.id, ana.id, patch.clone()).await.is_err());
        assert_eq!(store.get_debt(view.id).await.unwrap().unwrap(), before);

        // Uma escrita só: termos novos e totais saem juntos
        store.fail_debt_updates(false);
        let updated = svc.debts.update(view.id, ana.id, patch).await.unwrap();
        let stored = store.get_debt(view.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, dec!(1500));
        assert_eq!(stored.amount_paid, dec!(300));
        assert_eq!(stored.amount_remaining, dec!(1200));
        assert_eq!(updated.amount_remaining, dec!(1200));
    }

    #[tokio::test]
    async fn reads_report_overdue_when_next_due_date_has_passed() {
        let store = MemoryStore::new();
        let svc = services(&store);
        let ana = seed_account(&store, "ana@exemplo.com", "Ana").await;
        let bruno = seed_contact(&store, &ana, "bruno@exemplo.com", "Bruno").await;
        let view = svc.debts.create(ana.id, request(&bruno, "1200")).await.unwrap();

        // Gravada como ativa no último roll-up; o vencimento passou depois
        let stored = store.get_debt(view.id).await.unwrap().unwrap();
        overwrite_debt(&store, DebtRecord {
            next_due_date: Utc::now() - Duration::days(3),
            status: DebtStatus::Active,
            ..stored
        })
        .await;

        assert_eq!(svc.debts.get_debt(view.id, ana.id).await.unwrap().status, DebtStatus::Overdue);
        assert_eq!(svc.debts.list_debts(ana.id).await.unwrap()[0].status, DebtStatus::Overdue);

        let overdue = svc.debts.overdue_debts(ana.id).await.unwrap();
        assert_eq!(overdue.iter().map(|v| v.id).collect::<Vec<_>>(), vec![view.id]);
    }
}
