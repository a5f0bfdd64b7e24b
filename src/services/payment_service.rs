// src/services/payment_service.rs

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        money::{normalize_currency, parse_amount},
    },
    db::PaymentStore,
    models::{
        debt::Perspective,
        payment::{
            CreatePaymentRequest, PaymentRecord, PaymentStatus, UpdatePaymentRequest,
            VerificationOutcome,
        },
    },
    services::debt_service::DebtService,
};

// Fluxo de verificação:
//   dono registra        -> completed
//   contraparte registra -> pending --verify--> completed
//                                   --reject--> rejected
// Nenhum estado terminal volta atrás; correção = excluir e registrar de novo.
#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentStore>,
    debts: DebtService,
}

// Quem não é parte da dívida não descobre que o pagamento existe
fn hide_debt(e: AppError) -> AppError {
    match e {
        AppError::DebtRecordNotFound => AppError::PaymentNotFound,
        other => other,
    }
}

impl PaymentService {
    pub fn new(payments: Arc<dyn PaymentStore>, debts: DebtService) -> Self {
        Self { payments, debts }
    }

    pub async fn record_payment(
        &self,
        actor_id: Uuid,
        req: CreatePaymentRequest,
    ) -> Result<PaymentRecord, AppError> {
        req.validate()?;
        let amount = parse_amount(&req.amount)?;

        let (debt, perspective) = self.debts.authorize(req.debt_id, actor_id).await?;

        let currency = match req.currency.as_deref() {
            Some(raw) => normalize_currency(raw)?,
            None => debt.currency.clone(),
        };
        if currency != debt.currency {
            return Err(AppError::CurrencyMismatch);
        }

        // O dono atesta o próprio recebimento; a contraparte precisa de confirmação
        let status = match perspective {
            Perspective::Owner => PaymentStatus::Completed,
            Perspective::Counterparty => PaymentStatus::Pending,
        };

        let now = Utc::now();
        let payment = PaymentRecord {
            id: Uuid::new_v4(),
            debt_id: debt.id,
            amount,
            currency,
            payment_date: req.payment_date.unwrap_or(now),
            method: req.method,
            description: req.description,
            receipt_reference: req.receipt_reference,
            status,
            recorded_by: actor_id,
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            created_at: now,
            updated_at: now,
        };

        // Pagamento e roll-up na mesma transação, com a dívida travada
        let mut tx = self.debts.begin().await?;
        let locked = tx.lock_debt(debt.id).await?.ok_or(AppError::DebtRecordNotFound)?;
        if locked.currency != payment.currency {
            return Err(AppError::CurrencyMismatch);
        }
        let payment = tx.create_payment(&payment).await?;
        DebtService::apply_rollup(tx.as_mut(), &locked).await?;
        tx.commit().await?;

        tracing::info!(
            "💰 Pagamento {} de {} {} registrado na dívida {} ({:?})",
            payment.id,
            payment.amount,
            payment.currency,
            debt.id,
            payment.status
        );
        Ok(payment)
    }

    pub async fn get_payment(&self, payment_id: Uuid, viewer_id: Uuid) -> Result<PaymentRecord, AppError> {
        let (payment, _) = self.payment_for(payment_id, viewer_id).await?;
        Ok(payment)
    }

    pub async fn list_payments(&self, debt_id: Uuid, viewer_id: Uuid) -> Result<Vec<PaymentRecord>, AppError> {
        let (debt, _) = self.debts.authorize(debt_id, viewer_id).await?;
        self.payments.list_payments_for_debt(debt.id).await
    }

    /// Só campos descritivos; valor, data, método e status nunca mudam aqui.
    pub async fn update_payment(
        &self,
        payment_id: Uuid,
        actor_id: Uuid,
        req: UpdatePaymentRequest,
    ) -> Result<PaymentRecord, AppError> {
        req.validate()?;

        let (payment, perspective) = self.payment_for(payment_id, actor_id).await?;
        if payment.recorded_by != actor_id && perspective != Perspective::Owner {
            return Err(AppError::PaymentNotFound);
        }

        let mut tx = self.debts.begin().await?;
        let debt = tx.lock_debt(payment.debt_id).await?.ok_or(AppError::PaymentNotFound)?;
        let current = tx.get_payment(payment_id).await?.ok_or(AppError::PaymentNotFound)?;

        let edited = PaymentRecord {
            description: req.description.or_else(|| current.description.clone()),
            receipt_reference: req.receipt_reference.or_else(|| current.receipt_reference.clone()),
            updated_at: Utc::now(),
            ..current
        };
        let updated = tx.update_payment(&edited).await?;
        DebtService::apply_rollup(tx.as_mut(), &debt).await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn delete_payment(&self, payment_id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let (payment, perspective) = self.payment_for(payment_id, actor_id).await?;
        if perspective != Perspective::Owner {
            return Err(AppError::PaymentNotFound);
        }

        let mut tx = self.debts.begin().await?;
        let debt = tx.lock_debt(payment.debt_id).await?.ok_or(AppError::PaymentNotFound)?;
        if !tx.delete_payment(payment.id).await? {
            return Err(AppError::PaymentNotFound);
        }
        DebtService::apply_rollup(tx.as_mut(), &debt).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Pagamento {} excluído da dívida {}", payment.id, payment.debt_id);
        Ok(())
    }

    /// Confirma ou rejeita um pagamento pendente. Sem autorização ou sem
    /// pagamento, a resposta é a mesma: não encontrado.
    pub async fn verify(
        &self,
        payment_id: Uuid,
        actor_id: Uuid,
        outcome: VerificationOutcome,
        notes: Option<String>,
    ) -> Result<PaymentRecord, AppError> {
        let payment = self
            .payments
            .get_payment(payment_id)
            .await?
            .ok_or(AppError::PaymentNotFound)?;
        if !self.payments.can_account_verify(payment.id, actor_id).await? {
            return Err(AppError::PaymentNotFound);
        }

        let mut tx = self.debts.begin().await?;
        let debt = tx.lock_debt(payment.debt_id).await?.ok_or(AppError::PaymentNotFound)?;

        // Relê com a dívida travada: outra verificação pode ter chegado antes
        let current = tx.get_payment(payment_id).await?.ok_or(AppError::PaymentNotFound)?;
        if current.status.is_terminal() {
            return Err(AppError::PaymentNotPending);
        }

        let verified = current.verified(outcome, actor_id, notes, Utc::now());
        let verified = tx.update_payment(&verified).await?;
        DebtService::apply_rollup(tx.as_mut(), &debt).await?;
        tx.commit().await?;

        tracing::info!(
            "✅ Pagamento {} verificado por {}: {:?}",
            verified.id,
            actor_id,
            verified.status
        );
        Ok(verified)
    }

    pub async fn reject(
        &self,
        payment_id: Uuid,
        actor_id: Uuid,
        notes: Option<String>,
    ) -> Result<PaymentRecord, AppError> {
        self.verify(payment_id, actor_id, VerificationOutcome::Rejected, notes).await
    }

    /// O que a conta precisa confirmar.
    pub async fn list_pending_for_account(&self, account_id: Uuid) -> Result<Vec<PaymentRecord>, AppError> {
        self.payments.list_pending_for_account(account_id).await
    }

    async fn payment_for(
        &self,
        payment_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<(PaymentRecord, Perspective), AppError> {
        let payment = self
            .payments
            .get_payment(payment_id)
            .await?
            .ok_or(AppError::PaymentNotFound)?;
        let (_, perspective) = self
            .debts
            .authorize(payment.debt_id, viewer_id)
            .await
            .map_err(hide_debt)?;
        Ok((payment, perspective))
    }
}
