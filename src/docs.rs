// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Contacts ---
        handlers::contacts::create_contact,
        handlers::contacts::list_contacts,
        handlers::contacts::get_contact,
        handlers::contacts::update_contact,
        handlers::contacts::delete_contact,

        // --- Debts ---
        handlers::debts::create_debt,
        handlers::debts::list_debts,
        handlers::debts::upcoming_payments,
        handlers::debts::overdue_debts,
        handlers::debts::get_debt,
        handlers::debts::update_debt,
        handlers::debts::delete_debt,
        handlers::debts::get_schedule,
        handlers::debts::get_summary,
        handlers::debts::list_debt_payments,

        // --- Payments ---
        handlers::payments::record_payment,
        handlers::payments::list_pending,
        handlers::payments::get_payment,
        handlers::payments::update_payment,
        handlers::payments::delete_payment,
        handlers::payments::verify_payment,
        handlers::payments::reject_payment,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Account,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Contacts ---
            models::contact::ContactView,
            models::contact::CreateContactRequest,
            models::contact::UpdateContactRequest,

            // --- Debts ---
            models::debt::Direction,
            models::debt::Cadence,
            models::debt::DebtStatus,
            models::debt::Perspective,
            models::debt::ContactRef,
            models::debt::DebtView,
            models::debt::CreateDebtRequest,
            models::debt::UpdateDebtRequest,
            models::debt::UpcomingPayment,
            models::schedule::SlotStatus,
            models::schedule::ScheduleLine,

            // --- Payments ---
            models::payment::PaymentStatus,
            models::payment::PaymentMethod,
            models::payment::VerificationOutcome,
            models::payment::PaymentRecord,
            models::payment::CreatePaymentRequest,
            models::payment::UpdatePaymentRequest,
            models::payment::VerifyPaymentRequest,
            models::payment::RejectPaymentRequest,
            models::payment::PaymentSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados da Conta"),
        (name = "Contacts", description = "Agenda de Contatos"),
        (name = "Debts", description = "Dívidas, Parcelas e Vencimentos"),
        (name = "Payments", description = "Pagamentos e Confirmação")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
