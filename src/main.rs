// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração ou sem banco a aplicação não sobe
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas protegidas
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me));

    let contact_routes = Router::new()
        .route("/"
               ,post(handlers::contacts::create_contact)
               .get(handlers::contacts::list_contacts)
        )
        .route("/{contact_id}"
               ,get(handlers::contacts::get_contact)
               .put(handlers::contacts::update_contact)
               .delete(handlers::contacts::delete_contact)
        );

    let debt_routes = Router::new()
        .route("/"
               ,post(handlers::debts::create_debt)
               .get(handlers::debts::list_debts)
        )
        .route("/upcoming", get(handlers::debts::upcoming_payments))
        .route("/overdue", get(handlers::debts::overdue_debts))
        .route("/{debt_id}"
               ,get(handlers::debts::get_debt)
               .put(handlers::debts::update_debt)
               .delete(handlers::debts::delete_debt)
        )
        .route("/{debt_id}/schedule", get(handlers::debts::get_schedule))
        .route("/{debt_id}/summary", get(handlers::debts::get_summary))
        .route("/{debt_id}/payments", get(handlers::debts::list_debt_payments));

    let payment_routes = Router::new()
        .route("/", post(handlers::payments::record_payment))
        .route("/pending", get(handlers::payments::list_pending))
        .route("/{payment_id}"
               ,get(handlers::payments::get_payment)
               .patch(handlers::payments::update_payment)
               .delete(handlers::payments::delete_payment)
        )
        .route("/{payment_id}/verify", post(handlers::payments::verify_payment))
        .route("/{payment_id}/reject", post(handlers::payments::reject_payment));

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/contacts", contact_routes)
        .nest("/debts", debt_routes)
        .nest("/payments", payment_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
