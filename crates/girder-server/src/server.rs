//! Router assembly and server lifecycle.

use crate::auth;
use crate::config::ServerConfig;
use crate::routes::{projects, tickets};
use crate::state::{AppState, SharedState};
use anyhow::{Context, Result};
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use chrono::Utc;
use girder::domain::{User, UserId};
use girder::storage::{create_storage, Record};
use std::collections::HashMap;
use tower_http::cors::CorsLayer;

/// Build the full application router.
///
/// Everything except `/health` sits behind the bearer-token gate.
pub fn build_router(state: SharedState) -> Router {
    let gated = Router::new()
        .route("/tickets/create", post(tickets::create_ticket))
        .route("/tickets/create/epic", post(tickets::create_epic))
        .route(
            "/tickets/{id}",
            get(tickets::list_tickets).delete(tickets::delete_ticket),
        )
        .route("/tickets/update/{id}", post(tickets::update_ticket))
        .route("/tickets/update/epic/{id}", post(tickets::update_epic))
        .route("/tickets/edit/link_epic/{id}", post(tickets::link_epic))
        .route("/tickets/comment/{id}", post(tickets::add_comment))
        .route(
            "/tickets/comment/{id}/{comment_id}",
            delete(tickets::delete_comment),
        )
        .route("/projects", get(projects::list_projects))
        .route("/projects/create", post(projects::create_project))
        .route("/projects/{id}", get(projects::get_project))
        .route(
            "/projects/update/tickets-order",
            post(projects::update_tickets_order),
        )
        .route(
            "/projects/update/column-order",
            post(projects::update_column_order),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(gated)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Ensure every configured account's user record exists in storage.
///
/// Accounts carry stable user ids, so provisioning is an insert-if-absent;
/// existing records (and the comment snapshots pointing at them) are left
/// alone.
pub async fn provision_accounts(state: &SharedState, config: &ServerConfig) -> Result<()> {
    let mut missing = Vec::new();
    {
        let store = state.store.read().await;
        for account in &config.accounts {
            let user_id = UserId::new(account.id.clone());
            if store.get_user(&user_id).await?.is_none() {
                missing.push(Record::User(User {
                    id: user_id,
                    name: account.name.clone(),
                    picture_url: account.picture_url.clone(),
                    created_at: Utc::now(),
                }));
            }
        }
    }

    if !missing.is_empty() {
        tracing::info!(count = missing.len(), "provisioning account users");
        let mut store = state.store.write().await;
        store.import_records(missing).await?;
        store.save().await?;
    }
    Ok(())
}

/// Build the token table from configured accounts.
#[must_use]
pub fn auth_table(config: &ServerConfig) -> HashMap<String, UserId> {
    config
        .accounts
        .iter()
        .map(|account| (account.token.clone(), UserId::new(account.id.clone())))
        .collect()
}

/// Start the girder server.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let storage = create_storage(config.backend())
        .await
        .context("failed to initialize storage")?;
    let state = AppState::shared(storage, auth_table(&config));

    provision_accounts(&state, &config)
        .await
        .context("failed to provision accounts")?;

    let mut app = build_router(state);
    if config.dev_cors {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "girder server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
    }
    tracing::info!("shutting down");
}
