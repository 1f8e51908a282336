//! HTTP API for the helpdesk engine
//!
//! Thin axum adapter over [`Helpdesk`]: it resolves the actor from
//! forwarded identity headers, delegates to the services and wraps every
//! result in the `{ success, data, message }` envelope.

pub mod extractors;
pub mod handlers;
pub mod response;

use crate::error::Result;
use crate::services::Helpdesk;
use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{delete, get, put},
};
use handlers::{health, notes, notifications, tickets};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub helpdesk: Arc<Helpdesk>,
}

/// Build the application router
pub fn router(helpdesk: Arc<Helpdesk>) -> Router {
    // Notification reads must never be served from a cache
    let notification_routes = Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/mark-all-read", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route("/notifications/:id", delete(notifications::delete_notification))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/:id/history", get(tickets::ticket_history))
        .route(
            "/tickets/:id/notes",
            get(notes::list_notes).post(notes::add_note),
        )
        .route("/tickets/:id/notes/:note_id", delete(notes::delete_note))
        .merge(notification_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { helpdesk })
}

/// Serve the API until ctrl-c, then let pending notification emails settle
pub async fn serve(helpdesk: Arc<Helpdesk>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "helpdesk API listening");

    axum::serve(listener, router(Arc::clone(&helpdesk)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    helpdesk.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
