use crate::cli::OutputFormatter;
use crate::config::Config;
use crate::email;
use crate::error::Result;
use crate::services::{Collaborators, Helpdesk};
use crate::storage::MemoryStore;
use std::sync::Arc;

/// Handle the serve command
///
/// Builds the engine over the in-memory store seeded from the configured
/// user directory and serves the API until ctrl-c.
pub fn handle_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    formatter: &OutputFormatter,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;
    let addr = config.server.socket_addr()?;

    let store = Arc::new(MemoryStore::with_users(config.directory.users.clone()));
    let sender = email::sender_from_config(&config.email);
    let helpdesk = Arc::new(Helpdesk::new(
        Collaborators::from_store(store, sender),
        &config,
    ));

    tracing::info!(
        users = config.directory.users.len(),
        email_enabled = config.email.enabled,
        "helpdesk engine ready"
    );
    formatter.success(&format!("Serving helpdesk API on http://{addr}"));

    serve(helpdesk, addr)
}

#[cfg(feature = "api")]
fn serve(helpdesk: Arc<Helpdesk>, addr: std::net::SocketAddr) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(crate::api::serve(helpdesk, addr))
}

#[cfg(not(feature = "api"))]
fn serve(_helpdesk: Arc<Helpdesk>, _addr: std::net::SocketAddr) -> Result<()> {
    Err(crate::error::HelpdeskError::Custom(
        "This build does not include the HTTP API; rebuild with --features api".to_string(),
    ))
}
