//! Helpdesk services
//!
//! [`Helpdesk`] wires the four services to one set of injected
//! [`Collaborators`]. Each service only sees the repositories it needs.

mod audit;
mod notes;
mod notify;
mod tickets;

pub use audit::AuditLogger;
pub use notes::NoteService;
pub use notify::{NotificationDispatcher, NotificationEvent, NotificationPage};
pub use tickets::TicketService;

use crate::config::Config;
use crate::email::EmailSender;
use crate::storage::{
    AuditRepository, NoteRepository, NotificationRepository, RecordStore, TicketRepository,
    UserDirectory,
};
use std::sync::Arc;

/// External collaborators injected into the services
#[derive(Clone)]
pub struct Collaborators {
    pub tickets: Arc<dyn TicketRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub email: Arc<dyn EmailSender>,
}

impl Collaborators {
    /// Use one record store for every repository
    pub fn from_store<S>(store: Arc<S>, email: Arc<dyn EmailSender>) -> Self
    where
        S: RecordStore + 'static,
    {
        Self {
            tickets: store.clone(),
            notes: store.clone(),
            audit: store.clone(),
            notifications: store.clone(),
            users: store,
            email,
        }
    }
}

/// The assembled helpdesk engine
pub struct Helpdesk {
    pub tickets: TicketService,
    pub notes: NoteService,
    pub notifications: Arc<NotificationDispatcher>,
    pub audit: AuditLogger,
}

impl Helpdesk {
    pub fn new(collaborators: Collaborators, config: &Config) -> Self {
        let audit = AuditLogger::new(collaborators.audit);
        let notifications = Arc::new(NotificationDispatcher::new(
            collaborators.notifications,
            collaborators.users.clone(),
            collaborators.email,
            config.email.clone(),
            config.notifications.page_size,
        ));

        let tickets = TicketService::new(
            collaborators.tickets.clone(),
            collaborators.users.clone(),
            audit.clone(),
            Arc::clone(&notifications),
            config.tickets.clone(),
        );
        let notes = NoteService::new(
            collaborators.tickets,
            collaborators.notes,
            collaborators.users,
            audit.clone(),
            Arc::clone(&notifications),
        );

        Self {
            tickets,
            notes,
            notifications,
            audit,
        }
    }

    /// Wait for background email deliveries to settle
    pub async fn shutdown(&self) {
        let pending = self.notifications.in_flight();
        if pending > 0 {
            tracing::info!(pending, "waiting for in-flight notification emails");
        }
        self.notifications.drain().await;
    }
}
