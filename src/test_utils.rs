//! Test utilities for the helpdesk engine
//!
//! This module provides a fully wired engine over the in-memory store, one
//! seeded actor per role, and collaborator doubles for failure scenarios.

#![cfg(test)]

use crate::config::Config;
use crate::core::{
    Actor, NewTicket, Notification, NotificationId, Role, Ticket, TicketId, TicketLogEntry,
    TicketPatch, UserId, UserProfile,
};
use crate::email::{EmailMessage, EmailSender};
use crate::error::{DispatchError, HelpdeskError, Result};
use crate::services::{Collaborators, Helpdesk};
use crate::storage::{
    AuditRepository, MemoryStore, NotificationRepository, TicketQuery, TicketRepository,
    TicketUpdate,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Engine fixture with a seeded user directory
pub struct TestDesk {
    pub store: Arc<MemoryStore>,
    pub emails: Arc<RecordingEmailSender>,
    pub helpdesk: Helpdesk,
    pub user: Actor,
    pub agent: Actor,
    pub manager: Actor,
    pub admin: Actor,
    pub super_admin: Actor,
}

impl TestDesk {
    pub fn new() -> Self {
        Self::build(|collaborators, _| collaborators)
    }

    /// Every versioned ticket write reports a concurrent modification
    pub fn contended() -> Self {
        Self::build(|mut collaborators, store| {
            collaborators.tickets = Arc::new(ContendedTickets(Arc::clone(store)));
            collaborators
        })
    }

    /// Audit appends and notification writes always fail
    pub fn with_broken_side_effects() -> Self {
        Self::build(|mut collaborators, _| {
            collaborators.audit = Arc::new(BrokenStore);
            collaborators.notifications = Arc::new(BrokenStore);
            collaborators
        })
    }

    fn build(customize: impl FnOnce(Collaborators, &Arc<MemoryStore>) -> Collaborators) -> Self {
        let profiles = [
            UserProfile::new("Uma User", "uma@example.com", Role::User).in_department("IT"),
            UserProfile::new("Alan Agent", "alan@example.com", Role::Agent).in_department("IT"),
            UserProfile::new("Mia Manager", "mia@example.com", Role::Manager).in_department("IT"),
            UserProfile::new("Ada Admin", "ada@example.com", Role::Admin),
            UserProfile::new("Sam Super", "sam@example.com", Role::SuperAdmin),
        ];
        let [user, agent, manager, admin, super_admin] = profiles.clone().map(|p| p.actor());

        let store = Arc::new(MemoryStore::with_users(profiles));
        let emails = Arc::new(RecordingEmailSender::default());
        let collaborators = customize(
            Collaborators::from_store(Arc::clone(&store), emails.clone()),
            &store,
        );
        let helpdesk = Helpdesk::new(collaborators, &Config::default());

        Self {
            store,
            emails,
            helpdesk,
            user,
            agent,
            manager,
            admin,
            super_admin,
        }
    }

    /// File a ticket in the IT department as `actor`
    pub async fn ticket_by(&self, actor: &Actor) -> Ticket {
        self.helpdesk
            .tickets
            .create(
                NewTicket::new("Cannot print", "Printer on floor 3 is offline")
                    .with_department("IT"),
                actor,
            )
            .await
            .expect("Failed to create ticket")
    }

    /// Every notification of a recipient, newest first
    pub async fn notifications_for(&self, recipient: UserId) -> Vec<Notification> {
        self.helpdesk
            .notifications
            .list(recipient, Some(usize::MAX), 0)
            .await
            .expect("Failed to list notifications")
            .notifications
    }
}

/// Email sender that keeps every message, optionally failing each send
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    failure: Mutex<Option<String>>,
}

impl RecordingEmailSender {
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> std::result::Result<(), DispatchError> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(DispatchError::Email(reason));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Ticket repository whose versioned writes always lose the race
pub struct ContendedTickets(pub Arc<MemoryStore>);

#[async_trait]
impl TicketRepository for ContendedTickets {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.0.insert_ticket(ticket).await
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        self.0.get_ticket(id).await
    }

    async fn find_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
        self.0.find_tickets(query).await
    }

    async fn update_ticket(
        &self,
        _id: &TicketId,
        _patch: &TicketPatch,
        expected_version: u64,
    ) -> Result<TicketUpdate> {
        Ok(TicketUpdate::Stale {
            current_version: expected_version + 1,
        })
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        self.0.delete_ticket(id).await
    }
}

/// Audit and notification store that is always down
pub struct BrokenStore;

fn down<T>() -> Result<T> {
    Err(HelpdeskError::storage("store unavailable"))
}

#[async_trait]
impl AuditRepository for BrokenStore {
    async fn append_entry(&self, _entry: &TicketLogEntry) -> Result<()> {
        down()
    }

    async fn entries_for_ticket(&self, _ticket: &TicketId) -> Result<Vec<TicketLogEntry>> {
        down()
    }
}

#[async_trait]
impl NotificationRepository for BrokenStore {
    async fn insert_notification(&self, _notification: &Notification) -> Result<()> {
        down()
    }

    async fn get_notification(&self, _id: &NotificationId) -> Result<Option<Notification>> {
        down()
    }

    async fn notifications_for(
        &self,
        _recipient: &UserId,
        _limit: usize,
        _skip: usize,
    ) -> Result<(Vec<Notification>, usize)> {
        down()
    }

    async fn count_unread(&self, _recipient: &UserId) -> Result<usize> {
        down()
    }

    async fn mark_read(&self, _id: &NotificationId) -> Result<Option<Notification>> {
        down()
    }

    async fn mark_all_read(&self, _recipient: &UserId) -> Result<usize> {
        down()
    }

    async fn record_email_outcome(
        &self,
        _id: &NotificationId,
        _outcome: std::result::Result<(), String>,
    ) -> Result<()> {
        down()
    }

    async fn delete_notification(&self, _id: &NotificationId) -> Result<Option<Notification>> {
        down()
    }
}
