//! helpdesk - Support ticket lifecycle and access-control engine
//!
//! This crate implements the core of a helpdesk: tickets with a three-state
//! lifecycle, role-based access control over every operation, staff-only
//! internal notes, an append-only audit trail, and in-app notifications with
//! best-effort email delivery.
//!
//! Primary mutations (create, update, annotate, delete) succeed or fail on
//! their own. Audit and notification writes happen afterwards and are only
//! logged when they fail.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk::config::Config;
//! use helpdesk::core::{NewTicket, Role, UserProfile};
//! use helpdesk::email::LogEmailSender;
//! use helpdesk::services::{Collaborators, Helpdesk};
//! use helpdesk::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! let requester = UserProfile::new("Uma", "uma@example.com", Role::User);
//! let store = Arc::new(MemoryStore::with_users([requester.clone()]));
//! let desk = Helpdesk::new(
//!     Collaborators::from_store(store, Arc::new(LogEmailSender)),
//!     &Config::default(),
//! );
//!
//! let ticket = desk
//!     .tickets
//!     .create(NewTicket::new("VPN drops", "Every ten minutes"), &requester.actor())
//!     .await?;
//! ```

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]
// Allow some pedantic lints that don't improve code quality
#![allow(clippy::option_if_let_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::fn_params_excessive_bools)]
#![allow(clippy::map_unwrap_or)]

pub mod cli;
pub mod config;
pub mod core;
pub mod email;
pub mod error;
pub mod policy;
pub mod services;
pub mod storage;
pub mod templates;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{HelpdeskError, Result};
