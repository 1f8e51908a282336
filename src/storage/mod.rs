//! Record store collaborators
//!
//! The persistence engine is external to the helpdesk core. Services depend
//! only on the repository traits defined here; [`MemoryStore`] is the
//! bundled implementation.

mod memory;
mod query;
mod repository;

pub use memory::MemoryStore;
pub use query::{TicketFilter, TicketQuery};
pub use repository::{
    AuditRepository, NoteRepository, NotificationRepository, RecordStore, TicketRepository,
    TicketUpdate, UserDirectory,
};
