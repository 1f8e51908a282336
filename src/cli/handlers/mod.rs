//! Command handlers

mod config;
mod serve;

pub use config::handle_config_command;
pub use serve::handle_serve;
