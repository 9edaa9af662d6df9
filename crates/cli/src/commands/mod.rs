//! Command handlers for the refdesk CLI.

mod chat;
mod index;

pub use chat::ChatCommand;
pub use index::IndexCommand;
