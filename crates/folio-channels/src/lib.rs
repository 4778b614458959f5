//! Chat platform adapters for Folio.

pub mod discord;
pub mod error;

pub use discord::{AccessPolicy, DiscordChannel, DiscordInbox};
pub use error::DiscordError;
