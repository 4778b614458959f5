//! Content classification, feedback generation, and message routing for Folio.

pub mod capture;
pub mod channel;
pub mod chunker;
pub mod classifier;
pub mod config;
pub mod evaluator;
pub mod extract;
pub mod links;
pub mod router;
pub mod vault;

pub use channel::{Attachment, ChannelError, ChatChannel, InboundMessage};
pub use config::Config;
pub use router::{Router, RouterSettings};
