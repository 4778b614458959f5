//! Inference provider abstraction and the Claude backend.

pub mod claude;
pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;

pub use error::LlmError;
pub use provider::LlmProvider;
