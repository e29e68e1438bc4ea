//! Authentication module

pub mod context;
pub mod error_messages;

// Re-export commonly used items
pub use context::{SessionContext, SessionProvider, use_is_authenticated, use_session};
