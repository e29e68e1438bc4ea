//! Browser glue for the Singularity web client: storage, session context, logging

pub mod auth;
pub mod config;
pub mod logging;
pub mod storage;

pub use auth::{SessionContext, SessionProvider, use_is_authenticated, use_session};
pub use config::default_client_config;
pub use storage::BrowserStorage;
