//! Singularity HTTP client
//!
//! Typed access to the Singularity auth API plus the session handling that
//! keeps a valid bearer token on every protected request.

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::{ApiClient, ClientConfig, RequestAuthenticator, SessionManager};
