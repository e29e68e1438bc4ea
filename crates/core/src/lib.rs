//! Singularity session core: token storage, expiry tracking and account types

pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "tests"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use events::{InvalidationReason, SessionEvents, SessionInvalidated};
pub use session::{Session, TokenStore};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, SessionStorage, StorageScope};
pub use types::{Attributes, AuthResult, LoginCredentials, Registration, User, UserClass};
