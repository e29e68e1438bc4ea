//! User-friendly error message mappings

use singularity_core::InvalidationReason;

/// Message shown when the backend ends a session
pub fn invalidation_message(reason: InvalidationReason) -> &'static str {
    match reason {
        InvalidationReason::RefreshFailed => "Your session has expired. Please log in again.",
        InvalidationReason::Unauthorized => {
            "You have been signed out. Please log in again to continue."
        }
    }
}
