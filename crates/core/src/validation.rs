//! Client-side checks run before any request leaves the client

use crate::error::{CoreError, CoreResult};
use crate::types::Registration;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_FULL_NAME_LEN: usize = 2;

/// Check a registration form
///
/// The password rule is checked first so its message wins when several
/// fields are invalid.
pub fn validate_registration(registration: &Registration) -> CoreResult<()> {
    validate_password(&registration.password)?;

    if registration.username.trim().chars().count() < MIN_USERNAME_LEN {
        return Err(CoreError::validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters long"
        )));
    }

    if registration.full_name.trim().chars().count() < MIN_FULL_NAME_LEN {
        return Err(CoreError::validation(format!(
            "Full name must be at least {MIN_FULL_NAME_LEN} characters long"
        )));
    }

    validate_email(&registration.email)
}

pub fn validate_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> CoreResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CoreError::validation("Please enter a valid email address")),
    }
}
