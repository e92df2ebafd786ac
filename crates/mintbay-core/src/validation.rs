//! Input validation for request payloads.
//!
//! Each check returns `AppError::Validation` with a message naming the
//! offending field; handlers bubble these up as 400 responses.

use url::Url;

use crate::error::AppError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 32;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;
pub const NAME_MAX: usize = 100;

/// Usernames: 3-32 chars of `[a-z0-9_]`.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        return Err(AppError::Validation(format!(
            "username must be {USERNAME_MIN}-{USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(AppError::Validation(
            "username may only contain lowercase letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

/// Minimal structural email check: one `@` with non-empty local part and a
/// domain containing a dot. Deliverability is not our problem.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.len() > 255 {
        return Err(AppError::Validation("invalid email address".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < PASSWORD_MIN {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    if password.len() > PASSWORD_MAX {
        return Err(AppError::Validation(format!(
            "password must be at most {PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

/// Display names for NFTs and collections: non-empty, at most 100 chars.
pub fn validate_name(field: &str, name: &str) -> Result<(), AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.len() > NAME_MAX {
        return Err(AppError::Validation(format!(
            "{field} must be at most {NAME_MAX} characters"
        )));
    }
    Ok(())
}

/// Prices are strictly positive minor units.
pub fn validate_price(field: &str, price: i64) -> Result<(), AppError> {
    if price <= 0 {
        return Err(AppError::Validation(format!(
            "{field} must be a positive amount"
        )));
    }
    Ok(())
}

/// Image/banner URLs must parse and use http(s).
pub fn validate_http_url(field: &str, raw: &str) -> Result<(), AppError> {
    let url = Url::parse(raw)
        .map_err(|_| AppError::Validation(format!("{field} is not a valid URL")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::Validation(format!(
            "{field} must use http or https"
        )));
    }
    Ok(())
}
