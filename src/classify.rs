//! Registration classification.
//!
//! Authority-issued registrations carry the `SD-B` prefix followed by an
//! alphanumeric serial block (`SD-B001`, `SD-B7Q2`). Anything else, including
//! an empty string, a bare prefix, or a differently-cased prefix, is treated
//! as unauthorized. Every authorized/unauthorized split in the crate goes
//! through [`is_authorized`].

/// Prefix issued by the registration authority.
pub const AUTHORIZED_PREFIX: &str = "SD-B";

/// Returns true when `registration` is a well-formed authority registration.
pub fn is_authorized(registration: &str) -> bool {
    match registration.strip_prefix(AUTHORIZED_PREFIX) {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Classification label used in logs and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Authorized,
    Unauthorized,
}

impl Class {
    pub fn of(registration: &str) -> Self {
        if is_authorized(registration) {
            Class::Authorized
        } else {
            Class::Unauthorized
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Class::Authorized => "authorized",
            Class::Unauthorized => "unauthorized",
        }
    }
}
