// src/store/mod.rs

pub mod user_repository;

pub use user_repository::UserRepository;

use std::fmt;

use argon2::password_hash;

/// Typed failures surfaced by the repository.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected before touching the database.
    Validation(String),

    /// No matching user or friendship edge.
    NotFound,

    /// The email is already registered.
    DuplicateEmail(String),

    /// An edge for this ordered pair already exists.
    AlreadyRequested,

    /// Password hashing failed.
    Credential(password_hash::Error),

    /// Any other storage failure.
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "{}", msg),
            StoreError::NotFound => write!(f, "Record not found"),
            StoreError::DuplicateEmail(email) => {
                write!(f, "Email '{}' is already registered", email)
            }
            StoreError::AlreadyRequested => write!(f, "Friend request was already sent"),
            StoreError::Credential(e) => write!(f, "password hashing failed: {}", e),
            StoreError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<password_hash::Error> for StoreError {
    fn from(err: password_hash::Error) -> Self {
        StoreError::Credential(err)
    }
}

/// True when `err` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
