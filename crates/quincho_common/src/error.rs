// --- File: crates/quincho_common/src/error.rs ---
use crate::models::SlotTime;
use std::fmt;
use thiserror::Error;

/// The shared error taxonomy for the Quincho reservation system.
///
/// Validation and past-date/past-time rejections are recovered locally and
/// never reach the store; slot conflicts carry only the conflicting time
/// range (never another user's details); store failures propagate as-is;
/// notification failures are logged by callers and never propagated as a
/// failure of the triggering mutation.
#[derive(Error, Debug)]
pub enum QuinchoError {
    /// A field-level validation failure, surfaced per-field to the caller.
    #[error("validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// The requested date is in the past (date-only comparison).
    #[error("reservations cannot be made for past dates")]
    PastDate,

    /// The requested start time has already passed on today's date.
    #[error("reservations cannot be made for past times")]
    PastTime,

    /// The slot conflicts with an existing reservation or blocked period.
    #[error("the slot {start}-{end} is not available")]
    SlotUnavailable { start: SlotTime, end: SlotTime },

    /// A record addressed by id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent write beat this one to the slot (storage constraint).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The external store read/write failed.
    #[error("store error: {0}")]
    Store(String),

    /// Authentication or authorization failure.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Email dispatch failed. Logged, never propagated to the mutation.
    #[error("notification error: {0}")]
    Notification(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything that does not fit the categories above.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for QuinchoError {
    fn status_code(&self) -> u16 {
        match self {
            QuinchoError::Validation { .. } => 400,
            QuinchoError::PastDate => 400,
            QuinchoError::PastTime => 400,
            QuinchoError::SlotUnavailable { .. } => 409,
            QuinchoError::NotFound(_) => 404,
            QuinchoError::Conflict(_) => 409,
            QuinchoError::Store(_) => 502,
            QuinchoError::Auth(_) => 401,
            QuinchoError::Notification(_) => 502,
            QuinchoError::Config(_) => 500,
            QuinchoError::Internal(_) => 500,
        }
    }
}

// Utility constructors, mirroring how call sites build errors.
pub fn validation_error<F: fmt::Display, M: fmt::Display>(field: F, message: M) -> QuinchoError {
    QuinchoError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

pub fn store_error<T: fmt::Display>(message: T) -> QuinchoError {
    QuinchoError::Store(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> QuinchoError {
    QuinchoError::NotFound(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> QuinchoError {
    QuinchoError::Conflict(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> QuinchoError {
    QuinchoError::Auth(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> QuinchoError {
    QuinchoError::Config(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> QuinchoError {
    QuinchoError::Internal(message.to_string())
}
