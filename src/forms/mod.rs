//! Request parameter parsing: string-keyed form data into typed, validated inputs.

pub mod event_protection;
pub mod params;

use thiserror::Error;

pub use event_protection::{EventProtectionForm, PrivilegeField};
pub use params::*;

/// User-correctable input problem, reported against the offending field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
