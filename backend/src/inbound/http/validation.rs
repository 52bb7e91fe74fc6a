//! Shared validation helpers for the inbound HTTP adapter.
//!
//! Request DTOs are parsed into domain newtypes before any store access;
//! these helpers turn the newtype validation failures into the API's
//! `{"error": "validation error", "details": …}` envelope.

use crate::domain::Error;

/// Build the standard validation failure with specific detail text.
pub(crate) fn validation_error(details: impl std::fmt::Display) -> Error {
    Error::invalid_request("validation error").with_details(details.to_string())
}
