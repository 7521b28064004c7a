// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uniform outcome shape returned by every gateway call.
//
// On the wire (and for any JS-facing consumer) this serializes as
//   { "ok": true,  "data":  ... }
//   { "ok": false, "error": "..." }

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::VetcareError;

/// Broad category of a failure. Drives UI hints, never control flow inside
/// the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Request never reached the backend, or the response was lost.
    Network,
    /// Non-2xx response.
    Backend { status: u16 },
    /// 2xx response whose body did not match the expected shape.
    Decode,
    /// Reconciliation target missing from the local cache.
    NotFoundLocal,
    /// Local configuration or I/O problem.
    Internal,
}

impl FailureKind {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status } => Some(*status),
            _ => None,
        }
    }
}

/// A failed operation: its kind and the human-readable message shown to the
/// user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Fold an error into a failure.
    ///
    /// The backend's own message wins when it is present and non-blank;
    /// otherwise `fallback` is used so the user never sees transport jargon.
    pub fn from_error(err: &VetcareError, fallback: &str) -> Self {
        match err {
            VetcareError::Backend { status, message } => {
                let message = message
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(fallback);
                Self::new(FailureKind::Backend { status: *status }, message)
            }
            VetcareError::Network(_) => Self::new(FailureKind::Network, fallback),
            VetcareError::Decode(_) => Self::new(FailureKind::Decode, fallback),
            VetcareError::NotFoundLocal(_) => {
                Self::new(FailureKind::NotFoundLocal, err.to_string())
            }
            VetcareError::Config(_) | VetcareError::Io(_) | VetcareError::Serialization(_) => {
                Self::new(FailureKind::Internal, fallback)
            }
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Tagged outcome of a gateway call. The only channel for success/failure
/// information across the gateway boundary.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum OperationResult<T> {
    Success(T),
    Failure(Failure),
}

impl<T> OperationResult<T> {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure(Failure::new(kind, message))
    }

    /// Convert an internal `Result`, applying the operation's fallback
    /// message on error.
    pub fn from_result(result: crate::error::Result<T>, fallback: &str) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Failure(Failure::from_error(&e, fallback)),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(&f.message),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, Failure> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl<T: Serialize> Serialize for OperationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("OperationResult", 2)?;
        match self {
            Self::Success(data) => {
                s.serialize_field("ok", &true)?;
                s.serialize_field("data", data)?;
            }
            Self::Failure(failure) => {
                s.serialize_field("ok", &false)?;
                s.serialize_field("error", &failure.message)?;
            }
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_wins_over_fallback() {
        let err = VetcareError::Backend {
            status: 422,
            message: Some("Invalid price".into()),
        };
        let failure = Failure::from_error(&err, "Could not add the service");
        assert_eq!(failure.message, "Invalid price");
        assert_eq!(failure.kind, FailureKind::Backend { status: 422 });
    }

    #[test]
    fn blank_backend_message_uses_fallback() {
        let err = VetcareError::Backend {
            status: 500,
            message: Some("   ".into()),
        };
        let failure = Failure::from_error(&err, "Could not add the service");
        assert_eq!(failure.message, "Could not add the service");
    }

    #[test]
    fn network_error_hides_transport_detail() {
        let err = VetcareError::Network("connection refused (os error 111)".into());
        let failure = Failure::from_error(&err, "Could not load the provider's services");
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(failure.message, "Could not load the provider's services");
    }

    #[test]
    fn serializes_as_tagged_shape() {
        let ok: OperationResult<u32> = OperationResult::Success(7);
        assert_eq!(
            serde_json::to_value(&ok).expect("encode"),
            serde_json::json!({ "ok": true, "data": 7 })
        );

        let failed: OperationResult<u32> =
            OperationResult::failure(FailureKind::Network, "offline");
        assert_eq!(
            serde_json::to_value(&failed).expect("encode"),
            serde_json::json!({ "ok": false, "error": "offline" })
        );
    }

    #[test]
    fn ok_and_error_accessors() {
        let failed: OperationResult<u32> =
            OperationResult::failure(FailureKind::Decode, "bad body");
        assert_eq!(failed.error(), Some("bad body"));
        assert!(failed.ok().is_none());
    }
}
