// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Vetcare.

use thiserror::Error;

use crate::types::ServiceId;

/// Top-level error type for Vetcare operations.
///
/// These never cross the gateway boundary as-is: the gateway folds them into
/// an [`OperationResult`](crate::result::OperationResult) failure.
#[derive(Debug, Error)]
pub enum VetcareError {
    // -- Remote API --
    /// The request never reached the backend or no response came back.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Backend {
        status: u16,
        message: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),

    // -- Local cache --
    /// Reconciliation target is not present in the cached collection.
    #[error("service {0} is not in the cached list")]
    NotFoundLocal(ServiceId),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VetcareError>;
