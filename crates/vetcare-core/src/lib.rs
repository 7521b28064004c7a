// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vetcare — Core types, results and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod result;
pub mod types;

pub use config::ClientConfig;
pub use error::VetcareError;
pub use result::{Failure, FailureKind, OperationResult};
pub use types::*;
