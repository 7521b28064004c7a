// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vetcare Gateway — translates provider-service operations into calls against
// the Vetcare REST API and folds every outcome into an `OperationResult`.
// Nothing escapes this crate as an error or a panic.

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;
pub use traits::ServiceGateway;
