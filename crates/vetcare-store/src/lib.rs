// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vetcare Store — in-memory cache of a provider's services with loading and
// error state for the UI. One store instance per provider session; inject it,
// don't share it globally.

pub mod state;
pub mod store;

pub use state::StoreState;
pub use store::{ServiceStore, StateReceiver};
