// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use vetcare_core::human_errors::{HumanError, humanize_failure};
use vetcare_core::types::{ProviderId, ProviderType};
use vetcare_store::StoreState;

use crate::services::app_services::AppServices;

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Latest snapshot published by the service store.
    pub store: StoreState,
    /// Provider this session manages.
    pub provider_id: ProviderId,
    pub provider_type: ProviderType,
}

impl AppState {
    /// Create initial state from the backend services.
    pub fn new(svc: &AppServices) -> Self {
        Self {
            store: svc.snapshot(),
            provider_id: svc.provider_id().clone(),
            provider_type: svc.provider_type(),
        }
    }

    /// The store's last failure, phrased for the user.
    pub fn human_error(&self) -> Option<HumanError> {
        self.store.failure().as_ref().map(humanize_failure)
    }
}
