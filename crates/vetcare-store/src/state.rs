// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Store state and the reconciliation rules applied after each gateway call.

use chrono::{DateTime, Utc};

use vetcare_core::error::VetcareError;
use vetcare_core::result::{Failure, FailureKind};
use vetcare_core::types::{CatalogEntry, ProviderId, ProviderType, Service, ServiceId};

/// Everything the UI renders from. Only the store mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// The cached provider's services, in server/insertion order.
    pub services: Vec<Service>,
    /// Catalog templates for the most recently requested provider type.
    pub available_services: Vec<CatalogEntry>,
    /// True while an operation is in flight.
    pub is_loading: bool,
    /// Message of the last failed operation, until cleared.
    pub error: Option<String>,
    pub error_kind: Option<FailureKind>,
    /// Provider whose services are cached.
    pub provider: Option<ProviderId>,
    /// Provider type whose catalog is cached.
    pub provider_type: Option<ProviderType>,
    /// When `services` was last replaced by a successful fetch.
    pub last_synced: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Entry into `loading`: the previous error is forgotten.
    pub(crate) fn begin(&mut self) {
        self.error = None;
        self.error_kind = None;
        self.is_loading = true;
    }

    pub(crate) fn fail(&mut self, failure: &Failure) {
        self.error = Some(failure.message.clone());
        self.error_kind = Some(failure.kind);
    }

    /// The last failure, rebuilt for `humanize_failure`.
    pub fn failure(&self) -> Option<Failure> {
        match (&self.error, self.error_kind) {
            (Some(message), Some(kind)) => Some(Failure::new(kind, message.clone())),
            (Some(message), None) => Some(Failure::new(FailureKind::Internal, message.clone())),
            _ => None,
        }
    }

    /// Whether a mutation for `provider_id` may touch `services`.
    ///
    /// An empty, unbound cache adopts the first provider written to it.
    pub(crate) fn accepts(&mut self, provider_id: &ProviderId) -> bool {
        match self.provider {
            Some(ref cached) => cached == provider_id,
            None => {
                self.provider = Some(provider_id.clone());
                true
            }
        }
    }

    pub fn service(&self, service_id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| &s.id == service_id)
    }
}

/// Replace the element whose id is `service_id`. Position is irrelevant;
/// every other element is left untouched.
pub fn replace_by_id(
    services: &mut [Service],
    service_id: &ServiceId,
    updated: Service,
) -> Result<(), VetcareError> {
    let slot = services
        .iter_mut()
        .find(|s| &s.id == service_id)
        .ok_or_else(|| VetcareError::NotFoundLocal(service_id.clone()))?;
    *slot = updated;
    Ok(())
}

/// Drop every element whose id is `service_id`. Returns whether anything
/// was removed.
pub fn remove_by_id(services: &mut Vec<Service>, service_id: &ServiceId) -> bool {
    let before = services.len();
    services.retain(|s| &s.id != service_id);
    services.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(id: &str, price: f64) -> Service {
        Service {
            id: id.into(),
            name: format!("service {id}"),
            description: String::new(),
            price,
            active: true,
            provider_id: None,
            duration_minutes: None,
            category: None,
        }
    }

    #[test]
    fn replace_matches_by_id_not_position() {
        let mut services = vec![service("a", 1.0), service("b", 2.0), service("c", 3.0)];
        let original = services.clone();

        replace_by_id(&mut services, &"b".into(), service("b", 20.0)).expect("replace");

        assert_eq!(services[1].price, 20.0);
        assert_eq!(services[0], original[0]);
        assert_eq!(services[2], original[2]);
    }

    #[test]
    fn replace_missing_target_is_not_found_local() {
        let mut services = vec![service("a", 1.0)];
        let result = replace_by_id(&mut services, &"zz".into(), service("zz", 9.0));
        assert!(matches!(result, Err(VetcareError::NotFoundLocal(_))));
        assert_eq!(services, vec![service("a", 1.0)]);
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut services = vec![service("a", 1.0), service("b", 2.0)];
        assert!(remove_by_id(&mut services, &"a".into()));
        assert!(!remove_by_id(&mut services, &"a".into()));
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn begin_clears_error_and_sets_loading() {
        let mut state = StoreState::default();
        state.fail(&Failure::new(FailureKind::Network, "offline"));
        state.begin();
        assert!(state.is_loading);
        assert!(state.error.is_none());
        assert!(state.failure().is_none());
    }

    #[test]
    fn unbound_cache_adopts_first_provider() {
        let mut state = StoreState::default();
        assert!(state.accepts(&"p1".into()));
        assert!(state.accepts(&"p1".into()));
        assert!(!state.accepts(&"p2".into()));
    }
}
