// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process gateway for demo mode and tests.
//
// Behaves like the real backend as far as the client can tell: unknown
// providers and services answer 404, invalid drafts answer 400, ids are
// server-assigned. Failures can be injected and calls counted.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use vetcare_core::result::{Failure, FailureKind, OperationResult};
use vetcare_core::types::{
    CatalogEntry, ProviderId, ProviderType, RemovalAck, Service, ServiceDraft, ServiceId,
    ServicePatch,
};

use crate::traits::ServiceGateway;

#[derive(Default)]
struct Backend {
    catalog: HashMap<ProviderType, Vec<CatalogEntry>>,
    providers: HashMap<ProviderId, Vec<Service>>,
    injected: VecDeque<Failure>,
    calls: HashMap<&'static str, usize>,
}

/// Gateway that keeps everything in memory.
///
/// Clones share the same backend, so a test can keep one handle for
/// inspection while the store owns another.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    backend: Arc<Mutex<Backend>>,
    latency: Option<Duration>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before it touches the backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register a provider and replace its services.
    pub fn seed_services(&self, provider_id: impl Into<ProviderId>, services: Vec<Service>) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.providers.insert(provider_id.into(), services);
        }
    }

    pub fn seed_catalog(&self, provider_type: ProviderType, entries: Vec<CatalogEntry>) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.catalog.insert(provider_type, entries);
        }
    }

    /// Make the next call fail with `failure`, whatever it is. Queued
    /// failures are consumed in order.
    pub fn fail_next(&self, failure: Failure) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.injected.push_back(failure);
        }
    }

    /// How many times `operation` (e.g. `"add_service"`) was invoked.
    pub fn call_count(&self, operation: &str) -> usize {
        self.backend
            .lock()
            .map(|backend| backend.calls.get(operation).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Server-side copy of a provider's services.
    pub fn services_of(&self, provider_id: &ProviderId) -> Option<Vec<Service>> {
        self.backend
            .lock()
            .ok()
            .and_then(|backend| backend.providers.get(provider_id).cloned())
    }

    /// Count the call, wait out the latency, then run `op` against the
    /// backend unless a failure was injected. A poisoned backend answers
    /// with an internal failure.
    async fn call<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&mut Backend) -> OperationResult<T>,
    ) -> OperationResult<T> {
        if let Ok(mut backend) = self.backend.lock() {
            *backend.calls.entry(operation).or_default() += 1;
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let Ok(mut backend) = self.backend.lock() else {
            warn!(operation, "in-memory backend lock poisoned");
            return OperationResult::failure(FailureKind::Internal, BACKEND_UNAVAILABLE);
        };
        if let Some(failure) = backend.injected.pop_front() {
            debug!(operation, message = %failure.message, "injected failure");
            return OperationResult::Failure(failure);
        }
        op(&mut *backend)
    }
}

const BACKEND_UNAVAILABLE: &str = "Demo backend is unavailable";

fn not_found(what: &str) -> Failure {
    Failure::new(FailureKind::Backend { status: 404 }, format!("{what} not found"))
}

fn bad_request(message: &str) -> Failure {
    Failure::new(FailureKind::Backend { status: 400 }, message)
}

fn check_fields(name: Option<&str>, price: Option<f64>) -> Result<(), Failure> {
    if name.is_some_and(|name| name.trim().is_empty()) {
        return Err(bad_request("Name is required"));
    }
    if price.is_some_and(|price| !(price.is_finite() && price >= 0.0)) {
        return Err(bad_request("Invalid price"));
    }
    Ok(())
}

impl Backend {
    fn services_mut(&mut self, provider_id: &ProviderId) -> Result<&mut Vec<Service>, Failure> {
        self.providers
            .get_mut(provider_id)
            .ok_or_else(|| not_found("Provider"))
    }

    fn service_mut(
        &mut self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
    ) -> Result<&mut Service, Failure> {
        self.services_mut(provider_id)?
            .iter_mut()
            .find(|s| &s.id == service_id)
            .ok_or_else(|| not_found("Service"))
    }

    fn add(&mut self, provider_id: &ProviderId, draft: &ServiceDraft) -> Result<Service, Failure> {
        check_fields(Some(&draft.name), Some(draft.price))?;
        let service = Service {
            id: ServiceId::new(uuid::Uuid::new_v4().to_string()),
            name: draft.name.trim().to_string(),
            description: draft.description.clone(),
            price: draft.price,
            active: true,
            provider_id: Some(provider_id.clone()),
            duration_minutes: draft.duration_minutes,
            category: draft.category.clone(),
        };
        self.services_mut(provider_id)?.push(service.clone());
        Ok(service)
    }

    fn update(
        &mut self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        patch: &ServicePatch,
    ) -> Result<Service, Failure> {
        check_fields(patch.name.as_deref(), patch.price)?;
        let service = self.service_mut(provider_id, service_id)?;
        service.apply(patch);
        Ok(service.clone())
    }

    fn remove(
        &mut self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
    ) -> Result<RemovalAck, Failure> {
        let services = self.services_mut(provider_id)?;
        let before = services.len();
        services.retain(|s| &s.id != service_id);
        if services.len() == before {
            return Err(not_found("Service"));
        }
        Ok(RemovalAck {
            service_id: service_id.clone(),
            message: Some("Service removed".into()),
        })
    }
}

fn into_operation<T>(result: Result<T, Failure>) -> OperationResult<T> {
    match result {
        Ok(data) => OperationResult::Success(data),
        Err(failure) => OperationResult::Failure(failure),
    }
}

#[async_trait]
impl ServiceGateway for InMemoryGateway {
    async fn list_catalog(&self, provider_type: ProviderType) -> OperationResult<Vec<CatalogEntry>> {
        self.call("list_catalog", |backend| {
            OperationResult::Success(backend.catalog.get(&provider_type).cloned().unwrap_or_default())
        })
        .await
    }

    async fn list_provider_services(&self, provider_id: &ProviderId) -> OperationResult<Vec<Service>> {
        self.call("list_provider_services", |backend| {
            into_operation(backend.services_mut(provider_id).map(|services| services.clone()))
        })
        .await
    }

    async fn add_service(
        &self,
        provider_id: &ProviderId,
        draft: &ServiceDraft,
    ) -> OperationResult<Service> {
        self.call("add_service", |backend| into_operation(backend.add(provider_id, draft)))
            .await
    }

    async fn update_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        patch: &ServicePatch,
    ) -> OperationResult<Service> {
        self.call("update_service", |backend| {
            into_operation(backend.update(provider_id, service_id, patch))
        })
        .await
    }

    async fn remove_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
    ) -> OperationResult<RemovalAck> {
        self.call("remove_service", |backend| {
            into_operation(backend.remove(provider_id, service_id))
        })
        .await
    }

    async fn toggle_active(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        active: bool,
    ) -> OperationResult<Service> {
        self.call("toggle_active", |backend| {
            into_operation(backend.service_mut(provider_id, service_id).map(|service| {
                service.active = active;
                service.clone()
            }))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vaccination() -> Service {
        Service {
            id: "s1".into(),
            name: "Vaccination".into(),
            description: String::new(),
            price: 30.0,
            active: true,
            provider_id: Some("p1".into()),
            duration_minutes: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn unknown_provider_is_not_found() {
        let gateway = InMemoryGateway::new();
        let failure = gateway
            .list_provider_services(&ProviderId::from("p1"))
            .await
            .into_result()
            .expect_err("should fail");
        assert_eq!(failure.kind, FailureKind::Backend { status: 404 });
    }

    #[tokio::test]
    async fn add_assigns_id_and_persists() {
        let gateway = InMemoryGateway::new();
        gateway.seed_services("p1", vec![vaccination()]);

        let created = gateway
            .add_service(&"p1".into(), &ServiceDraft::new("Deworming").with_price(12.0))
            .await
            .ok()
            .expect("created");
        assert!(!created.id.as_str().is_empty());
        assert!(created.active);

        let stored = gateway.services_of(&"p1".into()).expect("provider");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1], created);
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let gateway = InMemoryGateway::new();
        gateway.seed_services("p1", Vec::new());

        let result = gateway
            .add_service(&"p1".into(), &ServiceDraft::new("Deworming").with_price(-1.0))
            .await;
        assert_eq!(result.error(), Some("Invalid price"));
        assert_eq!(gateway.services_of(&"p1".into()).map(|s| s.len()), Some(0));
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let gateway = InMemoryGateway::new();
        gateway.seed_services("p1", vec![vaccination()]);
        gateway.fail_next(Failure::new(FailureKind::Network, "offline"));

        let first = gateway.list_provider_services(&"p1".into()).await;
        let second = gateway.list_provider_services(&"p1".into()).await;
        assert_eq!(first.error(), Some("offline"));
        assert!(second.is_ok());
        assert_eq!(gateway.call_count("list_provider_services"), 2);
    }

    #[tokio::test]
    async fn remove_missing_service_is_not_found() {
        let gateway = InMemoryGateway::new();
        gateway.seed_services("p1", vec![vaccination()]);

        let result = gateway.remove_service(&"p1".into(), &"nope".into()).await;
        assert_eq!(result.error(), Some("Service not found"));
    }

    #[tokio::test]
    async fn poisoned_backend_fails_instead_of_panicking() {
        let gateway = InMemoryGateway::new();
        gateway.seed_services("p1", vec![vaccination()]);

        let backend = Arc::clone(&gateway.backend);
        let _ = std::thread::spawn(move || {
            let _guard = backend.lock().expect("lock");
            panic!("poison the backend lock");
        })
        .join();

        let failure = gateway
            .list_provider_services(&"p1".into())
            .await
            .into_result()
            .expect_err("should fail");
        assert_eq!(failure.kind, FailureKind::Internal);
        assert_eq!(failure.message, BACKEND_UNAVAILABLE);

        // Inspection helpers degrade instead of panicking.
        assert_eq!(gateway.call_count("list_provider_services"), 0);
        assert!(gateway.services_of(&"p1".into()).is_none());
    }
}
