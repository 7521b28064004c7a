// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service cache store — sequences loading state, delegates to the gateway,
// and reconciles the cached collections from the uniform result.
//
// Every operation follows the same machine:
//   idle → loading → {success, failure} → idle
// and holds the single-flight guard from entry to reconciliation, so two
// operations on one store never interleave. Queued operations run in the
// order they were issued.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use vetcare_core::result::{Failure, FailureKind, OperationResult};
use vetcare_core::types::{
    CatalogEntry, ProviderId, ProviderType, RemovalAck, Service, ServiceDraft, ServiceId,
    ServicePatch,
};
use vetcare_gateway::ServiceGateway;

use crate::state::{StoreState, remove_by_id, replace_by_id};

/// Receiving end of the store's state channel.
pub type StateReceiver = watch::Receiver<StoreState>;

/// Cached view of one provider's services plus the catalog of addable ones.
///
/// Cheaply cloneable: clones share state, gateway and flight guard, so the
/// handle can be moved into UI closures and spawned tasks.
#[derive(Clone)]
pub struct ServiceStore {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn ServiceGateway>,
    state: watch::Sender<StoreState>,
    /// Held by the in-flight operation until its result is applied.
    flight: Arc<Mutex<()>>,
}

impl ServiceStore {
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                state: watch::Sender::new(StoreState::default()),
                flight: Arc::new(Mutex::new(())),
            }),
        }
    }

    // -- Read side -----------------------------------------------------------

    /// Receive every state change. The receiver starts at the current state.
    pub fn subscribe(&self) -> StateReceiver {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    pub fn services(&self) -> Vec<Service> {
        self.inner.state.borrow().services.clone()
    }

    pub fn available_services(&self) -> Vec<CatalogEntry> {
        self.inner.state.borrow().available_services.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    pub fn last_failure(&self) -> Option<Failure> {
        self.inner.state.borrow().failure()
    }

    /// Dismiss the current error. The only way to clear it besides starting
    /// another operation.
    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|state| {
            if state.error.is_none() {
                return false;
            }
            state.error = None;
            state.error_kind = None;
            true
        });
    }

    // -- Operations ----------------------------------------------------------

    /// Fetch a provider's services and replace the cache wholesale.
    pub async fn get_provider_services(&self, provider_id: &ProviderId) -> Option<Vec<Service>> {
        let gateway = Arc::clone(&self.inner.gateway);
        let id = provider_id.clone();
        let call = async move { gateway.list_provider_services(&id).await };

        let provider_id = provider_id.clone();
        self.run("get_provider_services", call, move |state, services: &Vec<Service>| {
            state.services = services.clone();
            state.provider = Some(provider_id);
            state.last_synced = Some(Utc::now());
            Ok(())
        })
        .await
    }

    /// Fetch the catalog for a provider type and replace `available_services`.
    pub async fn get_available_services(
        &self,
        provider_type: ProviderType,
    ) -> Option<Vec<CatalogEntry>> {
        let gateway = Arc::clone(&self.inner.gateway);
        let call = async move { gateway.list_catalog(provider_type).await };

        self.run("get_available_services", call, move |state, entries: &Vec<CatalogEntry>| {
            state.available_services = entries.clone();
            state.provider_type = Some(provider_type);
            Ok(())
        })
        .await
    }

    /// Create a service and append it to the cache. No dedupe by id.
    pub async fn add_service_to_provider(
        &self,
        provider_id: &ProviderId,
        draft: &ServiceDraft,
    ) -> Option<Service> {
        let gateway = Arc::clone(&self.inner.gateway);
        let (id, draft) = (provider_id.clone(), draft.clone());
        let call = async move { gateway.add_service(&id, &draft).await };

        let provider_id = provider_id.clone();
        self.run("add_service_to_provider", call, move |state, created: &Service| {
            if state.accepts(&provider_id) {
                state.services.push(created.clone());
            } else {
                debug!(provider = %provider_id, "add for a provider that is not cached");
            }
            Ok(())
        })
        .await
    }

    /// Update a service and replace the cached element with the same id.
    ///
    /// If the cached collection has no such element the operation fails with
    /// a local not-found error and the cache is left as it was.
    pub async fn update_provider_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        patch: &ServicePatch,
    ) -> Option<Service> {
        let gateway = Arc::clone(&self.inner.gateway);
        let (id, sid, patch) = (provider_id.clone(), service_id.clone(), patch.clone());
        let call = async move { gateway.update_service(&id, &sid, &patch).await };

        let (provider_id, service_id) = (provider_id.clone(), service_id.clone());
        self.run("update_provider_service", call, move |state, updated: &Service| {
            reconcile_update(state, &provider_id, &service_id, updated)
        })
        .await
    }

    /// Remove a service and drop it from the cache. Removing something the
    /// cache no longer holds is not an error.
    pub async fn remove_provider_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
    ) -> Option<RemovalAck> {
        let gateway = Arc::clone(&self.inner.gateway);
        let (id, sid) = (provider_id.clone(), service_id.clone());
        let call = async move { gateway.remove_service(&id, &sid).await };

        let (provider_id, service_id) = (provider_id.clone(), service_id.clone());
        self.run("remove_provider_service", call, move |state, _ack: &RemovalAck| {
            if state.accepts(&provider_id) && !remove_by_id(&mut state.services, &service_id) {
                debug!(service = %service_id, "removed service was not cached");
            }
            Ok(())
        })
        .await
    }

    /// Switch a service on or off. Reconciles like an update.
    pub async fn update_service_availability(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        active: bool,
    ) -> Option<Service> {
        let gateway = Arc::clone(&self.inner.gateway);
        let (id, sid) = (provider_id.clone(), service_id.clone());
        let call = async move { gateway.toggle_active(&id, &sid, active).await };

        let (provider_id, service_id) = (provider_id.clone(), service_id.clone());
        self.run("update_service_availability", call, move |state, updated: &Service| {
            reconcile_update(state, &provider_id, &service_id, updated)
        })
        .await
    }

    /// Drive one operation through the state machine.
    ///
    /// Waiting for the flight guard happens in the caller's future, so a
    /// caller dropped while queued issues nothing. Once the guard is held the
    /// call and its reconciliation run on a detached task: dropping the
    /// caller from then on loses only the return value.
    ///
    /// `reconcile` runs only on gateway success; if it reports a failure the
    /// cache must be unchanged and the operation counts as failed.
    async fn run<T, C, R>(&self, operation: &'static str, call: C, reconcile: R) -> Option<T>
    where
        T: Send + 'static,
        C: Future<Output = OperationResult<T>> + Send + 'static,
        R: FnOnce(&mut StoreState, &T) -> Result<(), Failure> + Send + 'static,
    {
        let flight = Arc::clone(&self.inner.flight).lock_owned().await;

        self.inner.state.send_modify(StoreState::begin);
        debug!(operation, "store operation started");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _flight = flight;
            let outcome = call.await;
            inner.settle(operation, outcome, reconcile)
        });

        match task.await {
            Ok(returned) => returned,
            Err(e) => {
                error!(operation, error = %e, "store operation aborted");
                self.inner.state.send_modify(|state| {
                    state.fail(&Failure::new(FailureKind::Internal, e.to_string()));
                    state.is_loading = false;
                });
                None
            }
        }
    }
}

impl Inner {
    /// Apply a finished call to the state and leave `loading`.
    fn settle<T>(
        &self,
        operation: &'static str,
        outcome: OperationResult<T>,
        reconcile: impl FnOnce(&mut StoreState, &T) -> Result<(), Failure>,
    ) -> Option<T> {
        let mut returned = None;
        let mut failed = None;
        self.state.send_modify(|state| {
            match outcome {
                OperationResult::Success(data) => match reconcile(state, &data) {
                    Ok(()) => returned = Some(data),
                    Err(failure) => {
                        state.fail(&failure);
                        failed = Some(failure);
                    }
                },
                OperationResult::Failure(failure) => {
                    state.fail(&failure);
                    failed = Some(failure);
                }
            }
            state.is_loading = false;
        });

        match failed {
            Some(failure) => warn!(operation, kind = ?failure.kind, error = %failure.message, "store operation failed"),
            None => info!(operation, "store operation succeeded"),
        }
        returned
    }
}

fn reconcile_update(
    state: &mut StoreState,
    provider_id: &ProviderId,
    service_id: &ServiceId,
    updated: &Service,
) -> Result<(), Failure> {
    if !state.accepts(provider_id) {
        debug!(provider = %provider_id, "update for a provider that is not cached");
        return Ok(());
    }
    replace_by_id(&mut state.services, service_id, updated.clone()).map_err(|e| {
        warn!(service = %service_id, "updated service missing from cache");
        Failure::new(FailureKind::NotFoundLocal, e.to_string())
    })
}
