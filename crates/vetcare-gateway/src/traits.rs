// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The remote gateway seam.
//
// One method per remote capability. Implementations must never panic or
// return early with an error type: every outcome, good or bad, is reported
// through `OperationResult`.

use async_trait::async_trait;

use vetcare_core::result::OperationResult;
use vetcare_core::types::{
    CatalogEntry, ProviderId, ProviderType, RemovalAck, Service, ServiceDraft, ServiceId,
    ServicePatch,
};

/// Remote operations on a provider's services and the service catalog.
///
/// Each call performs exactly one remote request. Only the two list calls
/// are idempotent.
#[async_trait]
pub trait ServiceGateway: Send + Sync {
    /// `GET /catalogo/servicios/{providerType}`
    async fn list_catalog(&self, provider_type: ProviderType) -> OperationResult<Vec<CatalogEntry>>;

    /// `GET /prestadores/{id}/servicios`
    async fn list_provider_services(&self, provider_id: &ProviderId) -> OperationResult<Vec<Service>>;

    /// `POST /prestadores/{id}/servicios`
    async fn add_service(
        &self,
        provider_id: &ProviderId,
        draft: &ServiceDraft,
    ) -> OperationResult<Service>;

    /// `PUT /prestadores/{id}/servicios/{serviceId}`
    async fn update_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        patch: &ServicePatch,
    ) -> OperationResult<Service>;

    /// `DELETE /prestadores/{id}/servicios/{serviceId}`
    async fn remove_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
    ) -> OperationResult<RemovalAck>;

    /// `PATCH /prestadores/{id}/servicios/{serviceId}/estado` with `{ activo }`
    async fn toggle_active(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        active: bool,
    ) -> OperationResult<Service>;
}

/// Fallback messages used when the backend does not supply one.
pub mod fallback {
    pub const LIST_CATALOG: &str = "Could not load the service catalog";
    pub const LIST_SERVICES: &str = "Could not load the provider's services";
    pub const ADD_SERVICE: &str = "Could not add the service";
    pub const UPDATE_SERVICE: &str = "Could not update the service";
    pub const REMOVE_SERVICE: &str = "Could not remove the service";
    pub const TOGGLE_ACTIVE: &str = "Could not change the service availability";
}
