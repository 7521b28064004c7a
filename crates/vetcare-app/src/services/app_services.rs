// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads settings, builds the gateway and the service
// store, and offers session-scoped methods for the Dioxus UI to call.
//
// The store is the only thing allowed to mutate service state; pages go
// through these methods and render what the store publishes.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vetcare_core::config::ClientConfig;
use vetcare_core::error::Result;
use vetcare_core::types::{
    CatalogEntry, ProviderId, ProviderType, Service, ServiceDraft, ServiceId,
};
use vetcare_gateway::{HttpGateway, InMemoryGateway, ServiceGateway};
use vetcare_store::{ServiceStore, StateReceiver, StoreState};

use super::data_dir;

/// Settings persisted in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(flatten)]
    pub client: ClientConfig,
    /// Provider whose services this device manages.
    pub provider_id: ProviderId,
    pub provider_type: ProviderType,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            provider_id: ProviderId::from("demo"),
            provider_type: ProviderType::Veterinarian,
        }
    }
}

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
#[derive(Clone)]
pub struct AppServices {
    store: ServiceStore,
    settings: AppSettings,
}

impl AppServices {
    /// Initialise from the data directory. Call once at app startup.
    ///
    /// Writes default settings on first launch so they can be edited.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");

        let settings = match load_settings(&dir) {
            Some(settings) => settings,
            None => {
                let defaults = AppSettings::default();
                if let Err(e) = persist_settings(&dir, &defaults) {
                    warn!(error = %e, "could not write default settings");
                }
                defaults
            }
        };

        Self::with_settings(settings)
    }

    /// Build services from explicit settings. `VETCARE_API_URL` still wins
    /// over the configured base URL.
    pub fn with_settings(mut settings: AppSettings) -> Result<Self> {
        settings.client = settings.client.with_env_overrides();
        let gateway = build_gateway(&settings)?;

        info!(
            provider = %settings.provider_id,
            demo = settings.client.demo_mode,
            "app services initialised"
        );

        Ok(Self {
            store: ServiceStore::new(gateway),
            settings,
        })
    }

    /// In-memory demo services, used when real initialisation fails.
    pub fn demo() -> Self {
        let settings = AppSettings::default();
        let gateway = demo_gateway(&settings.provider_id);
        Self {
            store: ServiceStore::new(Arc::new(gateway)),
            settings,
        }
    }

    // -- Session -------------------------------------------------------------

    pub fn provider_id(&self) -> &ProviderId {
        &self.settings.provider_id
    }

    pub fn provider_type(&self) -> ProviderType {
        self.settings.provider_type
    }

    // -- Store ---------------------------------------------------------------

    pub fn snapshot(&self) -> StoreState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> StateReceiver {
        self.store.subscribe()
    }

    pub async fn refresh_services(&self) -> Option<Vec<Service>> {
        self.store.get_provider_services(&self.settings.provider_id).await
    }

    pub async fn load_catalog(&self) -> Option<Vec<CatalogEntry>> {
        self.store.get_available_services(self.settings.provider_type).await
    }

    pub async fn add_from_catalog(&self, entry: &CatalogEntry) -> Option<Service> {
        let draft = ServiceDraft::from_catalog(entry);
        self.store
            .add_service_to_provider(&self.settings.provider_id, &draft)
            .await
    }

    pub async fn set_availability(&self, service_id: &ServiceId, active: bool) -> Option<Service> {
        self.store
            .update_service_availability(&self.settings.provider_id, service_id, active)
            .await
    }

    pub async fn remove(&self, service_id: &ServiceId) -> bool {
        self.store
            .remove_provider_service(&self.settings.provider_id, service_id)
            .await
            .is_some()
    }

    pub fn clear_error(&self) {
        self.store.clear_error();
    }
}

fn build_gateway(settings: &AppSettings) -> Result<Arc<dyn ServiceGateway>> {
    if settings.client.demo_mode {
        info!("demo mode, using in-memory gateway");
        Ok(Arc::new(demo_gateway(&settings.provider_id)))
    } else {
        Ok(Arc::new(HttpGateway::new(&settings.client)?))
    }
}

/// In-memory backend with a small catalog and two services for `provider_id`.
fn demo_gateway(provider_id: &ProviderId) -> InMemoryGateway {
    let gateway = InMemoryGateway::new();

    let entry = |id: &str, name: &str, price: f64, category: &str| CatalogEntry {
        id: ServiceId::from(id),
        name: name.into(),
        description: String::new(),
        suggested_price: Some(price),
        provider_type: None,
        category: Some(category.into()),
    };
    gateway.seed_catalog(
        ProviderType::Veterinarian,
        vec![
            entry("cat-vacc", "Vaccination", 30.0, "preventive"),
            entry("cat-deworm", "Deworming", 12.0, "preventive"),
            entry("cat-consult", "General consultation", 25.0, "consultation"),
            entry("cat-emerg", "Emergency visit", 90.0, "emergency"),
        ],
    );
    gateway.seed_catalog(
        ProviderType::Clinic,
        vec![
            entry("cat-xray", "X-ray", 120.0, "diagnostics"),
            entry("cat-dental", "Dental cleaning", 80.0, "surgery"),
            entry("cat-neuter", "Spay / neuter", 150.0, "surgery"),
        ],
    );

    let service = |id: &str, name: &str, price: f64, minutes: u32| Service {
        id: ServiceId::from(id),
        name: name.into(),
        description: String::new(),
        price,
        active: true,
        provider_id: Some(provider_id.clone()),
        duration_minutes: Some(minutes),
        category: None,
    };
    gateway.seed_services(
        provider_id.clone(),
        vec![
            service("svc-1", "General consultation", 25.0, 30),
            service("svc-2", "Vaccination", 30.0, 15),
        ],
    );

    gateway
}

// -- Settings file persistence -----------------------------------------------

const SETTINGS_FILE: &str = "config.json";

fn load_settings(data_dir: &Path) -> Option<AppSettings> {
    let path = data_dir.join(SETTINGS_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            None
        }
    }
}

fn persist_settings(data_dir: &Path, settings: &AppSettings) -> Result<()> {
    let path = data_dir.join(SETTINGS_FILE);
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = AppSettings {
            client: ClientConfig {
                base_url: "https://vets.example/api".into(),
                auth_token: Some("t0ken".into()),
                ..Default::default()
            },
            provider_id: ProviderId::from("clinic-42"),
            provider_type: ProviderType::Clinic,
        };

        persist_settings(dir.path(), &settings).expect("persist");
        assert_eq!(load_settings(dir.path()), Some(settings));
    }

    #[test]
    fn settings_file_is_flat_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        persist_settings(dir.path(), &AppSettings::default()).expect("persist");

        let raw = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["provider_type"], "veterinario");
        assert!(value.get("base_url").is_some());
    }

    #[test]
    fn missing_or_corrupt_settings_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_settings(dir.path()).is_none());

        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").expect("write");
        assert!(load_settings(dir.path()).is_none());
    }

    #[test]
    fn invalid_base_url_fails_initialisation() {
        let settings = AppSettings {
            client: ClientConfig {
                base_url: "vets.example".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        // Only meaningful when the override is not set in the test env.
        if std::env::var(vetcare_core::config::API_URL_ENV).is_err() {
            assert!(AppServices::with_settings(settings).is_err());
        }
    }

    #[tokio::test]
    async fn demo_session_manages_seeded_services() {
        let svc = AppServices::demo();

        let services = svc.refresh_services().await.expect("services");
        assert_eq!(services.len(), 2);

        let catalog = svc.load_catalog().await.expect("catalog");
        let deworming = catalog
            .iter()
            .find(|e| e.name == "Deworming")
            .expect("deworming in catalog");
        let added = svc.add_from_catalog(deworming).await.expect("added");
        assert_eq!(added.price, 12.0);

        assert!(svc.set_availability(&added.id, false).await.is_some());
        assert!(svc.remove(&ServiceId::from("svc-1")).await);

        let state = svc.snapshot();
        assert_eq!(state.services.len(), 2);
        assert!(state.services.iter().any(|s| s.id == added.id && !s.active));
        assert!(state.error.is_none());
    }
}
