// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Vetcare provider service catalog.
//
// The backend speaks Spanish-keyed JSON (`nombre`, `precio`, `activo`, ...),
// so wire names are mapped with serde attributes while the Rust side keeps
// English field names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VetcareError;

/// Identifier of a veterinary service provider (vet or clinic).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Opaque server-assigned identifier of a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Kind of provider a catalog is curated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "veterinario")]
    Veterinarian,
    #[serde(rename = "clinica")]
    Clinic,
}

impl ProviderType {
    /// Path segment used by `GET /catalogo/servicios/{providerType}`.
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            Self::Veterinarian => "veterinario",
            Self::Clinic => "clinica",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

impl FromStr for ProviderType {
    type Err = VetcareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "veterinario" | "veterinarian" | "vet" => Ok(Self::Veterinarian),
            "clinica" | "clínica" | "clinic" => Ok(Self::Clinic),
            other => Err(VetcareError::Config(format!("unknown provider type: {other}"))),
        }
    }
}

fn default_active() -> bool {
    true
}

/// A service offered by a specific provider.
///
/// The canonical copy lives server-side; the store only caches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(alias = "_id")]
    pub id: ServiceId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "precio", default)]
    pub price: f64,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
    #[serde(rename = "prestadorId", default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    /// Expected duration of the appointment, in minutes.
    #[serde(rename = "duracion", default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Service {
    /// Apply a patch locally, field by field.
    pub fn apply(&mut self, patch: &ServicePatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(duration) = patch.duration_minutes {
            self.duration_minutes = Some(duration);
        }
        if let Some(ref category) = patch.category {
            self.category = Some(category.clone());
        }
    }
}

/// A template service offered for a provider type, not yet bound to a
/// provider. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(alias = "_id")]
    pub id: ServiceId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "precioSugerido", default, skip_serializing_if = "Option::is_none")]
    pub suggested_price: Option<f64>,
    #[serde(rename = "tipoPrestador", default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<ProviderType>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Input for creating a service under a provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceDraft {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "precio", default)]
    pub price: f64,
    #[serde(rename = "duracion", default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Catalog template this draft was created from, if any.
    #[serde(rename = "servicioCatalogoId", default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<ServiceId>,
}

impl ServiceDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Pre-fill a draft from a catalog template. The price starts at the
    /// suggested price, or zero when the catalog has none.
    pub fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            price: entry.suggested_price.unwrap_or(0.0),
            duration_minutes: None,
            category: entry.category.clone(),
            catalog_id: Some(entry.id.clone()),
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }
}

/// Partial update of a service. Absent fields are left out of the request
/// body and untouched server-side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServicePatch {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "precio", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "activo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "duracion", default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ServicePatch {
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Default::default()
        }
    }
}

/// Confirmation returned when a service is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalAck {
    pub service_id: ServiceId,
    /// Message supplied by the backend, if any.
    pub message: Option<String>,
}
