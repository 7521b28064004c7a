// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP gateway for the Vetcare REST API.
//
// Endpoints (relative to `ClientConfig::base_url`):
//   - GET    /catalogo/servicios/{providerType}
//   - GET    /prestadores/{id}/servicios
//   - POST   /prestadores/{id}/servicios
//   - PUT    /prestadores/{id}/servicios/{serviceId}
//   - DELETE /prestadores/{id}/servicios/{serviceId}
//   - PATCH  /prestadores/{id}/servicios/{serviceId}/estado   body { activo }
//
// Bodies are accepted bare or wrapped in `{ "data": ... }`. Error bodies may
// carry `message`, `mensaje` or `error`.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use vetcare_core::config::ClientConfig;
use vetcare_core::error::{Result, VetcareError};
use vetcare_core::result::OperationResult;
use vetcare_core::types::{
    CatalogEntry, ProviderId, ProviderType, RemovalAck, Service, ServiceDraft, ServiceId,
    ServicePatch,
};

use crate::traits::{ServiceGateway, fallback};

/// Gateway backed by a single pooled `reqwest::Client`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    /// Build a gateway from validated configuration.
    ///
    /// The request timeout, user agent and bearer token are baked into the
    /// underlying client.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let base = Url::parse(config.base_url.trim())
            .map_err(|e| VetcareError::Config(format!("invalid base_url '{}': {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(VetcareError::Config(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(ref token) = config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| VetcareError::Config(format!("invalid auth token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| VetcareError::Config(format!("failed to create HTTP client: {e}")))?;

        info!(base = %base, "HTTP gateway ready");
        Ok(Self { client, base })
    }

    /// Resolve an endpoint from path segments. Segments are percent-encoded,
    /// so ids containing `/` or spaces cannot escape their slot.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| VetcareError::Config("base_url cannot carry a path".into()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn services_url(&self, provider_id: &ProviderId) -> Result<Url> {
        self.endpoint(&["prestadores", provider_id.as_str(), "servicios"])
    }

    fn service_url(&self, provider_id: &ProviderId, service_id: &ServiceId) -> Result<Url> {
        self.endpoint(&[
            "prestadores",
            provider_id.as_str(),
            "servicios",
            service_id.as_str(),
        ])
    }

    /// Send the request and return the raw body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                VetcareError::Network(format!("request timed out: {e}"))
            } else {
                VetcareError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| VetcareError::Network(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(VetcareError::Backend {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.execute(request).await?;
        decode_body(&body)
    }

    #[instrument(skip(self))]
    async fn try_list_catalog(&self, provider_type: ProviderType) -> Result<Vec<CatalogEntry>> {
        let url = self.endpoint(&["catalogo", "servicios", provider_type.as_path_segment()])?;
        debug!(%url, "GET catalog");
        let entries: Vec<CatalogEntry> = self.fetch(self.client.get(url)).await?;
        debug!(count = entries.len(), "received catalog");
        Ok(entries)
    }

    #[instrument(skip(self), fields(provider = %provider_id))]
    async fn try_list_provider_services(&self, provider_id: &ProviderId) -> Result<Vec<Service>> {
        let url = self.services_url(provider_id)?;
        debug!(%url, "GET provider services");
        let services: Vec<Service> = self.fetch(self.client.get(url)).await?;
        debug!(count = services.len(), "received provider services");
        Ok(services)
    }

    #[instrument(skip(self, draft), fields(provider = %provider_id, name = %draft.name))]
    async fn try_add_service(&self, provider_id: &ProviderId, draft: &ServiceDraft) -> Result<Service> {
        let url = self.services_url(provider_id)?;
        let service: Service = self.fetch(self.client.post(url).json(draft)).await?;
        info!(service = %service.id, "service created");
        Ok(service)
    }

    #[instrument(skip(self, patch), fields(provider = %provider_id, service = %service_id))]
    async fn try_update_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        patch: &ServicePatch,
    ) -> Result<Service> {
        let url = self.service_url(provider_id, service_id)?;
        let service: Service = self.fetch(self.client.put(url).json(patch)).await?;
        info!("service updated");
        Ok(service)
    }

    #[instrument(skip(self), fields(provider = %provider_id, service = %service_id))]
    async fn try_remove_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
    ) -> Result<RemovalAck> {
        let url = self.service_url(provider_id, service_id)?;
        // DELETE may answer 204 with no body; any body is only mined for a
        // confirmation message.
        let body = self.execute(self.client.delete(url)).await?;
        info!("service removed");
        Ok(RemovalAck {
            service_id: service_id.clone(),
            message: extract_message(&body),
        })
    }

    #[instrument(skip(self), fields(provider = %provider_id, service = %service_id))]
    async fn try_toggle_active(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        active: bool,
    ) -> Result<Service> {
        let url = self.endpoint(&[
            "prestadores",
            provider_id.as_str(),
            "servicios",
            service_id.as_str(),
            "estado",
        ])?;
        let body = serde_json::json!({ "activo": active });
        let service: Service = self.fetch(self.client.patch(url).json(&body)).await?;
        info!(active = service.active, "service availability changed");
        Ok(service)
    }
}

#[async_trait]
impl ServiceGateway for HttpGateway {
    async fn list_catalog(&self, provider_type: ProviderType) -> OperationResult<Vec<CatalogEntry>> {
        settle(
            "list_catalog",
            self.try_list_catalog(provider_type).await,
            fallback::LIST_CATALOG,
        )
    }

    async fn list_provider_services(&self, provider_id: &ProviderId) -> OperationResult<Vec<Service>> {
        settle(
            "list_provider_services",
            self.try_list_provider_services(provider_id).await,
            fallback::LIST_SERVICES,
        )
    }

    async fn add_service(
        &self,
        provider_id: &ProviderId,
        draft: &ServiceDraft,
    ) -> OperationResult<Service> {
        settle(
            "add_service",
            self.try_add_service(provider_id, draft).await,
            fallback::ADD_SERVICE,
        )
    }

    async fn update_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        patch: &ServicePatch,
    ) -> OperationResult<Service> {
        settle(
            "update_service",
            self.try_update_service(provider_id, service_id, patch).await,
            fallback::UPDATE_SERVICE,
        )
    }

    async fn remove_service(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
    ) -> OperationResult<RemovalAck> {
        settle(
            "remove_service",
            self.try_remove_service(provider_id, service_id).await,
            fallback::REMOVE_SERVICE,
        )
    }

    async fn toggle_active(
        &self,
        provider_id: &ProviderId,
        service_id: &ServiceId,
        active: bool,
    ) -> OperationResult<Service> {
        settle(
            "toggle_active",
            self.try_toggle_active(provider_id, service_id, active).await,
            fallback::TOGGLE_ACTIVE,
        )
    }
}

// ---------------------------------------------------------------------------
// Helper functions for shaping responses
// ---------------------------------------------------------------------------

/// Log a failed call and fold it into the uniform result.
fn settle<T>(operation: &'static str, result: Result<T>, fallback: &str) -> OperationResult<T> {
    if let Err(ref e) = result {
        warn!(operation, error = %e, "gateway call failed");
    }
    OperationResult::from_result(result, fallback)
}

/// Response payload, either bare or inside a `data` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| VetcareError::Decode(e.to_string()))?;
    Ok(match envelope {
        Envelope::Wrapped { data } => data,
        Envelope::Bare(data) => data,
    })
}

/// Pull a human-readable message out of a JSON body.
///
/// Looks at `message`, `mensaje` and `error` in that order; `error` may itself
/// be an object carrying `message`. Blank strings are ignored.
fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    for key in ["message", "mensaje", "error"] {
        let candidate = match object.get(key) {
            Some(serde_json::Value::String(s)) => Some(s.as_str()),
            Some(serde_json::Value::Object(inner)) => {
                inner.get("message").and_then(serde_json::Value::as_str)
            }
            _ => None,
        };
        if let Some(message) = candidate.map(str::trim).filter(|m| !m.is_empty()) {
            return Some(message.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, patch, put};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use vetcare_core::result::FailureKind;

    /// Serve `router` on an ephemeral port and return a matching base URL.
    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve test backend");
        });
        format!("http://{addr}/api")
    }

    fn gateway_for(base_url: String) -> HttpGateway {
        HttpGateway::new(&ClientConfig {
            base_url,
            request_timeout_secs: 5,
            ..Default::default()
        })
        .expect("gateway")
    }

    async fn provider_services(Path(provider): Path<String>) -> Response {
        if provider == "p1" {
            Json(json!([{ "id": "s1", "nombre": "Vaccination", "activo": true }])).into_response()
        } else {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Provider not found" })),
            )
                .into_response()
        }
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = HttpGateway::new(&ClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(VetcareError::Config(_))));
    }

    #[test]
    fn endpoint_percent_encodes_ids() {
        let gateway = gateway_for("https://vets.example/api/".into());
        let url = gateway
            .service_url(&ProviderId::from("p 1/x"), &ServiceId::from("s1"))
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://vets.example/api/prestadores/p%201%2Fx/servicios/s1"
        );
    }

    #[test]
    fn extract_message_prefers_message_then_mensaje_then_error() {
        assert_eq!(
            extract_message(br#"{"mensaje":"Precio invalido","error":"Bad Request"}"#).as_deref(),
            Some("Precio invalido")
        );
        assert_eq!(
            extract_message(br#"{"error":{"message":"Invalid price"}}"#).as_deref(),
            Some("Invalid price")
        );
        assert_eq!(extract_message(br#"{"message":"  "}"#), None);
        assert_eq!(extract_message(b""), None);
    }

    #[tokio::test]
    async fn lists_provider_services_from_bare_array() {
        let base = spawn_backend(
            Router::new().route("/api/prestadores/{id}/servicios", get(provider_services)),
        )
        .await;
        let gateway = gateway_for(base);

        let services = gateway
            .list_provider_services(&ProviderId::from("p1"))
            .await
            .ok()
            .expect("services");
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, ServiceId::from("s1"));
        assert_eq!(services[0].name, "Vaccination");
    }

    #[tokio::test]
    async fn unknown_provider_reports_backend_message() {
        let base = spawn_backend(
            Router::new().route("/api/prestadores/{id}/servicios", get(provider_services)),
        )
        .await;
        let gateway = gateway_for(base);

        let result = gateway.list_provider_services(&ProviderId::from("nope")).await;
        let failure = result.into_result().expect_err("should fail");
        assert_eq!(failure.kind, FailureKind::Backend { status: 404 });
        assert_eq!(failure.message, "Provider not found");
    }

    #[tokio::test]
    async fn catalog_accepts_data_envelope() {
        let router = Router::new().route(
            "/api/catalogo/servicios/{tipo}",
            get(|Path(tipo): Path<String>| async move {
                assert_eq!(tipo, "clinica");
                Json(json!({ "data": [
                    { "_id": "c1", "nombre": "Deworming", "precioSugerido": 12.5 },
                    { "_id": "c2", "nombre": "Microchip" }
                ]}))
            }),
        );
        let gateway = gateway_for(spawn_backend(router).await);

        let catalog = gateway
            .list_catalog(ProviderType::Clinic)
            .await
            .ok()
            .expect("catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].suggested_price, Some(12.5));
        assert_eq!(catalog[1].id, ServiceId::from("c2"));
    }

    #[tokio::test]
    async fn validation_error_carries_backend_message_and_hits_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/prestadores/{id}/servicios",
                axum::routing::post(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "message": "Invalid price" })),
                    )
                }),
            )
            .with_state(Arc::clone(&hits));
        let gateway = gateway_for(spawn_backend(router).await);

        let result = gateway
            .add_service(&ProviderId::from("p1"), &ServiceDraft::new("Deworming"))
            .await;
        assert_eq!(result.error(), Some("Invalid price"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_error_without_body_uses_fallback() {
        let router = Router::new().route(
            "/api/prestadores/{id}/servicios/{sid}",
            put(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let gateway = gateway_for(spawn_backend(router).await);

        let result = gateway
            .update_service(
                &ProviderId::from("p1"),
                &ServiceId::from("s1"),
                &ServicePatch::active(false),
            )
            .await;
        let failure = result.into_result().expect_err("should fail");
        assert_eq!(failure.kind, FailureKind::Backend { status: 500 });
        assert_eq!(failure.message, fallback::UPDATE_SERVICE);
    }

    #[tokio::test]
    async fn toggle_sends_activo_body_to_estado() {
        let router = Router::new().route(
            "/api/prestadores/{id}/servicios/{sid}/estado",
            patch(
                |Path((id, sid)): Path<(String, String)>, Json(body): Json<Value>| async move {
                    assert_eq!(body, json!({ "activo": false }));
                    Json(json!({ "id": sid, "nombre": "Vaccination", "activo": false, "prestadorId": id }))
                },
            ),
        );
        let gateway = gateway_for(spawn_backend(router).await);

        let service = gateway
            .toggle_active(&ProviderId::from("p1"), &ServiceId::from("s1"), false)
            .await
            .ok()
            .expect("service");
        assert!(!service.active);
        assert_eq!(service.provider_id, Some(ProviderId::from("p1")));
    }

    #[tokio::test]
    async fn remove_accepts_empty_no_content() {
        let router = Router::new().route(
            "/api/prestadores/{id}/servicios/{sid}",
            axum::routing::delete(|| async { StatusCode::NO_CONTENT }),
        );
        let gateway = gateway_for(spawn_backend(router).await);

        let ack = gateway
            .remove_service(&ProviderId::from("p1"), &ServiceId::from("s1"))
            .await
            .ok()
            .expect("ack");
        assert_eq!(ack.service_id, ServiceId::from("s1"));
        assert!(ack.message.is_none());
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_failure() {
        let router = Router::new().route(
            "/api/prestadores/{id}/servicios",
            get(|| async { Json(json!({ "unexpected": true })) }),
        );
        let gateway = gateway_for(spawn_backend(router).await);

        let failure = gateway
            .list_provider_services(&ProviderId::from("p1"))
            .await
            .into_result()
            .expect_err("should fail");
        assert_eq!(failure.kind, FailureKind::Decode);
        assert_eq!(failure.message, fallback::LIST_SERVICES);
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_failure() {
        // Grab a free port, then close it so nothing is listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let gateway = gateway_for(format!("http://{addr}/api"));
        let failure = gateway
            .list_catalog(ProviderType::Veterinarian)
            .await
            .into_result()
            .expect_err("should fail");
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(failure.message, fallback::LIST_CATALOG);
    }

    #[tokio::test]
    async fn bearer_token_is_sent() {
        let router = Router::new().route(
            "/api/prestadores/{id}/servicios",
            get(|headers: AxumHeaders| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth == "Bearer secret" {
                    Json(json!([])).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        );
        let base = spawn_backend(router).await;
        let gateway = HttpGateway::new(&ClientConfig {
            base_url: base,
            auth_token: Some("secret".into()),
            ..Default::default()
        })
        .expect("gateway");

        let result = gateway.list_provider_services(&ProviderId::from("p1")).await;
        assert!(result.is_ok());
    }
}
