// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Services page — the provider's offered services, with availability toggle
// and removal.

use dioxus::prelude::*;

use vetcare_core::types::Service;

use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Services() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    // Initial fetch
    {
        let svc = svc.clone();
        use_hook(move || {
            spawn(async move {
                svc.refresh_services().await;
            });
        });
    }

    let provider = state.read().provider_id.clone();
    let loading = state.read().store.is_loading;
    let services = state.read().store.services.clone();

    rsx! {
        div {
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                h1 { "My services" }
                button {
                    style: "padding: 6px 12px; border-radius: 6px; border: 1px solid #ccc; background: white; font-size: 13px;",
                    disabled: loading,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let svc = svc.clone();
                            spawn(async move {
                                svc.refresh_services().await;
                            });
                        }
                    },
                    if loading { "Loading..." } else { "Refresh" }
                }
            }
            p { style: "color: #666; font-size: 14px;", "Provider {provider}" }

            ErrorBanner {}

            if services.is_empty() && !loading {
                p { style: "text-align: center; color: #aaa; margin: 48px 0;",
                    "No services yet. Add some from the catalog."
                }
            } else {
                for service in services {
                    ServiceRow { key: "{service.id}", service: service.clone(), busy: loading }
                }
            }
        }
    }
}

#[component]
fn ServiceRow(service: Service, busy: bool) -> Element {
    let svc = use_context::<AppServices>();
    let id = service.id.clone();
    let active = service.active;

    rsx! {
        div { style: "padding: 12px; margin: 8px 0; border: 1px solid #e0e0e0; border-radius: 8px;",
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                strong { "{service.name}" }
                span { style: "font-size: 12px; padding: 4px 8px; border-radius: 4px; background: {badge_bg(active)};",
                    if active { "Available" } else { "Paused" }
                }
            }
            if !service.description.is_empty() {
                p { style: "color: #666; font-size: 14px; margin: 4px 0;", "{service.description}" }
            }
            p { style: "font-size: 14px; margin: 4px 0;",
                "{format_price(service.price)}"
                if let Some(minutes) = service.duration_minutes {
                    " · {minutes} min"
                }
            }
            div { style: "display: flex; gap: 8px; margin-top: 8px;",
                button {
                    style: "padding: 4px 12px; border-radius: 4px; border: 1px solid #007aff; color: #007aff; background: white; font-size: 12px;",
                    disabled: busy,
                    onclick: {
                        let svc = svc.clone();
                        let id = id.clone();
                        move |_| {
                            let svc = svc.clone();
                            let id = id.clone();
                            spawn(async move {
                                svc.set_availability(&id, !active).await;
                            });
                        }
                    },
                    if active { "Pause" } else { "Resume" }
                }
                button {
                    style: "padding: 4px 12px; border-radius: 4px; border: 1px solid #ff3b30; color: #ff3b30; background: white; font-size: 12px;",
                    disabled: busy,
                    onclick: move |_| {
                        let svc = svc.clone();
                        let id = id.clone();
                        spawn(async move {
                            if !svc.remove(&id).await {
                                tracing::warn!(service = %id, "remove failed");
                            }
                        });
                    },
                    "Remove"
                }
            }
        }
    }
}

/// Last store error with a suggestion and a dismiss button.
#[component]
pub fn ErrorBanner() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let Some(human) = state.read().human_error() else {
        return rsx! {};
    };

    rsx! {
        div { style: "padding: 12px; margin: 12px 0; border-radius: 8px; background: #f8d7da; color: #721c24;",
            strong { "{human.message}" }
            p { style: "font-size: 13px; margin: 4px 0;", "{human.suggestion}" }
            button {
                style: "padding: 4px 12px; border-radius: 4px; border: 1px solid #721c24; color: #721c24; background: white; font-size: 12px;",
                onclick: move |_| svc.clear_error(),
                "Dismiss"
            }
        }
    }
}

fn badge_bg(active: bool) -> &'static str {
    if active { "#d4edda" } else { "#e2e3e5" }
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}
