// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Catalog page — templates for the provider's type, each addable as a
// service at its suggested price.

use dioxus::prelude::*;

use crate::pages::services::{ErrorBanner, format_price};
use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Catalog() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    {
        let svc = svc.clone();
        use_hook(move || {
            spawn(async move {
                svc.load_catalog().await;
            });
        });
    }

    let provider_type = state.read().provider_type;
    let loading = state.read().store.is_loading;
    let entries = state.read().store.available_services.clone();

    rsx! {
        div {
            h1 { "Catalog" }
            p { style: "color: #666;", "Services available to a {provider_type}." }

            ErrorBanner {}

            if entries.is_empty() && !loading {
                p { style: "text-align: center; color: #aaa; margin: 48px 0;",
                    "The catalog is empty."
                }
            }

            for entry in entries {
                {
                    let offered = state
                        .read()
                        .store
                        .services
                        .iter()
                        .any(|s| s.name.eq_ignore_ascii_case(&entry.name));
                    let price = entry
                        .suggested_price
                        .map(format_price)
                        .unwrap_or_else(|| "No suggested price".into());

                    rsx! {
                        div { key: "{entry.id}",
                            style: "padding: 12px; margin: 8px 0; border: 1px solid #e0e0e0; border-radius: 8px;",
                            div { style: "display: flex; justify-content: space-between; align-items: center;",
                                div {
                                    strong { "{entry.name}" }
                                    if let Some(ref category) = entry.category {
                                        span { style: "color: #999; font-size: 12px; margin-left: 8px;", "{category}" }
                                    }
                                    p { style: "color: #666; font-size: 14px; margin: 4px 0;", "{price}" }
                                }
                                button {
                                    style: "padding: 6px 12px; border-radius: 6px; border: none; color: white; background: #007aff; font-size: 13px;",
                                    disabled: loading || offered,
                                    onclick: {
                                        let svc = svc.clone();
                                        let entry = entry.clone();
                                        move |_| {
                                            let svc = svc.clone();
                                            let entry = entry.clone();
                                            spawn(async move {
                                                svc.add_from_catalog(&entry).await;
                                            });
                                        }
                                    },
                                    if offered { "Added" } else { "Add" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
