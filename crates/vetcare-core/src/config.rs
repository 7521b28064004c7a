// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VetcareError};

/// Environment variable that overrides [`ClientConfig::base_url`].
pub const API_URL_ENV: &str = "VETCARE_API_URL";

/// Persistent settings for talking to the Vetcare backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the REST API, e.g. `https://api.example.org/api`.
    pub base_url: String,
    /// Per-request timeout. The store has no timeout of its own.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Bearer token sent with every request, if set.
    pub auth_token: Option<String>,
    /// Use the in-process backend instead of the network.
    pub demo_mode: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".into(),
            request_timeout_secs: 15,
            user_agent: concat!("vetcare/", env!("CARGO_PKG_VERSION")).into(),
            auth_token: None,
            demo_mode: false,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Apply `VETCARE_API_URL` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Reject settings the gateway cannot work with.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(VetcareError::Config(format!(
                "base_url must be an http(s) URL, got '{url}'"
            )));
        }
        if url.len() <= "https://".len() {
            return Err(VetcareError::Config("base_url has no host".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(VetcareError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
