// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable hints for pet owners and clinic staff.
//
// The failure message itself comes from the backend (or the operation's
// fallback). This module adds the "what now?" part the UI shows underneath.

use crate::result::{Failure, FailureKind};

/// Severity of a failure from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Connectivity blip or server hiccup — trying again may work.
    Transient,
    /// The user must change something (fix a field, pick another service).
    ActionRequired,
    /// Retrying will not help; the app or backend needs fixing.
    Permanent,
}

/// A failure with plain-language message and suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Shown as the heading.
    pub message: String,
    /// Shown as body text.
    pub suggestion: String,
    /// Whether a "Try again" button makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Turn a store/gateway failure into something the UI can show as-is.
pub fn humanize_failure(failure: &Failure) -> HumanError {
    match failure.kind {
        FailureKind::Network => HumanError {
            message: failure.message.clone(),
            suggestion: "Check your internet connection, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        FailureKind::Backend { status } => humanize_status(status, &failure.message),

        FailureKind::Decode => HumanError {
            message: failure.message.clone(),
            suggestion: "The server sent something we didn't understand. Please update the app or report this.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        FailureKind::NotFoundLocal => HumanError {
            message: "That service is no longer in your list.".into(),
            suggestion: "Pull to refresh your services and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FailureKind::Internal => HumanError {
            message: failure.message.clone(),
            suggestion: "Try closing and reopening the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

fn humanize_status(status: u16, message: &str) -> HumanError {
    match status {
        401 | 403 => HumanError {
            message: message.to_string(),
            suggestion: "Your session may have expired. Sign in again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        404 => HumanError {
            message: message.to_string(),
            suggestion: "It may have been removed. Refresh the list to see the latest services.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        408 | 429 => HumanError {
            message: message.to_string(),
            suggestion: "The server is busy. Wait a moment and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        400..=499 => HumanError {
            message: message.to_string(),
            suggestion: "Check the details you entered and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: message.to_string(),
            suggestion: "The server had a problem. Try again in a few minutes.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
