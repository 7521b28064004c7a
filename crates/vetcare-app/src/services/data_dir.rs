// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where the settings file lives.

use std::path::{Path, PathBuf};

/// Overrides the resolved directory outright, e.g. for a second profile.
pub const DATA_DIR_ENV: &str = "VETCARE_DATA_DIR";

/// Return the application data directory, creating it if needed.
///
/// Only settings live here; services are never persisted.
pub fn data_dir() -> PathBuf {
    let dir = resolve(
        std::env::var_os(DATA_DIR_ENV).as_deref().map(Path::new),
        std::env::var_os("XDG_DATA_HOME").as_deref().map(Path::new),
        std::env::var_os("HOME").as_deref().map(Path::new),
    );
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "could not create data dir");
    }
    dir
}

fn resolve(explicit: Option<&Path>, xdg: Option<&Path>, home: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return dir.to_path_buf();
    }
    let base = match (xdg, home) {
        (Some(xdg), _) if !xdg.as_os_str().is_empty() => xdg.to_path_buf(),
        (_, Some(home)) => home.join(".local").join("share"),
        _ => PathBuf::from("/tmp"),
    };
    base.join("vetcare")
}
