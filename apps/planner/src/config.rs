// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planner configuration loaded from environment variables.

use std::path::PathBuf;

/// Planner configuration.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Workbook JSON to process. A path given on the command line wins.
    pub workbook: Option<PathBuf>,
    /// Catalogue JSON (array of items) used to plan routes.
    pub catalogue: Option<PathBuf>,
    /// Directory of saved day states. Nothing is persisted when unset.
    pub store_dir: Option<PathBuf>,
    /// Event the saved days belong to.
    pub event_id: String,
    /// Number of worker threads for parallel sheet processing.
    pub worker_threads: usize,
    /// Extra route cost per change of direction.
    pub turn_penalty: f64,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl PlannerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            workbook: std::env::var("VENUEMAP_WORKBOOK").ok().map(PathBuf::from),
            catalogue: std::env::var("VENUEMAP_CATALOGUE").ok().map(PathBuf::from),
            store_dir: std::env::var("VENUEMAP_STORE_DIR").ok().map(PathBuf::from),
            event_id: std::env::var("VENUEMAP_EVENT_ID").unwrap_or_else(|_| "default".into()),
            worker_threads: std::env::var("VENUEMAP_WORKER_THREADS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
            turn_penalty: std::env::var("VENUEMAP_TURN_PENALTY")
                .unwrap_or_else(|_| "0.5".into())
                .parse()
                .unwrap_or(0.5),
            log_json: std::env::var("VENUEMAP_LOG_JSON")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
