// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VenueMap Planner - batch processing of venue workbooks.
//!
//! Reads a workbook (JSON as produced by a spreadsheet reader), builds the
//! map of every `<n>日目` sheet in parallel and detects its blocks. With a
//! catalogue, every resolvable item is planned into the day's visit order and
//! a route is drawn. With a store directory, each day's state is loaded
//! first and saved back afterwards, so halls and hand-made orders persist.
//!
//! # Usage
//!
//! ```text
//! VENUEMAP_CATALOGUE=items.json VENUEMAP_STORE_DIR=./days venuemap-planner map.json
//! ```
//!
//! The report is written to stdout as JSON, logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use venuemap_core::RawWorkbook;
use venuemap_detection::{CatalogueItem, DetectionConfig};
use venuemap_processing::{
    process_workbook, ContextConfig, DayContext, DayKey, DayMap, DayStore, JsonDirStore,
};
use venuemap_route::RouteConfig;

mod config;
mod report;

use config::PlannerConfig;
use report::{DayReport, PlanReport, WorkbookReport};

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlannerConfig::from_env();
    init_logging(config.log_json);

    tracing::info!(
        event_id = %config.event_id,
        worker_threads = config.worker_threads,
        store_dir = ?config.store_dir,
        "Starting VenueMap Planner"
    );

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("failed to initialize rayon thread pool")?;

    let workbook_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.workbook.clone())
        .context("no workbook given: pass a path or set VENUEMAP_WORKBOOK")?;

    let book: RawWorkbook = read_json(&workbook_path).await?;
    let catalogue: Vec<CatalogueItem> = match &config.catalogue {
        Some(path) => read_json(path).await?,
        None => Vec::new(),
    };
    tracing::info!(
        workbook = %workbook_path.display(),
        sheets = book.sheets.len(),
        items = catalogue.len(),
        "inputs loaded"
    );

    // Sheet processing is CPU-bound, keep it off the async workers
    let report = tokio::task::spawn_blocking(move || plan_workbook(&book, catalogue, &config))
        .await
        .context("planning task panicked")??;

    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,venuemap=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn plan_workbook(
    book: &RawWorkbook,
    catalogue: Vec<CatalogueItem>,
    config: &PlannerConfig,
) -> Result<WorkbookReport> {
    let ctx_config = ContextConfig {
        detection: DetectionConfig::default(),
        route: RouteConfig {
            turn_penalty: config.turn_penalty,
            ..RouteConfig::default()
        },
    };
    let mut store = config
        .store_dir
        .as_ref()
        .map(|dir| JsonDirStore::open(dir.clone()))
        .transpose()
        .context("failed to open day store")?;

    let mut days = Vec::new();
    let mut failed = 0;
    for (day, result) in process_workbook(book, &ctx_config.detection) {
        let day_map = match result {
            Ok(day_map) => day_map,
            Err(err) => {
                tracing::warn!(day, error = %err, "day sheet skipped");
                failed += 1;
                continue;
            }
        };
        let summary = day_map.summary();
        let plan = if catalogue.is_empty() && store.is_none() {
            None
        } else {
            let key = DayKey::new(config.event_id.clone(), day);
            Some(plan_day(key, day_map, &catalogue, &ctx_config, store.as_mut())?)
        };
        days.push(DayReport { summary, plan });
    }

    Ok(WorkbookReport {
        event_id: config.event_id.clone(),
        days,
        failed,
    })
}

fn plan_day(
    key: DayKey,
    day_map: DayMap,
    catalogue: &[CatalogueItem],
    ctx_config: &ContextConfig,
    store: Option<&mut JsonDirStore>,
) -> Result<PlanReport> {
    let saved = match store.as_deref() {
        Some(store) => store
            .load(&key)
            .with_context(|| format!("failed to load {key}"))?,
        None => None,
    };
    let day_items: Vec<CatalogueItem> = catalogue
        .iter()
        .filter(|item| item.is_for_day(key.day))
        .cloned()
        .collect();
    let mut ctx = DayContext::with_config(key, saved.unwrap_or_default(), day_items, ctx_config.clone());
    ctx.install_map(day_map.map);

    let resolvable: Vec<_> = ctx
        .catalogue()
        .iter()
        .map(|item| item.id)
        .filter(|id| !ctx.resolution().is_orphan(*id))
        .collect();
    let added = ctx.append_visits(&resolvable, &resolvable);
    if !ctx.group_order().is_empty() {
        ctx.reorder_by_hall_order();
    }
    tracing::debug!(key = %ctx.key(), added, stops = ctx.visit_order().len(), "visits planned");

    if let Some(store) = store {
        ctx.save(store)
            .with_context(|| format!("failed to save {}", ctx.key()))?;
    }
    Ok(PlanReport::from_context(&ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use venuemap_core::{GridPos, GridRect, RawSheet, RawValue};

    fn config() -> PlannerConfig {
        PlannerConfig {
            workbook: None,
            catalogue: None,
            store_dir: None,
            event_id: "test".into(),
            worker_threads: 1,
            turn_penalty: 0.5,
            log_json: false,
        }
    }

    fn book() -> RawWorkbook {
        let mut sheet = RawSheet::new("1日目");
        sheet
            .set_value(GridPos::new(2, 2), RawValue::Text("A".into()))
            .merge(GridRect::spanning(GridPos::new(2, 2), GridPos::new(3, 3)))
            .set_value(GridPos::new(2, 4), RawValue::Number(5.0))
            .set_value(GridPos::new(3, 4), RawValue::Number(6.0))
            .outline(GridRect::spanning(GridPos::new(2, 2), GridPos::new(3, 4)), "thick");
        RawWorkbook {
            sheets: vec![sheet, RawSheet::new("2日目")],
        }
    }

    #[test]
    fn summaries_only_without_catalogue() {
        let report = plan_workbook(&book(), Vec::new(), &config()).unwrap();
        assert_eq!(report.days.len(), 1);
        assert_eq!(report.failed, 1);
        assert!(report.days[0].plan.is_none());
        assert_eq!(report.days[0].summary.blocks[0].stalls, vec![5, 6]);
    }

    #[test]
    fn catalogue_items_are_planned_in_order() {
        let catalogue = vec![
            CatalogueItem::new(1, "A", "6"),
            CatalogueItem::new(2, "A", "5"),
            CatalogueItem::new(3, "Q", "1"),
        ];
        let report = plan_workbook(&book(), catalogue, &config()).unwrap();
        let plan = report.days[0].plan.as_ref().unwrap();
        assert_eq!(plan.stops.len(), 2);
        assert_eq!(plan.orphans.len(), 1);
        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.unreachable, 0);
    }

    #[test]
    fn items_are_planned_only_on_their_day() {
        let mut book = book();
        let mut second = book.sheets[0].clone();
        second.name = "2日目".into();
        book.sheets[1] = second;

        let catalogue = vec![
            CatalogueItem::new(1, "A", "5").with_event_date("1日目"),
            CatalogueItem::new(2, "A", "6").with_event_date("2"),
            CatalogueItem::new(3, "A", "6"),
        ];
        let report = plan_workbook(&book, catalogue, &config()).unwrap();
        assert_eq!(report.days.len(), 2);

        let stops: Vec<Vec<u64>> = report
            .days
            .iter()
            .map(|day| day.plan.as_ref().unwrap().stops.iter().map(|id| id.0).collect())
            .collect();
        assert_eq!(stops, vec![vec![1, 3], vec![2, 3]]);
    }
}
