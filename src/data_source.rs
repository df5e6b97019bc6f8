// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Upstream statistics provider and the background fetch that feeds the app.

use crate::lookback::QueryWindow;
use crate::org_data::OrganizationRecord;
use crate::util::read_file_string;
use crate::{Action, LoadFailedAction, LookbackWindow, RecordsLoadedAction};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Supplies the child organizations of `organization_id` for one query window.
pub trait StatsSource: Send + Sync {
    fn fetch(
        &self,
        organization_id: Option<&str>,
        query: &QueryWindow,
    ) -> Result<Vec<OrganizationRecord>>;
}

/// Reads JSON snapshots exported from the statistics API.
///
/// A directory holds one `<days>.json` per lookback window. A single file is
/// served for every window.
#[derive(Clone, Debug)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// File holding the snapshot for `window`.
    pub fn snapshot_path(&self, window: LookbackWindow) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.json", window.days()))
        } else {
            self.path.clone()
        }
    }

    pub fn parse(contents: &str) -> Result<Vec<OrganizationRecord>> {
        let records: Vec<OrganizationRecord> =
            serde_json::from_str(contents).context("invalid organization snapshot")?;
        Ok(records)
    }
}

impl StatsSource for SnapshotSource {
    fn fetch(
        &self,
        organization_id: Option<&str>,
        query: &QueryWindow,
    ) -> Result<Vec<OrganizationRecord>> {
        let path = self.snapshot_path(query.window);
        if !path.exists() {
            bail!("no snapshot for {} at {}", query.window, path.display());
        }
        if !self.path.is_dir() {
            log::warn!(
                "serving {} for every window, {} requested",
                path.display(),
                query.window
            );
        }
        log::info!(
            "loading {} for {:?} ({}..{}, previous {}..{})",
            path.display(),
            organization_id,
            query.current_start,
            query.current_end,
            query.previous_start,
            query.previous_end
        );
        let contents = read_file_string(&path)?;
        Self::parse(&contents).with_context(|| format!("failed to load {}", path.display()))
    }
}

/// Runs fetches off the render loop and reports the outcome as an action.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn StatsSource>,
    organization_id: Option<String>,
    action_tx: UnboundedSender<Action>,
}

impl Fetcher {
    pub fn new(
        source: Arc<dyn StatsSource>,
        organization_id: Option<String>,
        action_tx: UnboundedSender<Action>,
    ) -> Self {
        Self {
            source,
            organization_id,
            action_tx,
        }
    }

    /// Fetches `window` on the blocking pool, or inline outside a runtime.
    pub fn request(&self, window: LookbackWindow) {
        let query = QueryWindow::ending_today(window);
        let source = Arc::clone(&self.source);
        let organization_id = self.organization_id.clone();
        let action_tx = self.action_tx.clone();

        let job = move || {
            let action = match source.fetch(organization_id.as_deref(), &query) {
                Ok(records) => {
                    log::info!("fetched {} organizations for {}", records.len(), window);
                    Action::RecordsLoaded(RecordsLoadedAction {
                        window,
                        records: Arc::new(records),
                    })
                }
                Err(e) => {
                    log::error!("fetch for {window} failed: {e:#}");
                    Action::LoadFailed(LoadFailedAction {
                        window,
                        message: format!("{e:#}"),
                    })
                }
            };
            if action_tx.send(action).is_err() {
                log::debug!("fetch result dropped, receiver closed");
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::sync::mpsc;

    const SNAPSHOT: &str = r#"[
        {"id": "1", "name": "Acme", "state": "ACTIVE", "createdAt": "2023-01-04T10:00:00Z",
         "statistics": {"activitiesInWindow": {"totalCount": 10}, "missed": {"totalCount": 3}}},
        {"id": "2", "name": "Beta", "createdAt": "2023-02-01T00:00:00Z"}
    ]"#;

    #[test]
    fn test_parse_snapshot() {
        let records = SnapshotSource::parse(SNAPSHOT).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stats().missed(), 3);
        assert!(records[1].statistics.is_none());
        assert!(SnapshotSource::parse("{").is_err());
    }

    #[test]
    fn test_directory_source_uses_window_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("30.json"), SNAPSHOT).unwrap();
        let source = SnapshotSource::new(dir.path());

        let month = QueryWindow::ending_today(LookbackWindow::Month);
        assert_eq!(source.fetch(None, &month).unwrap().len(), 2);

        let week = QueryWindow::ending_today(LookbackWindow::Week);
        assert!(source.fetch(None, &week).is_err());
    }

    #[test]
    fn test_fetcher_reports_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("snapshot.json");
        fs::write(&file, SNAPSHOT).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let fetcher = Fetcher::new(Arc::new(SnapshotSource::new(&file)), None, tx.clone());
        fetcher.request(LookbackWindow::Year);
        match rx.try_recv().unwrap() {
            Action::RecordsLoaded(loaded) => {
                assert_eq!(loaded.window, LookbackWindow::Year);
                assert_eq!(loaded.records.len(), 2);
            }
            other => panic!("unexpected action {other}"),
        }

        let missing = Fetcher::new(
            Arc::new(SnapshotSource::new(dir.path().join("missing.json"))),
            None,
            tx,
        );
        missing.request(LookbackWindow::Week);
        match rx.try_recv().unwrap() {
            Action::LoadFailed(failed) => assert_eq!(failed.window, LookbackWindow::Week),
            other => panic!("unexpected action {other}"),
        }
    }
}
