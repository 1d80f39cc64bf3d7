//! Explicitly scoped dataset shared by every page.
//!
//! A [`Session`] loads the trip export once and hands the same immutable
//! records to each page renderer. Nothing is memoized behind the caller's
//! back: the data only changes when [`Session::reload`] is called, and each
//! reload bumps [`Session::generation`] so callers can tell snapshots apart.
//!
//! Cloning a session is cheap and shares the loaded records.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use snafu::prelude::*;

use crate::{
    load::{LoadError, load_trips},
    trip::TripRecord,
};

/// Errors from opening or reloading a session.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    /// Loading the trip export failed.
    #[snafu(display("failed to load trips from {path}: {source}"))]
    Load {
        /// Source path.
        path: String,
        /// Underlying load error.
        #[snafu(source(from(LoadError, Box::new)))]
        source: Box<LoadError>,
    },

    /// The session was built from in-memory records and has nothing to
    /// reload from.
    #[snafu(display("session has no backing file to reload"))]
    NoSource,
}

/// Loaded trip data plus where it came from.
#[derive(Debug, Clone)]
pub struct Session {
    source: Option<PathBuf>,
    records: Arc<[TripRecord]>,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl Session {
    /// Load trips from `path` and start a session over them.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let records = read(&path).await?;
        Ok(Session {
            source: Some(path),
            records,
            generation: 1,
            loaded_at: Utc::now(),
        })
    }

    /// Start a session over records that are already in memory.
    pub fn from_records(records: Vec<TripRecord>) -> Self {
        Session {
            source: None,
            records: records.into(),
            generation: 1,
            loaded_at: Utc::now(),
        }
    }

    /// The loaded trips.
    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    /// A shared handle to the loaded trips.
    pub fn shared_records(&self) -> Arc<[TripRecord]> {
        Arc::clone(&self.records)
    }

    /// Number of loaded trips.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no trips are loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// File the trips were loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Load counter; starts at 1 and increases on every reload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the current snapshot was loaded.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Re-read the backing file, replacing the records.
    ///
    /// On failure the previous snapshot stays in place. Other clones of
    /// this session keep the records they already hold.
    pub async fn reload(&mut self) -> Result<usize, SessionError> {
        let path = self.source.clone().context(NoSourceSnafu)?;
        let records = read(&path).await?;

        self.records = records;
        self.generation += 1;
        self.loaded_at = Utc::now();
        log::info!(
            "reloaded {} trips from {} (generation {})",
            self.records.len(),
            path.display(),
            self.generation
        );
        Ok(self.records.len())
    }
}

async fn read(path: &Path) -> Result<Arc<[TripRecord]>, SessionError> {
    let trips = load_trips(path).await.context(LoadSnafu {
        path: path.display().to_string(),
    })?;
    Ok(trips.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

    const HEADER: &str = "start_date,start_station_name\n";

    #[tokio::test]
    async fn open_loads_once_and_reload_bumps_generation() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("trips.csv");
        tokio::fs::write(&path, format!("{HEADER}2021-01-01 08:00:00,A\n")).await?;

        let mut session = Session::open(&path).await?;
        assert_eq!(session.len(), 1);
        assert_eq!(session.generation(), 1);
        assert_eq!(session.source(), Some(path.as_path()));

        let before = session.clone();
        tokio::fs::write(
            &path,
            format!("{HEADER}2021-01-01 08:00:00,A\n2021-01-02 09:00:00,B\n"),
        )
        .await?;

        // The snapshot does not change until an explicit reload.
        assert_eq!(session.len(), 1);
        assert_eq!(session.reload().await?, 2);
        assert_eq!(session.generation(), 2);
        assert_eq!(before.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_snapshot() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("trips.csv");
        tokio::fs::write(&path, format!("{HEADER}2021-01-01 08:00:00,A\n")).await?;

        let mut session = Session::open(&path).await?;
        tokio::fs::write(&path, format!("{HEADER}garbage,A\n")).await?;

        let err = session.reload().await.expect_err("bad timestamp");
        assert!(matches!(err, SessionError::Load { .. }));
        assert_eq!(session.len(), 1);
        assert_eq!(session.generation(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_session_cannot_reload() {
        let mut session = Session::from_records(vec![TripRecord::new(None, "A")]);
        assert!(session.source().is_none());
        assert!(matches!(
            session.reload().await,
            Err(SessionError::NoSource)
        ));
    }

    #[tokio::test]
    async fn open_missing_file_reports_path() {
        let err = Session::open("/definitely/not/here/trips.parquet")
            .await
            .expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here/trips.parquet"));
    }

    #[test]
    fn clones_share_records() {
        let session = Session::from_records(vec![TripRecord::new(None, "A")]);
        let other = session.clone();
        assert!(Arc::ptr_eq(&session.shared_records(), &other.shared_records()));
    }
}
