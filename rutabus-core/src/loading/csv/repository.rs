use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use super::load_csv_repository;
use crate::model::{Edge, Node, Route, RouteEdge, RouteNode, RouteStop};
use crate::repository::{InMemoryRepository, Repository};
use crate::{Error, NodeId, RecordError};

/// A CSV export directory read again before every graph build.
///
/// Queries are answered from the records of the latest read. If a re-read
/// fails, the error is returned and the previous records stay in place.
#[derive(Debug)]
pub struct CsvRepository {
    dir: PathBuf,
    records: InMemoryRepository,
    skipped: RwLock<Vec<RecordError>>,
    /// Set while the records from `open` have not been used by a build yet
    fresh: AtomicBool,
}

impl CsvRepository {
    /// Reads the export in `dir` once.
    ///
    /// # Errors
    ///
    /// Fails if `dir` is not a directory or a required file is missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        let (records, skipped) = load_csv_repository(&dir)?;
        Ok(Self {
            dir,
            records,
            skipped: RwLock::new(skipped),
            fresh: AtomicBool::new(true),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rows skipped by the latest read
    pub fn skipped(&self) -> Vec<RecordError> {
        self.skipped
            .read()
            .map(|skipped| skipped.clone())
            .unwrap_or_default()
    }
}

impl Repository for CsvRepository {
    fn refresh(&self) -> Result<(), Error> {
        if self.fresh.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let (records, skipped) = load_csv_repository(&self.dir)?;
        if !skipped.is_empty() {
            warn!(
                "{}: skipped {} malformed rows",
                self.dir.display(),
                skipped.len()
            );
        }
        info!(
            "Re-read {} nodes from {}",
            records.node_count(),
            self.dir.display()
        );
        self.records.replace(records);
        *self
            .skipped
            .write()
            .map_err(|_| Error::Repository("skipped rows lock poisoned".into()))? = skipped;
        Ok(())
    }

    fn all_nodes(&self) -> Result<Vec<Node>, Error> {
        self.records.all_nodes()
    }

    fn all_edges(&self) -> Result<Vec<Edge>, Error> {
        self.records.all_edges()
    }

    fn all_route_edges_with_route(&self) -> Result<Vec<(RouteEdge, Route)>, Error> {
        self.records.all_route_edges_with_route()
    }

    fn route_nodes_for(&self, node: NodeId) -> Result<Vec<RouteStop>, Error> {
        self.records.route_nodes_for(node)
    }

    fn all_route_nodes(&self) -> Result<Vec<RouteNode>, Error> {
        self.records.all_route_nodes()
    }
}
