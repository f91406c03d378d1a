//! Generation-counted cache of the built network.
//!
//! The planning graph is a projection of the repository. The service builds
//! it on first use and keeps it until told otherwise: [`GraphService::rebuild`]
//! replaces it with a fresh build and [`GraphService::invalidate`] drops it
//! so the next access builds again. Requests hold an `Arc` to the snapshot
//! they started with, so a rebuild never changes a search in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use log::info;

use crate::loading::{BuildReport, build_planning_graph};
use crate::model::{PlanningGraph, RouteCatalog, RouteStopIndex};
use crate::repository::Repository;
use crate::routing::transfer_search::RouteNetwork;
use crate::spatial::SpatialIndex;
use crate::{Error, PlannerConfig};

/// Everything a planning request reads, built together from one repository
/// read
#[derive(Debug)]
pub struct NetworkSnapshot {
    pub generation: u64,
    pub graph: PlanningGraph,
    pub spatial: SpatialIndex,
    pub stops: RouteStopIndex,
    pub routes: RouteCatalog,
    pub route_network: RouteNetwork,
    pub report: BuildReport,
}

impl NetworkSnapshot {
    /// Reads the repository and builds every structure.
    ///
    /// # Errors
    ///
    /// Fails when the repository fails, or when it has edges but none of
    /// them could be turned into arcs.
    pub fn build<R>(
        repository: &R,
        config: &PlannerConfig,
        generation: u64,
    ) -> Result<Self, Error>
    where
        R: Repository + ?Sized,
    {
        let started = Instant::now();

        repository.refresh()?;
        let nodes = repository.all_nodes()?;
        let edges = repository.all_edges()?;
        let route_edges = repository.all_route_edges_with_route()?;
        let route_nodes = repository.all_route_nodes()?;

        let (graph, mut report) =
            build_planning_graph(&nodes, &edges, &route_edges, config.walk_penalty);
        if !edges.is_empty() && report.walk_arcs == 0 {
            return Err(Error::InvalidData(format!(
                "none of the {} street edges could be used ({} skipped)",
                edges.len(),
                report.skipped_edges
            )));
        }

        let (stops, stop_errors) = RouteStopIndex::build(&graph, &route_nodes);
        report.record_route_node_errors(stop_errors);
        report.route_stops = stops.len();

        let routes: RouteCatalog = route_edges.into_iter().map(|(_, route)| route).collect();
        let spatial = SpatialIndex::new(&graph);
        let route_network = RouteNetwork::from_graph(&graph);

        info!(
            "Network generation {generation} built in {:.2?}",
            started.elapsed()
        );
        info!(
            "{} nodes, {} arcs, {} routes, {} stops, {} records skipped",
            graph.node_count(),
            graph.arc_count(),
            routes.len(),
            stops.len(),
            report.skipped_count()
        );

        Ok(Self {
            generation,
            graph,
            spatial,
            stops,
            routes,
            route_network,
            report,
        })
    }
}

pub struct GraphService<R> {
    repository: R,
    config: PlannerConfig,
    current: RwLock<Option<Arc<NetworkSnapshot>>>,
    build_lock: Mutex<()>,
    generation: AtomicU64,
}

impl<R: Repository> GraphService<R> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the configuration does not validate.
    pub fn new(repository: R, config: PlannerConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            current: RwLock::new(None),
            build_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Generation of the most recent build; zero before the first one
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Current snapshot, building it if there is none.
    ///
    /// Concurrent callers wait for a single build and share its result.
    pub fn snapshot(&self) -> Result<Arc<NetworkSnapshot>, Error> {
        if let Some(snapshot) = self.current()? {
            return Ok(snapshot);
        }

        let _guard = self
            .build_lock
            .lock()
            .map_err(|_| Error::UnrecoverableError("graph build lock poisoned"))?;
        // Another caller may have finished the build while we waited
        if let Some(snapshot) = self.current()? {
            return Ok(snapshot);
        }
        self.build_locked()
    }

    /// Builds a new snapshot from the repository and makes it current.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn rebuild(&self) -> Result<Arc<NetworkSnapshot>, Error> {
        let _guard = self
            .build_lock
            .lock()
            .map_err(|_| Error::UnrecoverableError("graph build lock poisoned"))?;
        self.build_locked()
    }

    /// Drops the current snapshot; the next [`GraphService::snapshot`]
    /// builds a new one.
    pub fn invalidate(&self) -> Result<(), Error> {
        let mut current = self
            .current
            .write()
            .map_err(|_| Error::UnrecoverableError("snapshot lock poisoned"))?;
        if current.take().is_some() {
            info!("Network snapshot invalidated");
        }
        Ok(())
    }

    fn current(&self) -> Result<Option<Arc<NetworkSnapshot>>, Error> {
        self.current
            .read()
            .map(|current| current.clone())
            .map_err(|_| Error::UnrecoverableError("snapshot lock poisoned"))
    }

    /// Must be called with the build lock held
    fn build_locked(&self) -> Result<Arc<NetworkSnapshot>, Error> {
        let generation = self.generation.load(Ordering::Acquire) + 1;
        let snapshot = Arc::new(NetworkSnapshot::build(
            &self.repository,
            &self.config,
            generation,
        )?);

        *self
            .current
            .write()
            .map_err(|_| Error::UnrecoverableError("snapshot lock poisoned"))? =
            Some(Arc::clone(&snapshot));
        self.generation.store(generation, Ordering::Release);
        Ok(snapshot)
    }
}
