//! Planning requests from coordinates to itineraries.

use log::{debug, info};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::cost::CostModel;
use super::direct::DirectRouteFinder;
use super::itinerary::{Coordinate, JourneyPlan};
use super::multimodal::find_best;
use super::transfer_search::TransferRoute;
use super::Path;
use crate::service::NetworkSnapshot;
use crate::{Endpoint, Error, PlannerConfig};

/// Origin and destination of a journey.
///
/// Both are optional so that a missing field is reported as invalid input
/// rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub origin: Option<Coordinate>,
    pub destination: Option<Coordinate>,
}

impl PlanRequest {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin: Some(origin),
            destination: Some(destination),
        }
    }

    /// Both coordinates, checked for range.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when a coordinate is missing, not finite or
    /// out of range.
    pub fn validate(&self) -> Result<(Coordinate, Coordinate), Error> {
        let (Some(origin), Some(destination)) = (self.origin, self.destination) else {
            return Err(Error::InvalidInput(
                "origin and destination are required".into(),
            ));
        };
        check_coordinate(origin, Endpoint::Origin)?;
        check_coordinate(destination, Endpoint::Destination)?;
        Ok((origin, destination))
    }
}

fn check_coordinate(coordinate: Coordinate, endpoint: Endpoint) -> Result<(), Error> {
    let Coordinate { lat, lng } = coordinate;
    if !lat.is_finite() || !lng.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{endpoint} coordinates must be numbers"
        )));
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(Error::InvalidInput(format!(
            "{endpoint} coordinates out of range: ({lat}, {lng})"
        )));
    }
    Ok(())
}

/// Plans journeys against one network snapshot
pub struct JourneyPlanner<'a> {
    snapshot: &'a NetworkSnapshot,
    config: &'a PlannerConfig,
    cost_model: CostModel,
}

impl<'a> JourneyPlanner<'a> {
    pub fn new(snapshot: &'a NetworkSnapshot, config: &'a PlannerConfig) -> Self {
        Self {
            snapshot,
            config,
            cost_model: CostModel::from_config(config),
        }
    }

    /// Best itinerary between two coordinates.
    ///
    /// With `prefer_direct` a single-route itinerary is returned whenever
    /// one exists. Otherwise the direct and the general search compete on
    /// the cost model.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`], [`Error::NoNearbyNode`] or
    /// [`Error::NoPathFound`].
    pub fn plan(&self, request: &PlanRequest) -> Result<JourneyPlan, Error> {
        let (origin, destination) = request.validate()?;
        let start = self.resolve(origin, Endpoint::Origin)?;
        let end = self.resolve(destination, Endpoint::Destination)?;
        let graph = &self.snapshot.graph;

        if start == end {
            debug!("Origin and destination resolve to node {}", graph.node(start).id);
            return Ok(self.compose(&Path::trivial(start), false, 0.0));
        }

        let direct = DirectRouteFinder::from_config(graph, &self.snapshot.stops, self.config)
            .find_direct(start, end)
            .map(|itinerary| {
                let path = itinerary.path();
                let cost = self.cost_model.score_path(graph, &path);
                debug!(
                    "Direct candidate on route {} ({}) scores {:.1} m, cost {:.1}",
                    itinerary.route_id, itinerary.direction, itinerary.score, cost
                );
                (path, cost)
            });

        if self.config.prefer_direct
            && let Some((path, cost)) = &direct
        {
            info!("Direct itinerary found, cost {cost:.1}");
            return Ok(self.compose(path, true, *cost));
        }

        let general = find_best(
            graph,
            &self.cost_model,
            start,
            end,
            self.config.max_candidates,
            &self.config.limits(),
        );

        match (direct, general) {
            (Some((path, cost)), Some(best)) if cost <= best.cost => {
                Ok(self.compose(&path, true, cost))
            }
            (_, Some(best)) => {
                info!(
                    "Multi-modal itinerary found, cost {:.1}, {} transfers",
                    best.cost, best.transfers
                );
                Ok(self.compose(&best.path, false, best.cost))
            }
            (Some((path, cost)), None) => Ok(self.compose(&path, true, cost)),
            (None, None) => Err(Error::NoPathFound),
        }
    }

    /// Nearest graph node to a coordinate within the search radius.
    ///
    /// # Errors
    ///
    /// [`Error::NoNearbyNode`] naming the endpoint.
    pub fn resolve(&self, coordinate: Coordinate, endpoint: Endpoint) -> Result<NodeIndex, Error> {
        self.snapshot
            .spatial
            .nearest(coordinate.to_point(), self.config.search_radius_m)
            .map(|(node, distance)| {
                debug!(
                    "{endpoint} snapped to node {} at {distance:.0} m",
                    self.snapshot.graph.node(node).id
                );
                node
            })
            .ok_or(Error::NoNearbyNode { endpoint })
    }

    /// Bus-only journeys with a bounded number of route changes.
    ///
    /// # Errors
    ///
    /// As [`JourneyPlanner::plan`]; an empty result is [`Error::NoPathFound`].
    pub fn transfer_routes(&self, request: &PlanRequest) -> Result<Vec<TransferRoute>, Error> {
        let (origin, destination) = request.validate()?;
        let start = self.resolve(origin, Endpoint::Origin)?;
        let end = self.resolve(destination, Endpoint::Destination)?;
        let graph = &self.snapshot.graph;

        let routes = self.snapshot.route_network.find_routes_with_transfers(
            graph.node(start).id,
            graph.node(end).id,
            self.config.max_paths,
            self.config.max_transfers,
            &mut self.config.limits().budget(),
        );
        if routes.is_empty() {
            return Err(Error::NoPathFound);
        }
        Ok(routes)
    }

    fn compose(&self, path: &Path, direct_route: bool, cost: f64) -> JourneyPlan {
        JourneyPlan::compose(&self.snapshot.graph, &self.snapshot.routes, path, direct_route, cost)
    }
}
