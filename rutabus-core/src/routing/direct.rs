//! Single-vehicle itineraries.
//!
//! A direct itinerary walks from the origin to a boarding stop, rides one
//! route in one direction, and walks from the alighting stop to the
//! destination. Boarding must come before alighting in the published stop
//! sequence. Every pair of stops is compared on ground meters; walking is
//! not penalized here.

use std::cmp::Ordering;
use std::sync::Arc;

use log::{debug, warn};
use petgraph::{Direction as GraphDirection, graph::NodeIndex, visit::EdgeRef};
use rayon::prelude::*;

use super::Path;
use super::dijkstra::{ShortestPathTree, shortest_path_tree};
use crate::model::{ArcKind, Direction, PlanningGraph, RouteStop, RouteStopIndex};
use crate::{Meters, PlannerConfig, RouteId, SearchLimits};

/// Stop reachable on foot, with the walk needed to reach it
type StopAccess = (NodeIndex, Meters, RouteStop);

#[derive(Debug, Clone)]
pub struct DirectItinerary {
    pub route_id: RouteId,
    pub route_name: Arc<str>,
    pub direction: Direction,
    pub boarding: NodeIndex,
    pub alighting: NodeIndex,
    pub boarding_order: u32,
    pub alighting_order: u32,
    /// Origin to boarding stop, on foot
    pub access: Path,
    /// Boarding to alighting stop, on the bus
    pub ride: Path,
    /// Alighting stop to destination, on foot
    pub egress: Path,
    pub access_m: Meters,
    pub ride_m: Meters,
    pub egress_m: Meters,
    /// Access, ride and egress meters added up
    pub score: f64,
}

impl DirectItinerary {
    /// Whole journey as one path
    pub fn path(&self) -> Path {
        self.access.clone().concat(&self.ride).concat(&self.egress)
    }
}

pub struct DirectRouteFinder<'a> {
    graph: &'a PlanningGraph,
    stops: &'a RouteStopIndex,
    max_access_walk_m: Meters,
    limits: SearchLimits,
}

impl<'a> DirectRouteFinder<'a> {
    pub fn new(
        graph: &'a PlanningGraph,
        stops: &'a RouteStopIndex,
        max_access_walk_m: Meters,
        limits: SearchLimits,
    ) -> Self {
        Self {
            graph,
            stops,
            max_access_walk_m,
            limits,
        }
    }

    pub fn from_config(
        graph: &'a PlanningGraph,
        stops: &'a RouteStopIndex,
        config: &PlannerConfig,
    ) -> Self {
        Self::new(graph, stops, config.max_access_walk_m, config.limits())
    }

    /// Cheapest single-route itinerary between two nodes.
    ///
    /// Boarding stops are the stops within walking range of the origin and
    /// alighting stops those within walking range of the destination. With
    /// a zero range only stops at the two nodes themselves are considered.
    pub fn find_direct(
        &self,
        origin: NodeIndex,
        destination: NodeIndex,
    ) -> Option<DirectItinerary> {
        let access = self.walk_tree(origin, GraphDirection::Outgoing)?;
        let egress = self.walk_tree(destination, GraphDirection::Incoming)?;

        let boardings = self.stops_reached(&access);
        let alightings = self.stops_reached(&egress);

        let groups: Vec<(StopAccess, Vec<StopAccess>)> = boardings
            .iter()
            .filter_map(|boarding| {
                let targets: Vec<StopAccess> = alightings
                    .iter()
                    .filter(|alighting| {
                        alighting.0 != boarding.0 && boarding.2.precedes(&alighting.2)
                    })
                    .copied()
                    .collect();
                (!targets.is_empty()).then(|| (*boarding, targets))
            })
            .collect();

        if groups.is_empty() {
            debug!(
                "No route serves both ends ({} boarding, {} alighting stops)",
                boardings.len(),
                alightings.len()
            );
            return None;
        }
        debug!("Evaluating {} direct boarding candidates", groups.len());

        groups
            .par_iter()
            .filter_map(|(boarding, targets)| self.best_ride(&access, &egress, boarding, targets))
            .min_by(compare_itineraries)
    }

    /// Walk-only reach around `start`, in ground meters
    fn walk_tree(&self, start: NodeIndex, direction: GraphDirection) -> Option<ShortestPathTree> {
        let mut budget = self.limits.budget();
        shortest_path_tree(
            self.graph,
            start,
            None,
            direction,
            Some(self.max_access_walk_m),
            |e| e.weight().kind.is_walk(),
            |arc| arc.distance,
            &mut budget,
        )
        .map_err(|_| warn!("Search budget exhausted while looking for stops near the endpoints"))
        .ok()
    }

    fn stops_reached(&self, tree: &ShortestPathTree) -> Vec<StopAccess> {
        tree.reached()
            .flat_map(|(node, walk_m)| {
                self.stops
                    .stops_at(node)
                    .iter()
                    .map(move |&stop| (node, walk_m, stop))
            })
            .collect()
    }

    /// Rides the boarding stop's route and direction to every target stop
    fn best_ride(
        &self,
        access: &ShortestPathTree,
        egress: &ShortestPathTree,
        boarding: &StopAccess,
        targets: &[StopAccess],
    ) -> Option<DirectItinerary> {
        let &(board_node, access_m, board_stop) = boarding;
        let mut budget = self.limits.budget();

        let ride_tree = match shortest_path_tree(
            self.graph,
            board_node,
            None,
            GraphDirection::Outgoing,
            None,
            |e| match &e.weight().kind {
                ArcKind::Bus {
                    route_id,
                    direction,
                    ..
                } => *route_id == board_stop.route_id && *direction == board_stop.direction,
                ArcKind::Walk => false,
            },
            |arc| arc.distance,
            &mut budget,
        ) {
            Ok(tree) => tree,
            Err(_) => {
                warn!(
                    "Search budget exhausted riding route {} ({})",
                    board_stop.route_id, board_stop.direction
                );
                return None;
            }
        };

        let access_path = access.path_to(self.graph, board_node)?;

        targets
            .iter()
            .filter_map(|&(alight_node, egress_m, alight_stop)| {
                let ride = ride_tree.path_to(self.graph, alight_node)?;
                let egress_path = egress.path_to(self.graph, alight_node)?;
                let route_name = match &self.graph.arc(*ride.arcs.first()?).kind {
                    ArcKind::Bus { route_name, .. } => Arc::clone(route_name),
                    ArcKind::Walk => return None,
                };
                let ride_m = ride.weight;

                Some(DirectItinerary {
                    route_id: board_stop.route_id,
                    route_name,
                    direction: board_stop.direction,
                    boarding: board_node,
                    alighting: alight_node,
                    boarding_order: board_stop.order,
                    alighting_order: alight_stop.order,
                    access: access_path.clone(),
                    ride,
                    egress: egress_path,
                    access_m,
                    ride_m,
                    egress_m,
                    score: access_m + ride_m + egress_m,
                })
            })
            .min_by(compare_itineraries)
    }
}

/// Lowest score first; ties go to the lowest route, direction and orders
fn compare_itineraries(a: &DirectItinerary, b: &DirectItinerary) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then(a.route_id.cmp(&b.route_id))
        .then(a.direction.cmp(&b.direction))
        .then(a.boarding_order.cmp(&b.boarding_order))
        .then(a.alighting_order.cmp(&b.alighting_order))
        .then(a.boarding.cmp(&b.boarding))
        .then(a.alighting.cmp(&b.alighting))
}
