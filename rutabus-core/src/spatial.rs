//! Nearest-node lookup over graph coordinates.
//!
//! Queries run in two stages: the R-tree is searched with a lon/lat envelope
//! that is guaranteed to contain every point within the radius, then the
//! candidates are measured with the Haversine formula. Degree distance is
//! never used for ranking, so results do not drift with latitude.

use geo::{Distance, Haversine, Point};
use rstar::{AABB, RTree, primitives::GeomWithData};

use crate::model::PlanningGraph;
use crate::{Meters, NodeId};
use petgraph::graph::NodeIndex;

/// Mean Earth radius used by [`Haversine`]
const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub type IndexedPoint = GeomWithData<[f64; 2], (NodeIndex, NodeId)>;

/// R-tree over the graph's nodes
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    pub fn new(graph: &PlanningGraph) -> Self {
        let points = graph
            .graph
            .node_indices()
            .map(|idx| {
                let node = graph.node(idx);
                GeomWithData::new([node.lon(), node.lat()], (idx, node.id))
            })
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest node within `max_radius` meters.
    ///
    /// Exact distance ties go to the lowest node id.
    pub fn nearest(&self, point: Point<f64>, max_radius: Meters) -> Option<(NodeIndex, Meters)> {
        self.within(point, max_radius).into_iter().next()
    }

    /// All nodes within `radius` meters, closest first
    pub fn within(&self, point: Point<f64>, radius: Meters) -> Vec<(NodeIndex, Meters)> {
        if !radius.is_finite() || radius < 0.0 {
            return Vec::new();
        }
        let envelope = search_envelope(point, radius);
        let mut found: Vec<(NodeIndex, NodeId, Meters)> = self
            .tree
            .locate_in_envelope(&envelope)
            .filter_map(|entry| {
                let [lon, lat] = *entry.geom();
                let distance = Haversine.distance(point, Point::new(lon, lat));
                let (idx, id) = entry.data;
                (distance <= radius).then_some((idx, id, distance))
            })
            .collect();

        found.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(idx, _, d)| (idx, d)).collect()
    }
}

/// Lon/lat box containing the spherical cap of `radius` around `point`
fn search_envelope(point: Point<f64>, radius: Meters) -> AABB<[f64; 2]> {
    let angular = radius / EARTH_RADIUS_M;
    let lat = point.y();
    // Small margin so points exactly on the circle survive rounding
    let dlat = angular.to_degrees() * 1.000_001 + 1e-9;

    let dlon = if lat.abs() + dlat >= 90.0 || angular >= std::f64::consts::FRAC_PI_2 {
        180.0
    } else {
        let ratio = angular.sin() / lat.to_radians().cos();
        if ratio >= 1.0 {
            180.0
        } else {
            ratio.asin().to_degrees() * 1.000_001 + 1e-9
        }
    };

    AABB::from_corners(
        [point.x() - dlon, (lat - dlat).max(-90.0)],
        [point.x() + dlon, (lat + dlat).min(90.0)],
    )
}
