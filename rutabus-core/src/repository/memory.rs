use geo::LineString;
use hashbrown::HashMap;
use std::sync::RwLock;

use super::Repository;
use crate::model::{Direction, Edge, Node, Route, RouteEdge, RouteNode, RouteStop};
use crate::{EdgeId, Error, Meters, NodeId, RouteId};

#[derive(Debug, Default, Clone)]
struct Records {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    routes: Vec<Route>,
    route_edges: Vec<RouteEdge>,
    route_nodes: Vec<RouteNode>,
}

/// Repository backed by owned vectors.
///
/// Records can be added after construction, which is how tests exercise
/// snapshot rebuilds.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<Records>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        routes: Vec<Route>,
        route_edges: Vec<RouteEdge>,
        route_nodes: Vec<RouteNode>,
    ) -> Self {
        Self {
            records: RwLock::new(Records {
                nodes,
                edges,
                routes,
                route_edges,
                route_nodes,
            }),
        }
    }

    pub fn add_node(&self, id: NodeId, lat: f64, lon: f64) -> &Self {
        self.write(|r| r.nodes.push(Node::new(id, id.to_string(), lat, lon)));
        self
    }

    /// Adds a street edge drawn as a straight segment between its nodes.
    ///
    /// Unknown endpoints get an empty geometry.
    pub fn add_edge(&self, id: EdgeId, source: NodeId, target: NodeId, distance: Meters) -> &Self {
        self.write(|r| {
            let position = |node_id| {
                r.nodes
                    .iter()
                    .find(|n| n.id == node_id)
                    .map(|n| n.geometry.0)
            };
            let geometry = match (position(source), position(target)) {
                (Some(a), Some(b)) => LineString::new(vec![a, b]),
                _ => LineString::new(vec![]),
            };
            r.edges.push(Edge {
                id,
                source,
                target,
                distance,
                geometry,
            });
        });
        self
    }

    pub fn add_route(&self, route: Route) -> &Self {
        self.write(|r| r.routes.push(route));
        self
    }

    pub fn add_route_edge(
        &self,
        route_id: RouteId,
        edge_id: EdgeId,
        direction: Direction,
        order: u32,
    ) -> &Self {
        self.write(|r| {
            r.route_edges.push(RouteEdge {
                route_id,
                edge_id,
                direction,
                order,
            });
        });
        self
    }

    pub fn add_route_node(
        &self,
        route_id: RouteId,
        node_id: NodeId,
        direction: Direction,
        order: u32,
    ) -> &Self {
        self.write(|r| {
            r.route_nodes.push(RouteNode {
                route_id,
                node_id,
                direction,
                order,
            });
        });
        self
    }

    pub fn node_count(&self) -> usize {
        self.read(|r| r.nodes.len()).unwrap_or(0)
    }

    /// Swaps in every record of `other`
    pub fn replace(&self, other: InMemoryRepository) {
        let records = other
            .records
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.write(|r| *r = records);
    }

    fn write(&self, f: impl FnOnce(&mut Records)) {
        // A poisoned lock only means another writer panicked mid-push;
        // the vectors themselves are still usable.
        let mut guard = self
            .records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard);
    }

    fn read<T>(&self, f: impl FnOnce(&Records) -> T) -> Result<T, Error> {
        let guard = self
            .records
            .read()
            .map_err(|_| Error::Repository("record store lock poisoned".into()))?;
        Ok(f(&guard))
    }
}

impl Repository for InMemoryRepository {
    fn all_nodes(&self) -> Result<Vec<Node>, Error> {
        self.read(|r| r.nodes.clone())
    }

    fn all_edges(&self) -> Result<Vec<Edge>, Error> {
        self.read(|r| r.edges.clone())
    }

    fn all_route_edges_with_route(&self) -> Result<Vec<(RouteEdge, Route)>, Error> {
        self.read(|r| {
            let routes: HashMap<RouteId, &Route> =
                r.routes.iter().map(|rt| (rt.id, rt)).collect();
            r.route_edges
                .iter()
                .map(|re| {
                    let route = routes.get(&re.route_id).map_or_else(
                        || Route::new(re.route_id, re.route_id.to_string()),
                        |rt| (*rt).clone(),
                    );
                    (*re, route)
                })
                .collect()
        })
    }

    fn route_nodes_for(&self, node: NodeId) -> Result<Vec<RouteStop>, Error> {
        self.read(|r| {
            r.route_nodes
                .iter()
                .filter(|rn| rn.node_id == node)
                .map(RouteNode::stop)
                .collect()
        })
    }

    fn all_route_nodes(&self) -> Result<Vec<RouteNode>, Error> {
        self.read(|r| r.route_nodes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_route_node_listing_matches_bulk_listing() {
        struct PerNode(InMemoryRepository);

        impl Repository for PerNode {
            fn all_nodes(&self) -> Result<Vec<Node>, Error> {
                self.0.all_nodes()
            }
            fn all_edges(&self) -> Result<Vec<Edge>, Error> {
                self.0.all_edges()
            }
            fn all_route_edges_with_route(&self) -> Result<Vec<(RouteEdge, Route)>, Error> {
                self.0.all_route_edges_with_route()
            }
            fn route_nodes_for(&self, node: NodeId) -> Result<Vec<RouteStop>, Error> {
                self.0.route_nodes_for(node)
            }
        }

        let repo = InMemoryRepository::new();
        repo.add_node(1, 0.0, 0.0)
            .add_node(2, 0.0, 0.001)
            .add_route_node(5, 1, Direction::Outbound, 0)
            .add_route_node(5, 2, Direction::Outbound, 1);

        let per_node = PerNode(repo);
        let listed = per_node.all_route_nodes().unwrap();
        assert_eq!(listed, per_node.0.all_route_nodes().unwrap());
    }

    #[test]
    fn route_edges_carry_their_route() {
        let repo = InMemoryRepository::new();
        repo.add_node(1, 0.0, 0.0)
            .add_node(2, 0.0, 0.001)
            .add_edge(10, 1, 2, 111.0)
            .add_route(Route::new(3, "Line 3"))
            .add_route_edge(3, 10, Direction::Outbound, 0);

        let with_route = repo.all_route_edges_with_route().unwrap();
        assert_eq!(with_route.len(), 1);
        assert_eq!(with_route[0].1.name, "Line 3");
        assert_eq!(repo.all_edges().unwrap()[0].geometry.0.len(), 2);
    }
}
