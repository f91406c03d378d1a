//! Read-only access to the network records owned by the data store

mod memory;

pub use memory::InMemoryRepository;

use crate::model::{Edge, Node, Route, RouteEdge, RouteNode, RouteStop};
use crate::{Error, NodeId};

/// Source of the records the planning graph is built from.
///
/// Implementations return data consistent as of the call; retries, if any,
/// are their own business.
pub trait Repository: Send + Sync {
    /// Called before each graph build.
    ///
    /// Stores that cache a copy of their source re-read it here; stores
    /// that answer every query from the source keep the default.
    fn refresh(&self) -> Result<(), Error> {
        Ok(())
    }

    fn all_nodes(&self) -> Result<Vec<Node>, Error>;

    fn all_edges(&self) -> Result<Vec<Edge>, Error>;

    /// Every route edge together with the route it belongs to
    fn all_route_edges_with_route(&self) -> Result<Vec<(RouteEdge, Route)>, Error>;

    /// Routes stopping at a node, with direction and order
    fn route_nodes_for(&self, node: NodeId) -> Result<Vec<RouteStop>, Error>;

    /// Every route stop of the network.
    ///
    /// The default asks [`Repository::route_nodes_for`] once per node;
    /// stores that can list stops in bulk should override it.
    fn all_route_nodes(&self) -> Result<Vec<RouteNode>, Error> {
        let mut route_nodes = Vec::new();
        for node in self.all_nodes()? {
            route_nodes.extend(
                self.route_nodes_for(node.id)?
                    .into_iter()
                    .map(|stop| RouteNode {
                        route_id: stop.route_id,
                        node_id: node.id,
                        direction: stop.direction,
                        order: stop.order,
                    }),
            );
        }
        Ok(route_nodes)
    }
}

impl<R: Repository + ?Sized> Repository for std::sync::Arc<R> {
    fn refresh(&self) -> Result<(), Error> {
        (**self).refresh()
    }

    fn all_nodes(&self) -> Result<Vec<Node>, Error> {
        (**self).all_nodes()
    }

    fn all_edges(&self) -> Result<Vec<Edge>, Error> {
        (**self).all_edges()
    }

    fn all_route_edges_with_route(&self) -> Result<Vec<(RouteEdge, Route)>, Error> {
        (**self).all_route_edges_with_route()
    }

    fn route_nodes_for(&self, node: NodeId) -> Result<Vec<RouteStop>, Error> {
        (**self).route_nodes_for(node)
    }

    fn all_route_nodes(&self) -> Result<Vec<RouteNode>, Error> {
        (**self).all_route_nodes()
    }
}
