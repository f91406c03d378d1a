//! General search over the combined walk + bus graph.
//!
//! Candidates are generated by raw graph weight and then re-ranked with the
//! cost model: transfer penalties depend on the whole path, so the locally
//! cheapest path is not always the best one once transfers are counted.

use log::debug;
use petgraph::graph::NodeIndex;

use super::cost::CostModel;
use super::yen::k_shortest_paths;
use super::Path;
use crate::SearchLimits;
use crate::model::PlanningGraph;

/// Path together with its cost-model score
#[derive(Debug, Clone)]
pub struct ScoredPath {
    pub path: Path,
    /// Penalized score
    pub cost: f64,
    pub transfers: usize,
    /// Position in raw-weight order among the candidates
    pub rank: usize,
}

/// Best of up to `max_candidates` raw-weight shortest simple paths.
///
/// Returns `None` when the nodes are disconnected or the search budget ran
/// out before any path was found.
pub fn find_best(
    graph: &PlanningGraph,
    cost_model: &CostModel,
    origin: NodeIndex,
    destination: NodeIndex,
    max_candidates: usize,
    limits: &SearchLimits,
) -> Option<ScoredPath> {
    let mut budget = limits.budget();
    let candidates = k_shortest_paths(graph, origin, destination, max_candidates, &mut budget);

    let best = candidates
        .into_iter()
        .enumerate()
        .map(|(rank, path)| ScoredPath {
            cost: cost_model.score_path(graph, &path),
            transfers: CostModel::transfers(path.arcs(graph)),
            rank,
            path,
        })
        .min_by(|a, b| a.cost.total_cmp(&b.cost).then(a.rank.cmp(&b.rank)))?;

    debug!(
        "Selected candidate #{} with cost {:.1} and {} transfers",
        best.rank, best.cost, best.transfers
    );
    Some(best)
}
