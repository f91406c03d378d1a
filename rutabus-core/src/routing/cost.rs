//! Path scoring with transfer penalties.
//!
//! Walk arcs already carry the walk penalty in their weight, so the model
//! only has to add the transfer penalty at every boundary where the mode
//! changes or a bus ride continues on a different route.

use crate::model::{ArcKind, PlanningGraph, TransitArc};
use crate::routing::Path;
use crate::{PlannerConfig, TRANSFER_PENALTY};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub transfer_penalty: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(TRANSFER_PENALTY)
    }
}

impl CostModel {
    pub fn new(transfer_penalty: f64) -> Self {
        Self { transfer_penalty }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.transfer_penalty)
    }

    /// Moving from `prev` to `next` changes mode or bus route.
    ///
    /// Order changes within one route never count.
    pub fn is_transfer(prev: &ArcKind, next: &ArcKind) -> bool {
        !prev.same_service(next)
    }

    /// Number of transfer boundaries in a sequence of arcs
    pub fn transfers<'a, I>(arcs: I) -> usize
    where
        I: IntoIterator<Item = &'a TransitArc>,
    {
        let mut prev: Option<&ArcKind> = None;
        let mut count = 0;
        for arc in arcs {
            if prev.is_some_and(|p| Self::is_transfer(p, &arc.kind)) {
                count += 1;
            }
            prev = Some(&arc.kind);
        }
        count
    }

    /// Sum of arc weights plus one transfer penalty per boundary
    pub fn score<'a, I>(&self, arcs: I) -> f64
    where
        I: IntoIterator<Item = &'a TransitArc>,
    {
        let mut prev: Option<&ArcKind> = None;
        let mut total = 0.0;
        for arc in arcs {
            total += arc.weight;
            if prev.is_some_and(|p| Self::is_transfer(p, &arc.kind)) {
                total += self.transfer_penalty;
            }
            prev = Some(&arc.kind);
        }
        total
    }

    pub fn score_path(&self, graph: &PlanningGraph, path: &Path) -> f64 {
        self.score(path.arcs(graph))
    }
}
