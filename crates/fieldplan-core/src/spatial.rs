//! Nearest-neighbor index over a point set.
//!
//! Built per call (nearest-neighbor walk, coverage sampling) and dropped with it.

use crate::models::Point;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// R-tree of candidate points, each tagged with its position in the
/// candidate list it was built from.
pub struct CandidateIndex {
    tree: RTree<IndexedPoint>,
}

impl CandidateIndex {
    pub fn new(points: &[Point]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Index of the candidate closest to `query`, visited or not.
    pub fn nearest(&self, query: &Point) -> Option<usize> {
        self.tree
            .nearest_neighbor(&[query.x, query.y])
            .map(|entry| entry.data)
    }
}
