//! Lattice graph over integer field coordinates and A* search on it.
//!
//! Obstacle removal is inclusive (`d² <= r²`), which is stricter than the
//! continuous validity check of [`Field::is_valid`].

use crate::error::{PlanError, Result};
use crate::field::Field;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Lattice node `(i, j)` with `0 <= i < width`, `0 <= j < height`.
pub type Node = (usize, usize);

/// 4-connected grid graph with obstacle nodes removed.
#[derive(Debug, Clone)]
pub struct LatticeGraph {
    width: usize,
    height: usize,
    removed: Vec<bool>,
    removed_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    node: Node,
    g_score: usize,
    f_score: usize,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| other.g_score.cmp(&self.g_score))
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl LatticeGraph {
    /// Build the lattice spanning `field` and drop every node inside or on
    /// an obstacle disc. Obstacles with a non-positive radius are ignored.
    ///
    /// Fails with [`PlanError::Internal`] when the lattice would exceed
    /// `max_lattice_nodes` or cannot be allocated.
    pub fn build(field: &Field) -> Result<Self> {
        let width = lattice_extent(field.width());
        let height = lattice_extent(field.height());
        let limit = field.config().max_lattice_nodes;
        let nodes = width
            .checked_mul(height)
            .filter(|&n| n <= limit)
            .ok_or_else(|| {
                PlanError::Internal(format!(
                    "lattice for a {}x{} field exceeds {} nodes",
                    field.width(),
                    field.height(),
                    limit
                ))
            })?;

        let mut removed = Vec::new();
        removed
            .try_reserve_exact(nodes)
            .map_err(|err| PlanError::Internal(format!("cannot allocate lattice of {nodes} nodes: {err}")))?;
        removed.resize(nodes, false);

        let mut graph = Self {
            width,
            height,
            removed,
            removed_count: 0,
        };

        for obstacle in field.obstacles() {
            let radius = obstacle.radius;
            if !(radius > 0.0) || width == 0 || height == 0 {
                continue;
            }
            let Some((i_min, i_max)) = window(obstacle.x, radius, width) else {
                continue;
            };
            let Some((j_min, j_max)) = window(obstacle.y, radius, height) else {
                continue;
            };
            let radius2 = radius * radius;
            for i in i_min..=i_max {
                for j in j_min..=j_max {
                    let dx = i as f64 - obstacle.x;
                    let dy = j as f64 - obstacle.y;
                    if dx * dx + dy * dy <= radius2 {
                        graph.remove((i, j));
                    }
                }
            }
        }

        tracing::debug!(
            width,
            height,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            removed = graph.removed_count,
            "built lattice graph"
        );
        Ok(graph)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn node_count(&self) -> usize {
        self.width * self.height - self.removed_count
    }

    pub fn edge_count(&self) -> usize {
        let mut edges = 0;
        for i in 0..self.width {
            for j in 0..self.height {
                if !self.contains((i, j)) {
                    continue;
                }
                if self.contains((i + 1, j)) {
                    edges += 1;
                }
                if self.contains((i, j + 1)) {
                    edges += 1;
                }
            }
        }
        edges
    }

    pub fn contains(&self, node: Node) -> bool {
        let (i, j) = node;
        i < self.width && j < self.height && !self.removed[self.offset(node)]
    }

    /// Present 4-neighbors of `node`.
    pub fn neighbors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        let (i, j) = node;
        [
            i.checked_sub(1).map(|i| (i, j)),
            Some((i + 1, j)),
            j.checked_sub(1).map(|j| (i, j)),
            Some((i, j + 1)),
        ]
        .into_iter()
        .flatten()
        .filter(move |n| self.contains(*n))
    }

    /// Shortest 4-connected route from `start` to `end`, inclusive of both.
    ///
    /// `None` when either node is absent or they are disconnected.
    pub fn shortest_path(&self, start: Node, end: Node) -> Option<Vec<Node>> {
        if !self.contains(start) || !self.contains(end) {
            return None;
        }

        let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
        open_set.push(Reverse(OpenNode {
            node: start,
            g_score: 0,
            f_score: manhattan(start, end),
        }));
        let mut closed_set: HashSet<Node> = HashSet::new();
        let mut g_score: HashMap<Node, usize> = HashMap::new();
        let mut came_from: HashMap<Node, Node> = HashMap::new();
        g_score.insert(start, 0);

        let mut nodes_visited = 0usize;
        let mut found = false;

        while let Some(Reverse(current)) = open_set.pop() {
            if closed_set.contains(&current.node) {
                continue;
            }
            let best_g = g_score.get(&current.node).copied().unwrap_or(usize::MAX);
            if current.g_score > best_g {
                continue;
            }

            nodes_visited += 1;
            if current.node == end {
                found = true;
                break;
            }
            closed_set.insert(current.node);

            for next in self.neighbors(current.node) {
                if closed_set.contains(&next) {
                    continue;
                }
                let tentative_g = best_g + 1;
                if tentative_g < g_score.get(&next).copied().unwrap_or(usize::MAX) {
                    came_from.insert(next, current.node);
                    g_score.insert(next, tentative_g);
                    open_set.push(Reverse(OpenNode {
                        node: next,
                        g_score: tentative_g,
                        f_score: tentative_g + manhattan(next, end),
                    }));
                }
            }
        }

        tracing::debug!(nodes_visited, found, "A* search finished");
        if !found {
            return None;
        }

        let mut path = vec![end];
        let mut current = end;
        while let Some(&previous) = came_from.get(&current) {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }

    fn offset(&self, (i, j): Node) -> usize {
        j * self.width + i
    }

    fn remove(&mut self, node: Node) {
        let offset = self.offset(node);
        if !self.removed[offset] {
            self.removed[offset] = true;
            self.removed_count += 1;
        }
    }
}

fn manhattan(a: Node, b: Node) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Number of integer coordinates `k >= 0` with `k < extent`, saturating at
/// `usize::MAX` for huge or infinite extents.
fn lattice_extent(extent: f64) -> usize {
    if extent > 0.0 {
        extent.ceil() as usize
    } else {
        0
    }
}

/// Clamped index range covering `center ± radius` on an axis of `len` nodes.
fn window(center: f64, radius: f64, len: usize) -> Option<(usize, usize)> {
    let lo = (center - radius).floor().max(0.0);
    let hi = (center + radius).ceil().min((len - 1) as f64);
    if !(lo <= hi) {
        return None;
    }
    Some((lo as usize, hi as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_lattice_has_grid_counts() {
        let graph = LatticeGraph::build(&Field::new(4.0, 3.0)).unwrap();
        assert_eq!(graph.node_count(), 12);
        // 3 horizontal edges per row * 3 rows + 4 columns * 2 vertical edges
        assert_eq!(graph.edge_count(), 17);
        assert!(graph.contains((3, 2)));
        assert!(!graph.contains((4, 0)));
    }

    #[test]
    fn fractional_extent_rounds_up() {
        let graph = LatticeGraph::build(&Field::new(2.5, 1.2)).unwrap();
        assert_eq!(graph.width(), 3);
        assert_eq!(graph.height(), 2);
    }

    #[test]
    fn obstacle_removal_is_inclusive() {
        let mut field = Field::new(10.0, 10.0);
        field.add_obstacle(5.0, 5.0, 2.0);
        let graph = LatticeGraph::build(&field).unwrap();
        assert!(!graph.contains((5, 5)));
        // Exactly on the rim: removed here, valid for Field::is_valid.
        assert!(!graph.contains((7, 5)));
        assert!(field.is_valid(7.0, 5.0));
        assert!(graph.contains((8, 5)));
        assert!(graph.contains((7, 7)));
        // 13 lattice points satisfy dx² + dy² <= 4
        assert_eq!(graph.node_count(), 100 - 13);
    }

    #[test]
    fn out_of_field_obstacle_removes_nothing() {
        let mut field = Field::new(5.0, 5.0);
        field.add_obstacle(-20.0, 40.0, 3.0);
        field.add_obstacle(2.0, 2.0, 0.0);
        let graph = LatticeGraph::build(&field).unwrap();
        assert_eq!(graph.node_count(), 25);
    }

    #[test]
    fn neighbors_skip_removed_and_out_of_range() {
        let mut field = Field::new(3.0, 3.0);
        field.add_obstacle(1.0, 0.0, 0.5);
        let graph = LatticeGraph::build(&field).unwrap();
        let mut around: Vec<Node> = graph.neighbors((0, 0)).collect();
        around.sort();
        assert_eq!(around, vec![(0, 1)]);
    }

    #[test]
    fn shortest_path_is_manhattan_on_open_grid() {
        let graph = LatticeGraph::build(&Field::new(10.0, 10.0)).unwrap();
        let path = graph.shortest_path((0, 0), (6, 3)).unwrap();
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(6, 3)));
        assert_eq!(path.len(), 10);
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn shortest_path_detours_around_obstacle() {
        let mut field = Field::new(11.0, 11.0);
        field.add_obstacle(5.0, 5.0, 2.0);
        let graph = LatticeGraph::build(&field).unwrap();
        let path = graph.shortest_path((1, 5), (9, 5)).unwrap();
        assert!(path.iter().all(|n| graph.contains(*n)));
        assert!(path.len() > 9);
    }

    #[test]
    fn enclosed_node_has_no_path() {
        // A ring of obstacles around (5, 5) leaves the center cut off.
        let mut field = Field::new(11.0, 11.0);
        for (x, y) in [(5.0, 3.0), (5.0, 7.0), (3.0, 5.0), (7.0, 5.0), (4.0, 4.0), (6.0, 6.0), (4.0, 6.0), (6.0, 4.0)] {
            field.add_obstacle(x, y, 1.0);
        }
        let graph = LatticeGraph::build(&field).unwrap();
        assert!(graph.contains((5, 5)));
        assert_eq!(graph.shortest_path((0, 0), (5, 5)), None);
    }

    #[test]
    fn absent_nodes_have_no_path() {
        let mut field = Field::new(5.0, 5.0);
        field.add_obstacle(2.0, 2.0, 1.0);
        let graph = LatticeGraph::build(&field).unwrap();
        assert_eq!(graph.shortest_path((0, 0), (2, 2)), None);
        assert_eq!(graph.shortest_path((0, 0), (9, 9)), None);
    }

    #[test]
    fn oversized_lattice_is_an_internal_error() {
        let err = LatticeGraph::build(&Field::new(1e10, 1e10)).unwrap_err();
        assert!(matches!(err, PlanError::Internal(_)), "{err:?}");
        assert!(!err.is_validation());

        let err = LatticeGraph::build(&Field::new(f64::INFINITY, 2.0)).unwrap_err();
        assert!(matches!(err, PlanError::Internal(_)), "{err:?}");
    }

    #[test]
    fn lattice_limit_comes_from_config() {
        let config = crate::config::PlannerConfig {
            max_lattice_nodes: 99,
            ..Default::default()
        };
        assert!(LatticeGraph::build(&Field::with_config(10.0, 10.0, config.clone())).is_err());
        let config = crate::config::PlannerConfig {
            max_lattice_nodes: 100,
            ..config
        };
        assert_eq!(LatticeGraph::build(&Field::with_config(10.0, 10.0, config)).unwrap().node_count(), 100);
    }

    #[test]
    fn start_equal_to_end_is_single_node() {
        let graph = LatticeGraph::build(&Field::new(3.0, 3.0)).unwrap();
        assert_eq!(graph.shortest_path((1, 1), (1, 1)), Some(vec![(1, 1)]));
    }
}
