//! Adjacency-list digraph and Dijkstra shortest path.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::trace;

use super::error::GraphError;

/// Arc weight in seconds.
pub type Weight = u32;

/// Reserved weight meaning "unreachable". Never stored on an arc.
pub const INFINITE_WEIGHT: Weight = Weight::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Arc {
    to: usize,
    weight: Weight,
}

/// Result of a shortest-path query.
///
/// When the destination cannot be reached, `total` is [`INFINITE_WEIGHT`]
/// and `path` holds only the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub total: Weight,
    pub path: Vec<usize>,
}

impl ShortestPath {
    fn unreachable(destination: usize) -> Self {
        Self {
            total: INFINITE_WEIGHT,
            path: vec![destination],
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.total != INFINITE_WEIGHT
    }
}

/// Directed graph with non-negative weights stored as adjacency lists.
///
/// Duplicate arcs between the same pair of vertices are allowed. The arc
/// count is maintained by the mutators; callers cannot touch it.
#[derive(Debug, Clone, Default)]
pub struct WeightedDigraph {
    adjacency: Vec<Vec<Arc>>,
    arc_count: usize,
}

impl WeightedDigraph {
    /// Create a graph with `vertex_count` vertices and no arcs.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
            arc_count: 0,
        }
    }

    /// Change the number of vertices.
    ///
    /// Growing appends isolated vertices. Shrinking drops the last vertices
    /// together with their outgoing arcs; arcs *into* the dropped vertices
    /// must have been removed beforehand.
    pub fn resize(&mut self, vertex_count: usize) {
        if vertex_count < self.adjacency.len() {
            let dropped: usize = self.adjacency[vertex_count..].iter().map(Vec::len).sum();
            self.arc_count -= dropped;
        }
        self.adjacency.resize_with(vertex_count, Vec::new);
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arc_count
    }

    /// Number of arcs leaving `vertex`.
    pub fn out_degree(&self, vertex: usize) -> Result<usize, GraphError> {
        self.check_vertex(vertex)?;
        Ok(self.adjacency[vertex].len())
    }

    /// Add the arc `from -> to`.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if either vertex does not exist
    /// - `InvalidWeight` if `weight` is [`INFINITE_WEIGHT`]
    pub fn add_arc(&mut self, from: usize, to: usize, weight: Weight) -> Result<(), GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        if weight == INFINITE_WEIGHT {
            return Err(GraphError::InvalidWeight { from, to });
        }
        self.adjacency[from].push(Arc { to, weight });
        self.arc_count += 1;
        Ok(())
    }

    /// Remove one arc `from -> to`, the most recently added if there are
    /// several. The vertices themselves are never removed.
    pub fn remove_arc(&mut self, from: usize, to: usize) -> Result<(), GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        let arcs = &mut self.adjacency[from];
        let pos = arcs
            .iter()
            .rposition(|arc| arc.to == to)
            .ok_or(GraphError::NotFound { from, to })?;
        arcs.remove(pos);
        self.arc_count -= 1;
        Ok(())
    }

    /// Weight of the first arc `from -> to`.
    pub fn get_weight(&self, from: usize, to: usize) -> Result<Weight, GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.adjacency[from]
            .iter()
            .find(|arc| arc.to == to)
            .map(|arc| arc.weight)
            .ok_or(GraphError::NotFound { from, to })
    }

    /// Iterate over `(to, weight)` for every arc leaving `vertex`.
    pub fn arcs_from(&self, vertex: usize) -> impl Iterator<Item = (usize, Weight)> + '_ {
        self.adjacency
            .get(vertex)
            .into_iter()
            .flatten()
            .map(|arc| (arc.to, arc.weight))
    }

    /// Dijkstra's algorithm from `source` to `destination`.
    ///
    /// The frontier is a binary heap keyed by tentative distance, ties
    /// broken by push order. The search stops as soon as the destination
    /// is popped. A vertex is settled once and never relaxed again.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::graph::WeightedDigraph;
    ///
    /// let mut g = WeightedDigraph::new(3);
    /// g.add_arc(0, 1, 4).unwrap();
    /// g.add_arc(1, 2, 1).unwrap();
    /// g.add_arc(0, 2, 9).unwrap();
    ///
    /// let sp = g.shortest_path(0, 2).unwrap();
    /// assert_eq!(sp.total, 5);
    /// assert_eq!(sp.path, vec![0, 1, 2]);
    /// ```
    pub fn shortest_path(&self, source: usize, destination: usize) -> Result<ShortestPath, GraphError> {
        self.check_vertex(source)?;
        self.check_vertex(destination)?;

        if source == destination {
            return Ok(ShortestPath {
                total: 0,
                path: vec![destination],
            });
        }

        let n = self.adjacency.len();
        let mut distance = vec![INFINITE_WEIGHT; n];
        let mut predecessor: Vec<Option<usize>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut frontier: BinaryHeap<Reverse<(Weight, u64, usize)>> = BinaryHeap::new();
        let mut pushes: u64 = 0;

        distance[source] = 0;
        frontier.push(Reverse((0, pushes, source)));

        let mut popped = 0usize;
        while let Some(Reverse((dist, _, u))) = frontier.pop() {
            if settled[u] {
                continue;
            }
            settled[u] = true;
            popped += 1;

            if u == destination {
                break;
            }

            for arc in &self.adjacency[u] {
                if settled[arc.to] {
                    continue;
                }
                let Some(candidate) = dist.checked_add(arc.weight) else {
                    continue;
                };
                if candidate < distance[arc.to] {
                    distance[arc.to] = candidate;
                    predecessor[arc.to] = Some(u);
                    pushes += 1;
                    frontier.push(Reverse((candidate, pushes, arc.to)));
                }
            }
        }

        trace!(source, destination, settled = popped, pushes, "dijkstra finished");

        if distance[destination] == INFINITE_WEIGHT {
            return Ok(ShortestPath::unreachable(destination));
        }

        let mut path = vec![destination];
        let mut current = destination;
        while let Some(prev) = predecessor[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();

        Ok(ShortestPath {
            total: distance[destination],
            path,
        })
    }

    fn check_vertex(&self, vertex: usize) -> Result<(), GraphError> {
        if vertex >= self.adjacency.len() {
            return Err(GraphError::OutOfRange {
                vertex,
                vertex_count: self.adjacency.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeightedDigraph {
        let mut g = WeightedDigraph::new(5);
        g.add_arc(0, 1, 5).unwrap();
        g.add_arc(0, 2, 2).unwrap();
        g.add_arc(2, 1, 1).unwrap();
        g.add_arc(1, 3, 3).unwrap();
        g.add_arc(2, 3, 9).unwrap();
        g
    }

    #[test]
    fn new_graph_is_empty() {
        let g = WeightedDigraph::new(4);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.arc_count(), 0);
    }

    #[test]
    fn add_then_get_weight() {
        let mut g = WeightedDigraph::new(3);
        g.add_arc(0, 2, 42).unwrap();
        assert_eq!(g.get_weight(0, 2), Ok(42));
        assert_eq!(g.arc_count(), 1);
        assert_eq!(g.out_degree(0), Ok(1));
    }

    #[test]
    fn zero_weight_is_allowed() {
        let mut g = WeightedDigraph::new(2);
        g.add_arc(0, 1, 0).unwrap();
        assert_eq!(g.get_weight(0, 1), Ok(0));
    }

    #[test]
    fn remove_then_get_weight_fails() {
        let mut g = WeightedDigraph::new(3);
        g.add_arc(0, 2, 42).unwrap();
        g.remove_arc(0, 2).unwrap();
        assert_eq!(g.get_weight(0, 2), Err(GraphError::NotFound { from: 0, to: 2 }));
        assert_eq!(g.arc_count(), 0);
    }

    #[test]
    fn remove_missing_arc() {
        let mut g = WeightedDigraph::new(3);
        g.add_arc(0, 1, 1).unwrap();
        assert_eq!(g.remove_arc(0, 2), Err(GraphError::NotFound { from: 0, to: 2 }));
        assert_eq!(g.remove_arc(1, 0), Err(GraphError::NotFound { from: 1, to: 0 }));
        assert_eq!(g.arc_count(), 1);
    }

    #[test]
    fn remove_takes_most_recent_duplicate() {
        let mut g = WeightedDigraph::new(2);
        g.add_arc(0, 1, 10).unwrap();
        g.add_arc(0, 1, 20).unwrap();

        g.remove_arc(0, 1).unwrap();
        assert_eq!(g.get_weight(0, 1), Ok(10));

        g.remove_arc(0, 1).unwrap();
        assert!(g.get_weight(0, 1).is_err());
    }

    #[test]
    fn get_weight_returns_first_duplicate() {
        let mut g = WeightedDigraph::new(2);
        g.add_arc(0, 1, 10).unwrap();
        g.add_arc(0, 1, 20).unwrap();
        assert_eq!(g.get_weight(0, 1), Ok(10));
    }

    #[test]
    fn out_of_range_vertices() {
        let mut g = WeightedDigraph::new(2);
        let err = GraphError::OutOfRange {
            vertex: 2,
            vertex_count: 2,
        };
        assert_eq!(g.add_arc(0, 2, 1), Err(err.clone()));
        assert_eq!(g.add_arc(2, 0, 1), Err(err.clone()));
        assert_eq!(g.remove_arc(2, 0), Err(err.clone()));
        assert_eq!(g.get_weight(0, 2), Err(err.clone()));
        assert_eq!(g.shortest_path(0, 2), Err(err.clone()));
        assert_eq!(g.out_degree(2), Err(err));
        assert_eq!(g.arc_count(), 0);
    }

    #[test]
    fn infinite_weight_is_rejected() {
        let mut g = WeightedDigraph::new(2);
        assert_eq!(
            g.add_arc(0, 1, INFINITE_WEIGHT),
            Err(GraphError::InvalidWeight { from: 0, to: 1 })
        );
        assert_eq!(g.arc_count(), 0);
        g.add_arc(0, 1, INFINITE_WEIGHT - 1).unwrap();
    }

    #[test]
    fn resize_grows_and_shrinks() {
        let mut g = WeightedDigraph::new(2);
        g.add_arc(0, 1, 3).unwrap();

        g.resize(4);
        assert_eq!(g.vertex_count(), 4);
        g.add_arc(2, 0, 1).unwrap();
        g.add_arc(2, 1, 1).unwrap();
        g.add_arc(3, 0, 1).unwrap();
        assert_eq!(g.arc_count(), 4);

        g.resize(2);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.arc_count(), 1);
        assert_eq!(g.get_weight(0, 1), Ok(3));
    }

    #[test]
    fn same_source_and_destination() {
        let g = sample();
        for x in 0..g.vertex_count() {
            let sp = g.shortest_path(x, x).unwrap();
            assert_eq!(sp.total, 0);
            assert_eq!(sp.path, vec![x]);
        }
    }

    #[test]
    fn dijkstra_picks_cheaper_detour() {
        let g = sample();
        let sp = g.shortest_path(0, 3).unwrap();
        assert_eq!(sp.total, 6);
        assert_eq!(sp.path, vec![0, 2, 1, 3]);
    }

    #[test]
    fn unreachable_destination() {
        let g = sample();
        let sp = g.shortest_path(0, 4).unwrap();
        assert_eq!(sp.total, INFINITE_WEIGHT);
        assert_eq!(sp.path, vec![4]);
        assert!(!sp.is_reachable());

        // Arcs point one way only
        let sp = g.shortest_path(3, 0).unwrap();
        assert!(!sp.is_reachable());
        assert_eq!(sp.path, vec![0]);
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let mut g = WeightedDigraph::new(3);
        g.add_arc(0, 1, INFINITE_WEIGHT - 1).unwrap();
        g.add_arc(1, 2, INFINITE_WEIGHT - 1).unwrap();
        let sp = g.shortest_path(0, 2).unwrap();
        assert!(!sp.is_reachable());

        let sp = g.shortest_path(0, 1).unwrap();
        assert_eq!(sp.total, INFINITE_WEIGHT - 1);
    }

    #[test]
    fn totals_past_i32_range_stay_exact() {
        let mut g = WeightedDigraph::new(4);
        g.add_arc(0, 1, 3_000_000_000).unwrap();
        g.add_arc(1, 2, 1_000_000_000).unwrap();
        g.add_arc(0, 3, 2_000_000_000).unwrap();
        g.add_arc(3, 2, 2_100_000_000).unwrap();

        let sp = g.shortest_path(0, 2).unwrap();
        assert_eq!(sp.total, 4_000_000_000);
        assert_eq!(sp.path, vec![0, 1, 2]);
    }

    #[test]
    fn arcs_from_lists_outgoing() {
        let g = sample();
        let out: Vec<(usize, Weight)> = g.arcs_from(0).collect();
        assert_eq!(out, vec![(1, 5), (2, 2)]);
        assert_eq!(g.arcs_from(99).count(), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Random small graph: vertex count plus arcs with in-range endpoints.
    fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, Weight)>)> {
        (2usize..9).prop_flat_map(|n| {
            let arcs = prop::collection::vec((0..n, 0..n, 0u32..100), 0..30);
            (Just(n), arcs)
        })
    }

    /// Reference all-pairs distances by Bellman-Ford relaxation.
    fn reference_distances(n: usize, arcs: &[(usize, usize, Weight)], source: usize) -> Vec<u64> {
        let mut dist = vec![u64::MAX; n];
        dist[source] = 0;
        for _ in 0..n {
            for &(from, to, w) in arcs {
                if dist[from] != u64::MAX && dist[from] + u64::from(w) < dist[to] {
                    dist[to] = dist[from] + u64::from(w);
                }
            }
        }
        dist
    }

    proptest! {
        #[test]
        fn dijkstra_matches_reference((n, arcs) in graph_strategy()) {
            let mut g = WeightedDigraph::new(n);
            for &(from, to, w) in &arcs {
                g.add_arc(from, to, w).unwrap();
            }

            for source in 0..n {
                let expected = reference_distances(n, &arcs, source);
                for destination in 0..n {
                    let sp = g.shortest_path(source, destination).unwrap();
                    if expected[destination] == u64::MAX {
                        prop_assert_eq!(sp.total, INFINITE_WEIGHT);
                        prop_assert_eq!(sp.path, vec![destination]);
                    } else {
                        prop_assert_eq!(u64::from(sp.total), expected[destination]);
                        prop_assert_eq!(sp.path.first(), Some(&source));
                        prop_assert_eq!(sp.path.last(), Some(&destination));

                        // The path's own arcs must add up to the reported total
                        let mut sum = 0u64;
                        for pair in sp.path.windows(2) {
                            let cheapest = arcs
                                .iter()
                                .filter(|(f, t, _)| *f == pair[0] && *t == pair[1])
                                .map(|(_, _, w)| u64::from(*w))
                                .min();
                            prop_assert!(cheapest.is_some(), "path uses a missing arc");
                            sum += cheapest.unwrap_or_default();
                        }
                        prop_assert_eq!(sum, u64::from(sp.total));
                    }
                }
            }
        }

        #[test]
        fn arc_count_tracks_insertions_and_removals((n, arcs) in graph_strategy()) {
            let mut g = WeightedDigraph::new(n);
            for &(from, to, w) in &arcs {
                g.add_arc(from, to, w).unwrap();
            }
            prop_assert_eq!(g.arc_count(), arcs.len());

            for &(from, to, _) in arcs.iter().rev() {
                g.remove_arc(from, to).unwrap();
            }
            prop_assert_eq!(g.arc_count(), 0);
            for v in 0..n {
                prop_assert_eq!(g.out_degree(v).unwrap(), 0);
            }
        }
    }
}
