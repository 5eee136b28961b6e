//! Bijection between graph vertices and stop visits.

use std::collections::HashMap;

use crate::domain::StopVisitId;

/// What a vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitRef {
    /// A visit from the schedule's arena
    Scheduled(StopVisitId),
    /// The current query's origin point
    Origin,
    /// The current query's destination point
    Destination,
}

/// Two-way map between vertices and the visits they represent.
///
/// Vertices are handed out densely from 0, so the vertex-to-visit side is
/// a plain vector. Only the most recent vertices can be released.
#[derive(Debug, Clone, Default)]
pub struct VertexIndex {
    by_vertex: Vec<VisitRef>,
    by_visit: HashMap<VisitRef, usize>,
}

impl VertexIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_vertex: Vec::with_capacity(capacity),
            by_visit: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.by_vertex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_vertex.is_empty()
    }

    /// Give `visit` the next vertex. A visit already indexed keeps its vertex.
    pub fn push(&mut self, visit: VisitRef) -> usize {
        if let Some(&vertex) = self.by_visit.get(&visit) {
            return vertex;
        }
        let vertex = self.by_vertex.len();
        self.by_vertex.push(visit);
        self.by_visit.insert(visit, vertex);
        vertex
    }

    /// Release the highest vertex and its mapping.
    pub fn pop(&mut self) -> Option<VisitRef> {
        let visit = self.by_vertex.pop()?;
        self.by_visit.remove(&visit);
        Some(visit)
    }

    pub fn vertex_of(&self, visit: VisitRef) -> Option<usize> {
        self.by_visit.get(&visit).copied()
    }

    pub fn visit_at(&self, vertex: usize) -> Option<VisitRef> {
        self.by_vertex.get(vertex).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_dense_vertices() {
        let mut idx = VertexIndex::default();
        assert_eq!(idx.push(VisitRef::Scheduled(StopVisitId(7))), 0);
        assert_eq!(idx.push(VisitRef::Scheduled(StopVisitId(2))), 1);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.vertex_of(VisitRef::Scheduled(StopVisitId(2))), Some(1));
        assert_eq!(idx.visit_at(0), Some(VisitRef::Scheduled(StopVisitId(7))));
    }

    #[test]
    fn push_is_idempotent_per_visit() {
        let mut idx = VertexIndex::default();
        idx.push(VisitRef::Origin);
        assert_eq!(idx.push(VisitRef::Origin), 0);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn pop_erases_both_directions() {
        let mut idx = VertexIndex::with_capacity(4);
        idx.push(VisitRef::Scheduled(StopVisitId(0)));
        idx.push(VisitRef::Origin);
        idx.push(VisitRef::Destination);

        assert_eq!(idx.pop(), Some(VisitRef::Destination));
        assert_eq!(idx.pop(), Some(VisitRef::Origin));
        assert_eq!(idx.vertex_of(VisitRef::Origin), None);
        assert_eq!(idx.visit_at(1), None);
        assert_eq!(idx.len(), 1);

        idx.pop();
        assert!(idx.is_empty());
        assert_eq!(idx.pop(), None);
    }
}
