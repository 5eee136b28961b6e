//! Weighted directed graph with non-negative integer weights.
//!
//! General purpose: nothing here knows about timetables. Vertices are
//! `usize` indices, weights are whole seconds, and the one query is a
//! single-source single-target Dijkstra with path reconstruction.

mod digraph;
mod error;

pub use digraph::{INFINITE_WEIGHT, ShortestPath, Weight, WeightedDigraph};
pub use error::GraphError;
