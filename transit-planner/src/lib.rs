//! Timetable-to-graph transit planner.
//!
//! Compiles a single-day public transit schedule into a time-expanded
//! graph where every stop visit is a vertex, then answers
//! origin/destination queries with Dijkstra's algorithm and decodes the
//! shortest path into an itinerary of rides and walks.

pub mod domain;
pub mod graph;
pub mod network;
pub mod planner;
pub mod schedule;
