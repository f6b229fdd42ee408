//! staffgraph-graph: Neo4j client for the employee graph.
//!
//! This crate is the single mutation point for the graph. Every tool maps
//! to one method on [`GraphClient`], and each method issues exactly one
//! parameterized Cypher statement on a pooled connection.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod schema;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use mutations::{OrphanPurge, ProjectAssignment};
pub use queries::{EmployeeEdge, Neighbor};
