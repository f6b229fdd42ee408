//! MCP tool modules.
//!
//! Tools are grouped by effect: graph mutations and graph reads.

pub mod mutations;
pub mod queries;
