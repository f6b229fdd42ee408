//! staffgraph-core: Shared types, configuration, and error handling for staffgraph.
//!
//! This crate provides the foundational types used across all staffgraph crates:
//! - Node types (Department, Employee, Project, Attendance, SalaryHistory)
//! - Edge types (WorksIn, AssignedTo, ...) for graph relationships
//! - The allow-list of mutable employee fields
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{
    Attendance, Department, EdgeType, Employee, EmployeeField, FieldValue, NewEmployee, NodeLabel,
    Project, RecordId, SalaryHistory,
};
