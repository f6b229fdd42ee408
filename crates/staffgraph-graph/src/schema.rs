//! Neo4j schema initialization (uniqueness constraints).

use neo4rs::query;

use staffgraph_core::NodeLabel;

use crate::client::{GraphClient, GraphError};

/// A uniqueness constraint on one property of one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: &'static str,
    pub label: NodeLabel,
    pub property: &'static str,
}

impl UniqueConstraint {
    /// The idempotent Cypher statement declaring this constraint.
    pub fn statement(&self) -> String {
        format!(
            "CREATE CONSTRAINT {name} IF NOT EXISTS FOR (n:{label}) REQUIRE n.{property} IS UNIQUE",
            name = self.name,
            label = self.label.as_str(),
            property = self.property,
        )
    }
}

/// Constraints applied at startup, in order.
pub const SCHEMA_CONSTRAINTS: &[UniqueConstraint] = &[
    UniqueConstraint {
        name: "department_id_unique",
        label: NodeLabel::Department,
        property: "id",
    },
    UniqueConstraint {
        name: "department_name_unique",
        label: NodeLabel::Department,
        property: "name",
    },
    UniqueConstraint {
        name: "employee_id_unique",
        label: NodeLabel::Employee,
        property: "id",
    },
    UniqueConstraint {
        name: "employee_email_unique",
        label: NodeLabel::Employee,
        property: "email",
    },
    UniqueConstraint {
        name: "project_id_unique",
        label: NodeLabel::Project,
        property: "id",
    },
    UniqueConstraint {
        name: "attendance_id_unique",
        label: NodeLabel::Attendance,
        property: "id",
    },
    UniqueConstraint {
        name: "salary_history_id_unique",
        label: NodeLabel::SalaryHistory,
        property: "id",
    },
];

impl GraphClient {
    /// Declare every uniqueness constraint.
    ///
    /// Safe to run multiple times: each statement uses IF NOT EXISTS.
    /// Returns the number of statements executed.
    pub async fn apply_schema(&self) -> Result<usize, GraphError> {
        tracing::info!("Setting up Neo4j schema");

        for constraint in SCHEMA_CONSTRAINTS {
            tracing::debug!(constraint = constraint.name, "Ensuring constraint");
            self.run(query(&constraint.statement())).await?;
        }

        tracing::info!(
            statements = SCHEMA_CONSTRAINTS.len(),
            "Neo4j schema initialized"
        );
        Ok(SCHEMA_CONSTRAINTS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for c in SCHEMA_CONSTRAINTS {
            let stmt = c.statement();
            assert!(stmt.contains("IF NOT EXISTS"), "{stmt}");
            assert!(stmt.ends_with("IS UNIQUE"), "{stmt}");
        }
    }

    #[test]
    fn covers_each_key_attribute() {
        let pairs: Vec<(&str, &str)> = SCHEMA_CONSTRAINTS
            .iter()
            .map(|c| (c.label.as_str(), c.property))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Department", "id"),
                ("Department", "name"),
                ("Employee", "id"),
                ("Employee", "email"),
                ("Project", "id"),
                ("Attendance", "id"),
                ("SalaryHistory", "id"),
            ]
        );
    }

    #[test]
    fn statement_text() {
        assert_eq!(
            SCHEMA_CONSTRAINTS[3].statement(),
            "CREATE CONSTRAINT employee_email_unique IF NOT EXISTS FOR (n:Employee) REQUIRE n.email IS UNIQUE"
        );
    }
}
