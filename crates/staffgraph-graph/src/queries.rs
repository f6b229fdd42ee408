//! Read operations for the employee graph.

use neo4rs::query;
use serde::{Deserialize, Serialize};

use staffgraph_core::{
    Attendance, Department, EdgeType, Employee, NodeLabel, Project, SalaryHistory,
};

use crate::client::{column, GraphClient, GraphError};

const GET_EMPLOYEE: &str = "MATCH (e:Employee {id: $id}) RETURN e";

const EMPLOYEE_GRAPH: &str = "MATCH (e:Employee {id: $id})-[r]->(n)
     RETURN e, r, type(r) AS rel_type, n, labels(n) AS labels";

/// A neighboring node reached over one outgoing employee relationship.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "label")]
pub enum Neighbor {
    Department(Department),
    Project(Project),
    Attendance(Attendance),
    SalaryHistory(SalaryHistory),
    Employee(Employee),
    Other { labels: Vec<String> },
}

/// One row of an employee's outgoing graph: the edge and what it points at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeEdge {
    pub employee: Employee,
    pub relationship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_on: Option<String>,
    pub neighbor: Neighbor,
}

impl GraphClient {
    /// Look up one employee. Returns `None` when no employee has this id.
    pub async fn get_employee(&self, id: i64) -> Result<Option<Employee>, GraphError> {
        let q = query(GET_EMPLOYEE).param("id", id);

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("e").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize employee: {e}"))
                })?;
                Ok(Some(employee_from_node(&node)?))
            }
            None => Ok(None),
        }
    }

    /// List employees ordered by id.
    ///
    /// With no `limit` every employee is returned; `offset` skips that many
    /// rows first.
    pub async fn get_all_employees(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Employee>, GraphError> {
        let q = query(&list_employees_statement(limit.is_some()))
            .param("offset", i64::from(offset.unwrap_or(0)))
            .param("limit", i64::from(limit.unwrap_or(0)));

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("e").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize employee: {e}"))
            })?;
            results.push(employee_from_node(&node)?);
        }
        tracing::debug!(count = results.len(), "Listed employees");
        Ok(results)
    }

    /// Every outgoing relationship of an employee, one row per edge.
    pub async fn get_employee_graph(&self, id: i64) -> Result<Vec<EmployeeEdge>, GraphError> {
        let q = query(EMPLOYEE_GRAPH).param("id", id);

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());

        for row in rows {
            let emp_node: neo4rs::Node = row.get("e").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize employee: {e}"))
            })?;
            let rel: neo4rs::Relation = row
                .get("r")
                .map_err(|e| GraphError::Serialization(format!("Failed to get relation: {e}")))?;
            let rel_type: String = column(&row, "rel_type")?;
            let neighbor_node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to get neighbor node: {e}"))
            })?;
            let labels: Vec<String> = column(&row, "labels")?;

            let assigned_on = match rel_type.parse::<EdgeType>() {
                Ok(EdgeType::AssignedTo) => rel.get::<String>("assigned_on").ok(),
                _ => None,
            };

            results.push(EmployeeEdge {
                employee: employee_from_node(&emp_node)?,
                relationship: rel_type,
                assigned_on,
                neighbor: neighbor_from_node(&neighbor_node, labels)?,
            });
        }

        Ok(results)
    }
}

fn list_employees_statement(paged: bool) -> String {
    let mut cypher = String::from("MATCH (e:Employee) RETURN e ORDER BY e.id SKIP $offset");
    if paged {
        cypher.push_str(" LIMIT $limit");
    }
    cypher
}

// ── Node Conversion ──────────────────────────────────────────────

fn prop<T>(node: &neo4rs::Node, label: NodeLabel, key: &str) -> Result<T, GraphError>
where
    T: for<'de> Deserialize<'de>,
{
    node.get::<T>(key).map_err(|e| {
        GraphError::Serialization(format!("{label}.{key} missing or mistyped: {e}"))
    })
}

/// Numeric properties written by other clients may be stored as integers.
fn number(node: &neo4rs::Node, label: NodeLabel, key: &str) -> Result<f64, GraphError> {
    match node.get::<f64>(key) {
        Ok(v) => Ok(v),
        Err(_) => prop::<i64>(node, label, key).map(|v| v as f64),
    }
}

pub(crate) fn employee_from_node(node: &neo4rs::Node) -> Result<Employee, GraphError> {
    let label = NodeLabel::Employee;
    Ok(Employee {
        id: prop(node, label, "id")?,
        first_name: prop(node, label, "first_name")?,
        last_name: prop(node, label, "last_name")?,
        email: prop(node, label, "email")?,
        phone: prop(node, label, "phone")?,
        designation: prop(node, label, "designation")?,
        salary: number(node, label, "salary")?,
        date_of_joining: prop(node, label, "date_of_joining")?,
        status: prop(node, label, "status")?,
    })
}

pub(crate) fn department_from_node(node: &neo4rs::Node) -> Result<Department, GraphError> {
    let label = NodeLabel::Department;
    Ok(Department {
        id: prop(node, label, "id")?,
        name: prop(node, label, "name")?,
        location: node.get::<String>("location").ok(),
    })
}

pub(crate) fn project_from_node(node: &neo4rs::Node) -> Result<Project, GraphError> {
    let label = NodeLabel::Project;
    Ok(Project {
        id: prop(node, label, "id")?,
        name: prop(node, label, "name")?,
    })
}

pub(crate) fn attendance_from_node(node: &neo4rs::Node) -> Result<Attendance, GraphError> {
    let label = NodeLabel::Attendance;
    Ok(Attendance {
        id: prop(node, label, "id")?,
        date: prop(node, label, "date")?,
        status: prop(node, label, "status")?,
    })
}

pub(crate) fn salary_history_from_node(node: &neo4rs::Node) -> Result<SalaryHistory, GraphError> {
    let label = NodeLabel::SalaryHistory;
    Ok(SalaryHistory {
        id: prop(node, label, "id")?,
        old_salary: number(node, label, "old_salary")?,
        new_salary: number(node, label, "new_salary")?,
        changed_on: prop(node, label, "changed_on")?,
    })
}

fn neighbor_from_node(node: &neo4rs::Node, labels: Vec<String>) -> Result<Neighbor, GraphError> {
    let known = labels.iter().find_map(|l| l.parse::<NodeLabel>().ok());
    let neighbor = match known {
        Some(NodeLabel::Department) => Neighbor::Department(department_from_node(node)?),
        Some(NodeLabel::Project) => Neighbor::Project(project_from_node(node)?),
        Some(NodeLabel::Attendance) => Neighbor::Attendance(attendance_from_node(node)?),
        Some(NodeLabel::SalaryHistory) => {
            Neighbor::SalaryHistory(salary_history_from_node(node)?)
        }
        Some(NodeLabel::Employee) => Neighbor::Employee(employee_from_node(node)?),
        None => Neighbor::Other { labels },
    };
    Ok(neighbor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_unbounded_without_limit() {
        let stmt = list_employees_statement(false);
        assert!(!stmt.contains("LIMIT"));
        assert!(stmt.contains("ORDER BY e.id"));

        let paged = list_employees_statement(true);
        assert!(paged.ends_with("SKIP $offset LIMIT $limit"));
    }

    #[test]
    fn graph_query_follows_outgoing_edges_only() {
        assert!(EMPLOYEE_GRAPH.contains("-[r]->(n)"));
        assert!(GET_EMPLOYEE.contains("$id"));
    }

    #[test]
    fn neighbor_serializes_with_label_tag() {
        let edge = EmployeeEdge {
            employee: Employee {
                id: 1,
                first_name: "Arun".to_string(),
                last_name: "Kumar".to_string(),
                email: "arun@example.com".to_string(),
                phone: "9876543210".to_string(),
                designation: "Software Engineer".to_string(),
                salary: 95000.0,
                date_of_joining: "2020-05-01".to_string(),
                status: "Active".to_string(),
            },
            relationship: "HAS_SALARY_HISTORY".to_string(),
            assigned_on: None,
            neighbor: Neighbor::SalaryHistory(SalaryHistory {
                id: "a4c1".to_string(),
                old_salary: 80000.0,
                new_salary: 95000.0,
                changed_on: "2024-01-01T00:00:00+00:00".to_string(),
            }),
        };

        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["neighbor"]["label"], "SalaryHistory");
        assert_eq!(json["neighbor"]["old_salary"], 80000.0);
        assert!(json.get("assigned_on").is_none());
    }
}
