//! Write operations for the employee graph.
//!
//! Departments and projects use MERGE (upsert) semantics keyed by id.
//! Employees are created once; a repeated id or email is rejected by the
//! uniqueness constraints. Operations that attach to an existing node
//! return [`GraphError::NotFound`] when that node is absent, and in that
//! case nothing is written.

use chrono::Utc;
use neo4rs::{query, BoltType};
use serde::{Deserialize, Serialize};

use staffgraph_core::{
    Attendance, Department, Employee, EmployeeField, FieldValue, NewEmployee, NodeLabel, Project,
    RecordId, SalaryHistory,
};

use crate::client::{column, GraphClient, GraphError};
use crate::queries::{
    attendance_from_node, department_from_node, employee_from_node, project_from_node,
    salary_history_from_node,
};

const UPSERT_DEPARTMENT: &str = "MERGE (d:Department {id: $id})
     SET d.name = $name, d.location = $location
     RETURN d";

const CREATE_EMPLOYEE: &str = "MATCH (d:Department {id: $department_id})
     CREATE (e:Employee {
       id: $id, first_name: $first_name, last_name: $last_name,
       email: $email, phone: $phone, designation: $designation,
       salary: $salary, date_of_joining: $date_of_joining, status: $status
     })
     CREATE (e)-[:WORKS_IN]->(d)
     RETURN e";

const DELETE_EMPLOYEE: &str = "MATCH (e:Employee {id: $id})
     DETACH DELETE e
     RETURN count(e) AS cnt";

const ASSIGN_PROJECT: &str = "MATCH (e:Employee {id: $employee_id})
     MERGE (p:Project {id: $project_id})
     SET p.name = $project_name
     MERGE (e)-[r:ASSIGNED_TO]->(p)
     ON CREATE SET r.assigned_on = $today
     RETURN p, r.assigned_on AS assigned_on";

const ADD_ATTENDANCE: &str = "MATCH (e:Employee {id: $employee_id})
     CREATE (a:Attendance {id: $attendance_id, date: $today, status: $status})
     CREATE (e)-[:HAS_ATTENDANCE]->(a)
     RETURN a";

const ADD_SALARY_CHANGE: &str = "MATCH (e:Employee {id: $employee_id})
     CREATE (s:SalaryHistory {
       id: $history_id, old_salary: e.salary,
       new_salary: $new_salary, changed_on: $changed_on
     })
     SET e.salary = $new_salary
     CREATE (e)-[:HAS_SALARY_HISTORY]->(s)
     RETURN s";

const PURGE_ORPHANS: &str = "MATCH (n)
     WHERE (n:Attendance OR n:SalaryHistory) AND NOT EXISTS { ()-->(n) }
     WITH n, CASE WHEN n:Attendance THEN 'Attendance' ELSE 'SalaryHistory' END AS label
     DETACH DELETE n
     RETURN label, count(*) AS cnt";

/// Result of assigning an employee to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectAssignment {
    pub employee_id: i64,
    pub project: Project,
    /// Date of the first assignment; repeat assignments keep it.
    pub assigned_on: String,
}

/// Counts of unowned records removed by [`GraphClient::purge_orphaned_records`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrphanPurge {
    pub attendance: i64,
    pub salary_history: i64,
}

impl OrphanPurge {
    pub fn total(&self) -> i64 {
        self.attendance + self.salary_history
    }
}

impl GraphClient {
    // ── Departments ──────────────────────────────────────────────

    /// Upsert a department by id, overwriting name and location.
    pub async fn create_department(
        &self,
        id: i64,
        name: &str,
        location: Option<&str>,
    ) -> Result<Department, GraphError> {
        let q = query(UPSERT_DEPARTMENT)
            .param("id", id)
            .param("name", name.to_string())
            .param("location", location.map(str::to_string));

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Department, id))?;
        let node: neo4rs::Node = row
            .get("d")
            .map_err(|e| GraphError::Serialization(format!("Failed to get department: {e}")))?;

        tracing::info!(department_id = id, name, "Department upserted");
        department_from_node(&node)
    }

    // ── Employees ────────────────────────────────────────────────

    /// Create an employee and its WORKS_IN edge.
    ///
    /// Fails with `NotFound` (and writes nothing) when the department does
    /// not exist, and with `ConstraintViolation` on a duplicate id or email.
    pub async fn create_employee(&self, emp: &NewEmployee) -> Result<Employee, GraphError> {
        let q = query(CREATE_EMPLOYEE)
            .param("id", emp.id)
            .param("first_name", emp.first_name.clone())
            .param("last_name", emp.last_name.clone())
            .param("email", emp.email.clone())
            .param("phone", emp.phone.clone())
            .param("designation", emp.designation.clone())
            .param("salary", emp.salary)
            .param("date_of_joining", emp.date_of_joining.clone())
            .param("status", emp.status.clone())
            .param("department_id", emp.department_id);

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Department, emp.department_id))?;
        let node: neo4rs::Node = row
            .get("e")
            .map_err(|e| GraphError::Serialization(format!("Failed to get employee: {e}")))?;

        tracing::info!(
            employee_id = emp.id,
            department_id = emp.department_id,
            "Employee created"
        );
        employee_from_node(&node)
    }

    /// Set one allow-listed property on an employee.
    ///
    /// `field` is validated before any statement is sent; the property name
    /// in the statement always comes from [`EmployeeField::property`].
    pub async fn update_employee(
        &self,
        id: i64,
        field: &str,
        value: &str,
    ) -> Result<Employee, GraphError> {
        let field: EmployeeField = field.parse()?;
        let bolt = match field.parse_value(value)? {
            FieldValue::Text(s) => BoltType::from(s),
            FieldValue::Number(n) => BoltType::from(n),
        };
        let q = query(&update_field_statement(field))
            .param("id", id)
            .param("value", bolt);

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Employee, id))?;
        let node: neo4rs::Node = row
            .get("e")
            .map_err(|e| GraphError::Serialization(format!("Failed to get employee: {e}")))?;

        tracing::info!(employee_id = id, field = field.property(), "Employee updated");
        employee_from_node(&node)
    }

    /// Detach-delete an employee. Returns the number of nodes removed
    /// (0 when no employee has this id).
    ///
    /// Attendance and salary history nodes are left in place.
    pub async fn delete_employee(&self, id: i64) -> Result<i64, GraphError> {
        let q = query(DELETE_EMPLOYEE).param("id", id);

        let deleted = match self.query_one(q).await? {
            Some(row) => column::<i64>(&row, "cnt")?,
            None => 0,
        };

        tracing::info!(employee_id = id, deleted, "Employee delete executed");
        Ok(deleted)
    }

    // ── Relationships ────────────────────────────────────────────

    /// Upsert a project and assign the employee to it.
    ///
    /// The ASSIGNED_TO edge is created at most once per pair; `assigned_on`
    /// is set when the edge is first created.
    pub async fn assign_project(
        &self,
        employee_id: i64,
        project_id: i64,
        project_name: &str,
    ) -> Result<ProjectAssignment, GraphError> {
        let q = query(ASSIGN_PROJECT)
            .param("employee_id", employee_id)
            .param("project_id", project_id)
            .param("project_name", project_name.to_string())
            .param("today", today());

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Employee, employee_id))?;
        let node: neo4rs::Node = row
            .get("p")
            .map_err(|e| GraphError::Serialization(format!("Failed to get project: {e}")))?;
        let assigned_on: String = column(&row, "assigned_on")?;

        tracing::info!(employee_id, project_id, "Project assigned");
        Ok(ProjectAssignment {
            employee_id,
            project: project_from_node(&node)?,
            assigned_on,
        })
    }

    /// Append an attendance record for today.
    pub async fn add_attendance(
        &self,
        employee_id: i64,
        status: &str,
    ) -> Result<Attendance, GraphError> {
        let q = query(ADD_ATTENDANCE)
            .param("employee_id", employee_id)
            .param("attendance_id", RecordId::new().to_string())
            .param("today", today())
            .param("status", status.to_string());

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Employee, employee_id))?;
        let node: neo4rs::Node = row
            .get("a")
            .map_err(|e| GraphError::Serialization(format!("Failed to get attendance: {e}")))?;

        tracing::info!(employee_id, status, "Attendance recorded");
        attendance_from_node(&node)
    }

    /// Record a salary change and update the employee's current salary.
    ///
    /// The history node captures the salary read in the same statement that
    /// writes the new value.
    pub async fn add_salary_change(
        &self,
        employee_id: i64,
        new_salary: f64,
    ) -> Result<SalaryHistory, GraphError> {
        if !new_salary.is_finite() {
            return Err(staffgraph_core::CoreError::InvalidValue {
                field: EmployeeField::Salary.property().to_string(),
                value: new_salary.to_string(),
                reason: "salary must be finite".to_string(),
            }
            .into());
        }

        let q = query(ADD_SALARY_CHANGE)
            .param("employee_id", employee_id)
            .param("history_id", RecordId::new().to_string())
            .param("new_salary", new_salary)
            .param("changed_on", Utc::now().to_rfc3339());

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Employee, employee_id))?;
        let node: neo4rs::Node = row.get("s").map_err(|e| {
            GraphError::Serialization(format!("Failed to get salary history: {e}"))
        })?;

        let history = salary_history_from_node(&node)?;
        tracing::info!(
            employee_id,
            old_salary = history.old_salary,
            new_salary,
            "Salary changed"
        );
        Ok(history)
    }

    // ── Maintenance ──────────────────────────────────────────────

    /// Delete attendance and salary history nodes no employee points at.
    pub async fn purge_orphaned_records(&self) -> Result<OrphanPurge, GraphError> {
        let rows = self.query_rows(query(PURGE_ORPHANS)).await?;

        let mut purge = OrphanPurge::default();
        for row in rows {
            let label: String = column(&row, "label")?;
            let cnt: i64 = column(&row, "cnt")?;
            match label.parse::<NodeLabel>() {
                Ok(NodeLabel::Attendance) => purge.attendance += cnt,
                Ok(NodeLabel::SalaryHistory) => purge.salary_history += cnt,
                _ => {}
            }
        }

        if purge.total() > 0 {
            tracing::info!(
                attendance = purge.attendance,
                salary_history = purge.salary_history,
                "Purged orphaned records"
            );
        }
        Ok(purge)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build the SET statement for one allow-listed employee field.
fn update_field_statement(field: EmployeeField) -> String {
    format!(
        "MATCH (e:Employee {{id: $id}})
         SET e.{property} = $value
         RETURN e",
        property = field.property()
    )
}

/// Today's UTC calendar date as `YYYY-MM-DD`.
fn today() -> String {
    Utc::now().date_naive().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_statement_uses_allow_listed_property() {
        for field in EmployeeField::ALL {
            let stmt = update_field_statement(field);
            assert!(stmt.contains(&format!("SET e.{} = $value", field.property())));
            assert!(stmt.contains("{id: $id}"));
        }
    }

    #[test]
    fn employee_creation_is_conditional_on_department() {
        assert!(CREATE_EMPLOYEE.starts_with("MATCH (d:Department {id: $department_id})"));
        assert!(CREATE_EMPLOYEE.contains("CREATE (e)-[:WORKS_IN]->(d)"));
        assert!(CREATE_EMPLOYEE.trim_end().ends_with("RETURN e"));
    }

    #[test]
    fn assignment_keeps_first_assigned_on() {
        assert!(ASSIGN_PROJECT.contains("MERGE (e)-[r:ASSIGNED_TO]->(p)"));
        assert!(ASSIGN_PROJECT.contains("ON CREATE SET r.assigned_on = $today"));
        assert!(!ASSIGN_PROJECT.contains("ON MATCH"));
    }

    #[test]
    fn salary_history_reads_before_write() {
        let read = ADD_SALARY_CHANGE.find("old_salary: e.salary").unwrap();
        let write = ADD_SALARY_CHANGE.find("SET e.salary = $new_salary").unwrap();
        assert!(read < write);
    }

    #[test]
    fn attendance_is_always_created() {
        assert!(ADD_ATTENDANCE.contains("CREATE (a:Attendance"));
        assert!(!ADD_ATTENDANCE.contains("MERGE"));
    }

    #[test]
    fn department_upsert_overwrites_fields() {
        assert!(UPSERT_DEPARTMENT.starts_with("MERGE (d:Department {id: $id})"));
        assert!(UPSERT_DEPARTMENT.contains("SET d.name = $name, d.location = $location"));
    }

    #[test]
    fn today_is_iso_date() {
        let d = today();
        assert_eq!(d.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn orphan_purge_total() {
        let purge = OrphanPurge {
            attendance: 3,
            salary_history: 2,
        };
        assert_eq!(purge.total(), 5);
    }
}
