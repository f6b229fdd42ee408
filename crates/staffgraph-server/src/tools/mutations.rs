use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars, tool, tool_router, ErrorData,
};
use serde::{Deserialize, Serialize};

use staffgraph_core::types::default_status;
use staffgraph_core::NewEmployee;
use staffgraph_graph::OrphanPurge;

use crate::{map_graph_err, StaffGraphMcp};

/// Parameters for creating or updating a department.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateDepartmentParams {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
}

/// Parameters for creating an employee.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateEmployeeParams {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department_id: i64,
    pub designation: String,
    pub salary: f64,
    /// ISO date, e.g. 2020-05-01.
    pub date_of_joining: String,
    /// Defaults to "Active".
    #[serde(default = "default_status")]
    pub status: String,
}

impl From<CreateEmployeeParams> for NewEmployee {
    fn from(p: CreateEmployeeParams) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            phone: p.phone,
            department_id: p.department_id,
            designation: p.designation,
            salary: p.salary,
            date_of_joining: p.date_of_joining,
            status: p.status,
        }
    }
}

/// Parameters for setting one employee field.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UpdateEmployeeParams {
    pub id: i64,
    /// One of: first_name, last_name, email, phone, designation, salary,
    /// date_of_joining, status.
    pub field: String,
    pub value: String,
}

/// Parameters identifying an employee.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DeleteEmployeeParams {
    pub id: i64,
}

/// Parameters for assigning an employee to a project.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AssignProjectParams {
    pub employee_id: i64,
    pub project_id: i64,
    pub project_name: String,
}

/// Parameters for recording attendance.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddAttendanceParams {
    pub employee_id: i64,
    pub status: String,
}

/// Parameters for changing an employee's salary.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddSalaryChangeParams {
    pub employee_id: i64,
    pub new_salary: f64,
}

#[tool_router(router = tool_router_mutations, vis = "pub")]
impl StaffGraphMcp {
    #[tool(description = "Create a department, or overwrite the name and location of an existing one.")]
    async fn create_department(
        &self,
        Parameters(params): Parameters<CreateDepartmentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let dept = self
            .graph()
            .create_department(params.id, &params.name, params.location.as_deref())
            .await
            .map_err(|e| map_graph_err("create_department", e))?;
        Ok(text(format!("Department '{}' created.", dept.name)))
    }

    #[tool(description = "Create an employee in an existing department. Fails if the id or email is taken or the department does not exist.")]
    async fn create_employee(
        &self,
        Parameters(params): Parameters<CreateEmployeeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let new_employee = NewEmployee::from(params);
        self.graph()
            .create_employee(&new_employee)
            .await
            .map_err(|e| map_graph_err("create_employee", e))?;
        Ok(text(format!(
            "Employee {} created.",
            new_employee.full_name()
        )))
    }

    #[tool(description = "Set one employee field. Allowed fields: first_name, last_name, email, phone, designation, salary, date_of_joining, status.")]
    async fn update_employee(
        &self,
        Parameters(params): Parameters<UpdateEmployeeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        self.graph()
            .update_employee(params.id, &params.field, &params.value)
            .await
            .map_err(|e| map_graph_err("update_employee", e))?;
        Ok(text(format!(
            "Employee {} updated: {} = {}",
            params.id, params.field, params.value
        )))
    }

    #[tool(description = "Delete an employee and all of its relationships.")]
    async fn delete_employee(
        &self,
        Parameters(params): Parameters<DeleteEmployeeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let deleted = self
            .graph()
            .delete_employee(params.id)
            .await
            .map_err(|e| map_graph_err("delete_employee", e))?;
        Ok(text(deleted_message(params.id, deleted)))
    }

    #[tool(description = "Assign an employee to a project, creating or renaming the project. Repeat assignments keep the original date. assigned_on is stored as an ISO YYYY-MM-DD string, not a Neo4j date.")]
    async fn assign_project(
        &self,
        Parameters(params): Parameters<AssignProjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let assignment = self
            .graph()
            .assign_project(params.employee_id, params.project_id, &params.project_name)
            .await
            .map_err(|e| map_graph_err("assign_project", e))?;
        Ok(text(format!(
            "Employee {} assigned to project {}",
            assignment.employee_id, assignment.project.name
        )))
    }

    #[tool(description = "Record today's attendance for an employee. The date is stored as an ISO YYYY-MM-DD string (UTC), not a Neo4j date.")]
    async fn add_attendance(
        &self,
        Parameters(params): Parameters<AddAttendanceParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let attendance = self
            .graph()
            .add_attendance(params.employee_id, &params.status)
            .await
            .map_err(|e| map_graph_err("add_attendance", e))?;
        Ok(text(format!(
            "Attendance recorded: {} on {}.",
            attendance.status, attendance.date
        )))
    }

    #[tool(description = "Change an employee's salary and keep the previous value in salary history. changed_on is stored as an RFC 3339 string (UTC), not a Neo4j datetime.")]
    async fn add_salary_change(
        &self,
        Parameters(params): Parameters<AddSalaryChangeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let history = self
            .graph()
            .add_salary_change(params.employee_id, params.new_salary)
            .await
            .map_err(|e| map_graph_err("add_salary_change", e))?;
        Ok(text(format!(
            "Salary updated: {} -> {}.",
            history.old_salary, history.new_salary
        )))
    }

    #[tool(description = "Delete attendance and salary history records that no longer belong to any employee.")]
    async fn purge_orphaned_records(&self) -> Result<CallToolResult, ErrorData> {
        let purge = self
            .graph()
            .purge_orphaned_records()
            .await
            .map_err(|e| map_graph_err("purge_orphaned_records", e))?;
        Ok(text(purge_message(&purge)))
    }
}

fn text(message: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message)])
}

fn deleted_message(id: i64, deleted: i64) -> String {
    if deleted > 0 {
        format!("Employee {id} deleted.")
    } else {
        format!("Employee {id} not found; nothing deleted.")
    }
}

fn purge_message(purge: &OrphanPurge) -> String {
    format!(
        "Removed {} orphaned records ({} attendance, {} salary history).",
        purge.total(),
        purge.attendance,
        purge.salary_history
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_employee_params_default_status() {
        let params: CreateEmployeeParams = serde_json::from_value(serde_json::json!({
            "id": 3, "first_name": "John", "last_name": "Doe",
            "email": "john@example.com", "phone": "9000000001",
            "department_id": 1, "designation": "Developer",
            "salary": 90000, "date_of_joining": "2021-06-10"
        }))
        .unwrap();
        let emp = NewEmployee::from(params);
        assert_eq!(emp.status, "Active");
        assert_eq!(emp.department_id, 1);
        assert_eq!(emp.full_name(), "John Doe");
    }

    #[test]
    fn department_location_is_optional() {
        let params: CreateDepartmentParams =
            serde_json::from_value(serde_json::json!({"id": 9, "name": "Legal"})).unwrap();
        assert!(params.location.is_none());
    }

    #[test]
    fn delete_message_distinguishes_missing() {
        assert_eq!(deleted_message(4, 1), "Employee 4 deleted.");
        assert_eq!(deleted_message(4, 0), "Employee 4 not found; nothing deleted.");
    }

    #[test]
    fn purge_message_counts() {
        let purge = OrphanPurge {
            attendance: 2,
            salary_history: 1,
        };
        assert_eq!(
            purge_message(&purge),
            "Removed 3 orphaned records (2 attendance, 1 salary history)."
        );
    }
}
