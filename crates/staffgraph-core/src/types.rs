//! Core domain types for the staffgraph employee graph.
//!
//! These types mirror the nodes and relationships stored in Neo4j.
//! Integer ids are caller-assigned; attendance and salary history
//! records get a generated [`RecordId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ── Generated Ids ─────────────────────────────────────────────────

/// Identifier for records the service creates on the caller's behalf
/// (attendance entries, salary history entries).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ── Labels ────────────────────────────────────────────────────────

/// Node labels used in the graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    Department,
    Employee,
    Project,
    Attendance,
    SalaryHistory,
}

impl NodeLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Department => "Department",
            Self::Employee => "Employee",
            Self::Project => "Project",
            Self::Attendance => "Attendance",
            Self::SalaryHistory => "SalaryHistory",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Department" => Ok(Self::Department),
            "Employee" => Ok(Self::Employee),
            "Project" => Ok(Self::Project),
            "Attendance" => Ok(Self::Attendance),
            "SalaryHistory" => Ok(Self::SalaryHistory),
            other => Err(format!("unknown node label: {other}")),
        }
    }
}

// ── Node Types ────────────────────────────────────────────────────

/// An organizational department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
}

/// Input for creating an employee. `department_id` names the department
/// the employee WORKS_IN; it is not stored on the node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEmployee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department_id: i64,
    pub designation: String,
    pub salary: f64,
    pub date_of_joining: String,
    #[serde(default = "default_status")]
    pub status: String,
}

impl NewEmployee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An employee node as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub salary: f64,
    pub date_of_joining: String,
    pub status: String,
}

/// A project employees can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

/// One attendance entry. `date` is an ISO-8601 calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attendance {
    pub id: String,
    pub date: String,
    pub status: String,
}

/// An append-only record of a salary change. `changed_on` is RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalaryHistory {
    pub id: String,
    pub old_salary: f64,
    pub new_salary: f64,
    pub changed_on: String,
}

/// Status given to employees when the caller does not supply one.
pub const DEFAULT_STATUS: &str = "Active";

pub fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

// ── Edge Types ────────────────────────────────────────────────────

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    WorksIn,
    AssignedTo,
    HasAttendance,
    HasSalaryHistory,
}

impl EdgeType {
    pub const ALL: [Self; 4] = [
        Self::WorksIn,
        Self::AssignedTo,
        Self::HasAttendance,
        Self::HasSalaryHistory,
    ];

    /// The Cypher relationship type.
    pub const fn cypher(self) -> &'static str {
        match self {
            Self::WorksIn => "WORKS_IN",
            Self::AssignedTo => "ASSIGNED_TO",
            Self::HasAttendance => "HAS_ATTENDANCE",
            Self::HasSalaryHistory => "HAS_SALARY_HISTORY",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cypher())
    }
}

impl FromStr for EdgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|edge| edge.cypher() == s)
            .ok_or_else(|| format!("unknown relationship type: {s}"))
    }
}

// ── Mutable Employee Fields ───────────────────────────────────────

/// The closed set of employee properties `update_employee` may write.
///
/// Caller-supplied field names are parsed into this enum and only the
/// static property name returned by [`EmployeeField::property`] ever reaches
/// a Cypher statement. `id` is never writable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeField {
    FirstName,
    LastName,
    Email,
    Phone,
    Designation,
    Salary,
    DateOfJoining,
    Status,
}

/// A validated value for an [`EmployeeField`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 8] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Designation,
        Self::Salary,
        Self::DateOfJoining,
        Self::Status,
    ];

    /// The Neo4j property name written by this field.
    pub const fn property(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Designation => "designation",
            Self::Salary => "salary",
            Self::DateOfJoining => "date_of_joining",
            Self::Status => "status",
        }
    }

    /// Comma-separated list of every accepted field name.
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|f| f.property())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Convert a raw caller value into the type stored for this field.
    pub fn parse_value(self, raw: &str) -> Result<FieldValue, CoreError> {
        match self {
            Self::Salary => {
                let salary: f64 = raw.trim().parse().map_err(|_| CoreError::InvalidValue {
                    field: self.property().to_string(),
                    value: raw.to_string(),
                    reason: "expected a number".to_string(),
                })?;
                if !salary.is_finite() {
                    return Err(CoreError::InvalidValue {
                        field: self.property().to_string(),
                        value: raw.to_string(),
                        reason: "salary must be finite".to_string(),
                    });
                }
                Ok(FieldValue::Number(salary))
            }
            _ => Ok(FieldValue::Text(raw.to_string())),
        }
    }
}

impl FromStr for EmployeeField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.property() == s)
            .ok_or_else(|| CoreError::InvalidField {
                field: s.to_string(),
                allowed: Self::allowed_names(),
            })
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_employee_defaults_status_to_active() {
        let json = r#"{
            "id": 1, "first_name": "Arun", "last_name": "Kumar",
            "email": "arun@example.com", "phone": "9876543210",
            "department_id": 1, "designation": "Software Engineer",
            "salary": 80000, "date_of_joining": "2020-05-01"
        }"#;
        let emp: NewEmployee = serde_json::from_str(json).unwrap();
        assert_eq!(emp.status, "Active");
        assert_eq!(emp.salary, 80000.0);
        assert_eq!(emp.full_name(), "Arun Kumar");
    }

    #[test]
    fn edge_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&EdgeType::HasSalaryHistory).unwrap();
        assert_eq!(json, "\"HAS_SALARY_HISTORY\"");

        for et in EdgeType::ALL {
            assert_eq!(et.cypher().parse::<EdgeType>().unwrap(), et);
            assert_eq!(et.to_string(), et.cypher());
        }
    }

    #[test]
    fn unknown_relationship_type_is_rejected() {
        assert_eq!("ASSIGNED_TO".parse::<EdgeType>(), Ok(EdgeType::AssignedTo));
        assert!("KNOWS".parse::<EdgeType>().is_err());
        assert!("assigned_to".parse::<EdgeType>().is_err());
    }

    #[test]
    fn employee_field_accepts_allow_list_only() {
        assert_eq!(
            "designation".parse::<EmployeeField>().unwrap(),
            EmployeeField::Designation
        );
        assert!("id".parse::<EmployeeField>().is_err());
        assert!("salary = 0, e.id".parse::<EmployeeField>().is_err());
        assert!("Email".parse::<EmployeeField>().is_err());

        let err = "manager_id".parse::<EmployeeField>().unwrap_err();
        match err {
            CoreError::InvalidField { field, allowed } => {
                assert_eq!(field, "manager_id");
                assert!(allowed.contains("date_of_joining"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn salary_values_must_be_numeric() {
        assert_eq!(
            EmployeeField::Salary.parse_value(" 95000.5 ").unwrap(),
            FieldValue::Number(95000.5)
        );
        assert!(EmployeeField::Salary.parse_value("lots").is_err());
        assert!(EmployeeField::Salary.parse_value("NaN").is_err());
        assert_eq!(
            EmployeeField::Status.parse_value("On Leave").unwrap(),
            FieldValue::Text("On Leave".to_string())
        );
    }

    #[test]
    fn labels_round_trip_through_strings() {
        assert_eq!(
            "SalaryHistory".parse::<NodeLabel>().unwrap(),
            NodeLabel::SalaryHistory
        );
        assert!("Manager".parse::<NodeLabel>().is_err());
    }
}
