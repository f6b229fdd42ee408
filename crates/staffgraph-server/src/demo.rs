//! Fixed demo records: two departments and five employees.

use staffgraph_core::NewEmployee;
use staffgraph_graph::{GraphClient, GraphError};

/// (id, name, location)
pub const DEMO_DEPARTMENTS: [(i64, &str, &str); 2] = [
    (1, "Engineering", "Bangalore"),
    (2, "Human Resources", "Hyderabad"),
];

pub fn demo_employees() -> Vec<NewEmployee> {
    let rows: [(i64, &str, &str, &str, &str, i64, &str, f64, &str); 5] = [
        (1, "Arun", "Kumar", "arun@example.com", "9876543210", 1, "Software Engineer", 80000.0, "2020-05-01"),
        (2, "Prashant", "Singh", "prashant@example.com", "9988776655", 2, "Manager", 120000.0, "2018-03-12"),
        (3, "John", "Doe", "john@example.com", "9000000001", 1, "Developer", 90000.0, "2021-06-10"),
        (4, "Asha", "Rani", "asha@example.com", "9888888888", 1, "QA Engineer", 70000.0, "2022-01-20"),
        (5, "Ravi", "Sharma", "ravi@example.com", "9777777777", 2, "HR Executive", 60000.0, "2019-11-05"),
    ];

    rows.into_iter()
        .map(
            |(id, first, last, email, phone, department_id, designation, salary, joined)| {
                NewEmployee {
                    id,
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                    department_id,
                    designation: designation.to_string(),
                    salary,
                    date_of_joining: joined.to_string(),
                    status: staffgraph_core::types::DEFAULT_STATUS.to_string(),
                }
            },
        )
        .collect()
}

/// Load the demo data through the regular graph operations.
///
/// Departments are upserts. Employees that already exist are skipped, so
/// seeding an already-seeded database succeeds.
pub async fn seed_demo_data(graph: &GraphClient) -> Result<(), GraphError> {
    tracing::info!("Loading demo data");

    for (id, name, location) in DEMO_DEPARTMENTS {
        graph.create_department(id, name, Some(location)).await?;
    }

    let mut created = 0usize;
    for employee in demo_employees() {
        match graph.create_employee(&employee).await {
            Ok(_) => created += 1,
            Err(GraphError::ConstraintViolation(_)) => {
                tracing::info!(employee_id = employee.id, "Demo employee already present");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        departments = DEMO_DEPARTMENTS.len(),
        employees_created = created,
        "Demo data loaded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_demo_employee_has_a_department() {
        let departments: HashSet<i64> = DEMO_DEPARTMENTS.iter().map(|d| d.0).collect();
        let employees = demo_employees();
        assert_eq!(employees.len(), 5);
        assert!(employees
            .iter()
            .all(|e| departments.contains(&e.department_id)));
    }

    #[test]
    fn demo_keys_are_unique() {
        let employees = demo_employees();
        let ids: HashSet<i64> = employees.iter().map(|e| e.id).collect();
        let emails: HashSet<&str> = employees.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(ids.len(), employees.len());
        assert_eq!(emails.len(), employees.len());
        assert!(employees.iter().all(|e| e.status == "Active"));
    }
}
