use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars, tool, tool_router, ErrorData,
};
use serde::{Deserialize, Serialize};

use crate::{map_graph_err, StaffGraphMcp};

/// Parameters for fetching an employee by id.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetEmployeeParams {
    pub id: i64,
}

/// Optional paging for the employee listing. Omit both to list everyone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListEmployeesParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Parameters for an employee's outgoing graph.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetEmployeeGraphParams {
    pub id: i64,
}

#[tool_router(router = tool_router_queries, vis = "pub")]
impl StaffGraphMcp {
    #[tool(description = "Fetch one employee by id. Returns a list with zero or one record.")]
    async fn get_employee(
        &self,
        Parameters(params): Parameters<GetEmployeeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let found: Vec<_> = self
            .graph()
            .get_employee(params.id)
            .await
            .map_err(|e| map_graph_err("get_employee", e))?
            .into_iter()
            .collect();
        Ok(CallToolResult::success(vec![Content::json(found)?]))
    }

    #[tool(description = "List employees ordered by id. Optional limit/offset for paging.")]
    async fn get_all_employees(
        &self,
        Parameters(params): Parameters<ListEmployeesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let employees = self
            .graph()
            .get_all_employees(params.limit, params.offset)
            .await
            .map_err(|e| map_graph_err("get_all_employees", e))?;
        Ok(CallToolResult::success(vec![Content::json(employees)?]))
    }

    #[tool(description = "List every outgoing relationship of an employee with the node it points to.")]
    async fn get_employee_graph(
        &self,
        Parameters(params): Parameters<GetEmployeeGraphParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let edges = self
            .graph()
            .get_employee_graph(params.id)
            .await
            .map_err(|e| map_graph_err("get_employee_graph", e))?;
        Ok(CallToolResult::success(vec![Content::json(edges)?]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_params_are_optional() {
        let params: ListEmployeesParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(params.limit.is_none());
        assert!(params.offset.is_none());

        let params: ListEmployeesParams =
            serde_json::from_value(serde_json::json!({"limit": 10, "offset": 20})).unwrap();
        assert_eq!(params.limit, Some(10));
        assert_eq!(params.offset, Some(20));
    }
}
