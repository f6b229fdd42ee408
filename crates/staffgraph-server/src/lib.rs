//! staffgraph-server: MCP tools over the employee graph.
//!
//! Each graph operation is registered as an rmcp tool. Mutations answer
//! with a status line, reads with JSON records.

pub mod demo;
pub mod server;
mod tools;

use std::borrow::Cow;

use rmcp::model::{CallToolResult, Content, ErrorCode, ServerCapabilities, ServerInfo};
use rmcp::{handler::server::tool::ToolRouter, tool, tool_handler, tool_router, ErrorData, ServerHandler};

use staffgraph_graph::{GraphClient, GraphError};

const SERVER_INSTRUCTIONS: &str = r"staffgraph manages an employee graph in Neo4j.

Nodes: Department(id, name, location), Employee(id, first_name, last_name, email, phone,
designation, salary, date_of_joining, status), Project(id, name), Attendance, SalaryHistory.

Workflow:
1. `create_department` before creating employees in it.
2. `create_employee` links the employee to its department (WORKS_IN).
3. `assign_project`, `add_attendance`, `add_salary_change` attach records to an employee.
4. `get_employee`, `get_all_employees`, `get_employee_graph` read the graph.

Notes:
- `update_employee` only accepts these fields: first_name, last_name, email, phone,
  designation, salary, date_of_joining, status.
- Operations on a missing employee or department fail with a not-found error.
- `purge_orphaned_records` removes attendance/salary records left by deleted employees.
- `health` returns `ok`.";

/// MCP server wrapper around the shared graph client.
#[derive(Clone)]
pub struct StaffGraphMcp {
    tool_router: ToolRouter<Self>,
    graph: GraphClient,
}

impl StaffGraphMcp {
    #[must_use]
    pub fn new(graph: GraphClient) -> Self {
        Self {
            tool_router: Self::routes(),
            graph,
        }
    }

    pub(crate) fn routes() -> ToolRouter<Self> {
        Self::tool_router_core() + Self::tool_router_mutations() + Self::tool_router_queries()
    }

    pub(crate) fn graph(&self) -> &GraphClient {
        &self.graph
    }
}

fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Map a graph failure onto the MCP error taxonomy.
pub(crate) fn map_graph_err(tool: &'static str, err: GraphError) -> ErrorData {
    tracing::warn!(tool, error = %err, "Tool call failed");
    let code = match &err {
        GraphError::NotFound { .. } => ErrorCode::RESOURCE_NOT_FOUND,
        GraphError::Validation(_) | GraphError::ConstraintViolation(_) => ErrorCode::INVALID_PARAMS,
        GraphError::Connection(_)
        | GraphError::Query(_)
        | GraphError::Timeout { .. }
        | GraphError::Serialization(_) => ErrorCode::INTERNAL_ERROR,
    };
    mcp_err(code, err.to_string())
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl StaffGraphMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for StaffGraphMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
