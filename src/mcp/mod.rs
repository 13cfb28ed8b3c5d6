//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes persony functionality as tools
//! for AI agent integration. The server communicates via JSON-RPC over stdio.

/// Checks if the server has been initialized and returns an error if not.
macro_rules! require_init {
    ($self:expr) => {
        if !$self.check_initialized().await {
            return Self::uninitialized();
        }
    };
}

mod mcp_utils;
mod tools;

use crate::Config;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{
    CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::ErrorData as McpError;
use rmcp::{tool_handler, ServerHandler, ServiceExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// The persony MCP server.
#[derive(Debug, Clone)]
pub struct PersonyServer {
    initialized: Arc<Mutex<bool>>,
    config: Arc<Config>,
    tool_router: ToolRouter<PersonyServer>,
}

impl PersonyServer {
    pub fn new(config: Config) -> Self {
        Self {
            initialized: Arc::new(Mutex::new(false)),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    fn config(&self) -> Config {
        (*self.config).clone()
    }

    async fn check_initialized(&self) -> bool {
        *self.initialized.lock().await
    }

    fn uninitialized() -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![rmcp::model::Content::text(
            "You have not yet initialized the service. Please call __initialize_service__ first.",
        )]))
    }
}

#[tool_handler]
impl ServerHandler for PersonyServer {
    /// Returns server information sent to the MCP client during initialization. Agents tend to
    /// skim `instructions`, so the full usage text is only returned by `initialize_service`,
    /// which every other tool requires.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "persony".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(include_str!("docs/INTRO.md").into()),
        }
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Default)]
pub(crate) enum Io {
    #[default]
    Stdio,
    /// Mock transport for testing - holds one end of a duplex channel.
    #[cfg(test)]
    Mock(tokio::io::DuplexStream),
}

/// Runs the MCP server with stdio transport or mock transport. This function starts the MCP server
/// and blocks until the client disconnects or an error occurs.
pub(crate) async fn run_server(config: Config, io: Io) -> crate::Result<()> {
    use crate::error::{ErrorType, IntoResult};
    let server = PersonyServer::new(config);
    info!("Starting MCP server...");

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
    };

    info!("MCP server running, waiting for requests...");

    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))
        .pub_result(ErrorType::Service)?;

    info!("MCP server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TxKind};
    use crate::test::TestEnv;
    use rmcp::model::CallToolRequestParam;
    use rmcp::service::RunningService;
    use rmcp::{RoleClient, ServiceExt};
    use serde_json::{json, Map, Value};
    use tokio::io::duplex;

    async fn call(
        client: &RunningService<RoleClient, ()>,
        name: &'static str,
        arguments: Option<Value>,
    ) -> CallToolResult {
        let arguments: Option<Map<String, Value>> =
            arguments.map(|v| v.as_object().unwrap().clone());
        client
            .call_tool(CallToolRequestParam {
                name: name.into(),
                arguments,
            })
            .await
            .unwrap_or_else(|e| panic!("{name} call failed: {e}"))
    }

    fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn assert_ok(name: &str, result: &CallToolResult) {
        assert!(
            !result.is_error.unwrap_or(false),
            "{name} returned error: {:?}",
            result.content
        );
    }

    /// Integration test for the MCP server using an in-memory transport.
    #[tokio::test]
    async fn test_mcp_server_integration() {
        let (client_io, server_io) = duplex(4096);
        let env = TestEnv::new().await;
        env.set_balance(1_000_000).await;
        let config = env.config();

        let server_handle =
            tokio::spawn(async move { run_server(config, Io::Mock(server_io)).await });
        let client = ().serve(client_io).await.expect("Failed to create client");

        // Tools refuse to run before initialization
        let early = call(&client, "dashboard", Some(json!({}))).await;
        assert!(early.is_error.unwrap_or(false));
        assert!(text(&early).contains("initialize_service"));

        let init = call(&client, "initialize_service", None).await;
        assert_ok("initialize_service", &init);
        assert!(text(&init).contains("usage instructions"));

        let added = call(
            &client,
            "add_transaction",
            Some(json!({"title": "Makan siang", "amount": 35000, "date": "1/3/2025"})),
        )
        .await;
        assert_ok("add_transaction", &added);

        let bill = call(
            &client,
            "save_bill",
            Some(json!({
                "title": "Internet",
                "price": "Rp 350.000",
                "due_date": "31/1/2025",
                "recurrence": "monthly"
            })),
        )
        .await;
        assert_ok("save_bill", &bill);

        let saving = call(
            &client,
            "add_saving",
            Some(json!({"name": "Laptop", "target": 8000000, "icon": "laptop"})),
        )
        .await;
        assert_ok("add_saving", &saving);
        let plan_id = env.config().db().savings().await.unwrap()[0].id().to_string();

        let deposit = call(
            &client,
            "deposit_saving",
            Some(json!({"id": plan_id, "amount": 2000000})),
        )
        .await;
        assert!(deposit.is_error.unwrap_or(false));
        assert!(text(&deposit).contains("Insufficient balance"));

        let deposit = call(
            &client,
            "deposit_saving",
            Some(json!({"id": plan_id, "amount": 100000})),
        )
        .await;
        assert_ok("deposit_saving", &deposit);

        for name in ["list_bills", "list_savings", "budget_status"] {
            assert_ok(name, &call(&client, name, None).await);
        }
        assert_ok(
            "set_budget",
            &call(&client, "set_budget", Some(json!({"amount": 50000}))).await,
        );
        assert_ok(
            "list_transactions",
            &call(&client, "list_transactions", Some(json!({"range": "day"}))).await,
        );

        let dashboard = call(&client, "dashboard", Some(json!({"range": "all"}))).await;
        assert_ok("dashboard", &dashboard);

        assert_eq!(env.balance().await, 865_000);
        let transactions = env.config().db().transactions().await.unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions.data()[0].kind(), TxKind::Expense);
        assert_eq!(
            transactions.data()[1].amount(),
            Amount::new(35_000),
            "the first transaction is the lunch"
        );

        drop(client);
        let server_result = tokio::time::timeout(std::time::Duration::from_secs(5), server_handle)
            .await
            .expect("Server timed out")
            .expect("Server task panicked");
        assert!(
            server_result.is_ok(),
            "Server returned error: {:?}",
            server_result
        );
    }

    #[tokio::test]
    async fn test_list_tools() {
        let (client_io, server_io) = duplex(4096);
        let env = TestEnv::new().await;
        let config = env.config();
        let _server_handle =
            tokio::spawn(async move { run_server(config, Io::Mock(server_io)).await });
        let client = ().serve(client_io).await.expect("Failed to create client");

        let tools = client
            .list_tools(Default::default())
            .await
            .expect("Failed to list tools");
        let names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
        for expected in [
            "initialize_service",
            "dashboard",
            "add_transaction",
            "delete_transaction",
            "list_transactions",
            "save_bill",
            "pay_bill",
            "delete_bill",
            "list_bills",
            "add_saving",
            "deposit_saving",
            "withdraw_saving",
            "list_savings",
            "set_budget",
            "budget_status",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }
    }
}
