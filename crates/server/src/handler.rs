//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::date_batch::{DateBatchParams, batch_impl};
use crate::tools::date_extract::{DateExtractParams, extract_impl};

use pagedate_client::{DateExtractor, LlmDateExtractor, LlmError};
use pagedate_core::AppConfig;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for pagedate.
#[derive(Clone)]
pub struct PagedateServer {
    tool_router: ToolRouter<Self>,
    extractor: Arc<DateExtractor>,
    llm: Arc<LlmDateExtractor>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PagedateServer {
    /// Create a new server handler.
    pub fn new(config: &AppConfig) -> Result<Self, LlmError> {
        Ok(Self {
            tool_router: Self::tool_router(),
            extractor: Arc::new(DateExtractor::from_app_config(config)),
            llm: Arc::new(LlmDateExtractor::new(config.llm())?),
        })
    }

    /// Extract publication and modification dates from HTML.
    ///
    /// Runs the strategy waterfall by default, or asks the configured chat model
    /// when `use_llm` is set.
    #[tool(
        description = "Extract the published and modified dates from raw HTML. Returns dates, extraction methods, confidence tiers, and every date found on the page."
    )]
    async fn date_extract(&self, params: Parameters<DateExtractParams>) -> Result<CallToolResult, McpError> {
        extract_impl(&self.extractor, &self.llm, params.0).await
    }

    /// Extract dates from many documents and apply an optional cutoff.
    #[tool(
        description = "Extract dates from multiple HTML documents in parallel. With a cutoff (YYYY-MM-DD), reports which pages have no date after it."
    )]
    async fn date_batch(&self, params: Parameters<DateBatchParams>) -> Result<CallToolResult, McpError> {
        batch_impl(&self.extractor, params.0).await
    }
}

impl ServerHandler for PagedateServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pagedate".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_both_tools() {
        let server = PagedateServer::new(&AppConfig::default()).unwrap();
        let names: Vec<_> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        assert!(names.contains(&"date_extract".to_string()));
        assert!(names.contains(&"date_batch".to_string()));
    }

    #[test]
    fn test_server_info() {
        let server = PagedateServer::new(&AppConfig::default()).unwrap();
        assert_eq!(server.get_info().server_info.name, "pagedate");
    }
}
