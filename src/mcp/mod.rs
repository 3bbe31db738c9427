//! MCP server surface.
//!
//! NotionMcpServer implements `rmcp::ServerHandler` over a shared
//! [`Dispatcher`]. Transports: stdio (`serve_stdio`) and streamable HTTP
//! mounted at `/mcp` (`serve_http`). `parse_bind` turns a `--bind` value
//! (`host:port` or an http URL) into a socket address.
//!
use anyhow::{Context, Result, bail};
use log::info;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use url::Url;

use crate::dispatch::Dispatcher;
use crate::tools::ToolDef;

pub const HTTP_PATH: &str = "/mcp";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

const INSTRUCTIONS: &str = "Notion workspace tools: read and edit blocks, pages and databases, \
manage comments, look up users and search. Every tool accepts an optional `format` \
(`markdown` or `json`). Failures come back as a text payload of the form {\"error\": \"...\"}.";

/// Cheap to clone; every connection shares one dispatcher.
#[derive(Clone)]
pub struct NotionMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl NotionMcpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .list_tools()
            .into_iter()
            .map(tool_descriptor)
            .collect()
    }
}

/// Protocol descriptor for a catalog entry.
pub fn tool_descriptor(def: &ToolDef) -> Tool {
    Tool::new(def.name, def.description, Arc::new(def.input_schema()))
}

impl ServerHandler for NotionMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move { Ok(ListToolsResult::with_all_items(self.tools())) }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { Ok(self.dispatcher.call_tool(request).await) }
    }
}

/// Parse a `--bind` value into a socket address.
///
/// Accepted forms:
/// - "0.0.0.0:8000", "[::1]:9000", "localhost:8000"
/// - "http://127.0.0.1:8000/mcp" (path ignored; port defaults per scheme)
pub fn parse_bind(raw: &str) -> Result<SocketAddr> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Bind address is empty");
    }

    let host_port = match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let host = url
                .host_str()
                .with_context(|| format!("Bind URL has no host: '{trimmed}'"))?;
            let port = url
                .port_or_known_default()
                .with_context(|| format!("Bind URL has no port: '{trimmed}'"))?;
            format!("{host}:{port}")
        }
        _ => trimmed.to_string(),
    };

    host_port
        .to_socket_addrs()
        .with_context(|| format!("Invalid bind address: '{trimmed}'"))?
        .next()
        .with_context(|| format!("Bind address resolved to nothing: '{trimmed}'"))
}

/// Serve over stdin/stdout until the peer disconnects.
pub async fn serve_stdio(server: NotionMcpServer) -> Result<()> {
    info!("Serving MCP over stdio");
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start stdio MCP service")?;
    running.waiting().await.context("stdio MCP service failed")?;
    info!("stdio MCP service stopped");
    Ok(())
}

/// Serve streamable HTTP at `addr` under [`HTTP_PATH`] until Ctrl-C.
pub async fn serve_http(server: NotionMcpServer, addr: SocketAddr) -> Result<()> {
    use rmcp::transport::streamable_http_server::{
        StreamableHttpService, session::local::LocalSessionManager,
    };

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service(HTTP_PATH, service);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Serving MCP over streamable HTTP at http://{addr}{HTTP_PATH}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP MCP server failed")?;
    info!("HTTP MCP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::NotionClient;
    use crate::notion::testing::RecordingTransport;
    use crate::tools::EnabledTools;
    use serde_json::json;

    #[test]
    fn parse_plain_socket() {
        let addr = parse_bind("127.0.0.1:9000").unwrap();
        assert_eq!(addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn parse_ipv6_socket() {
        let addr = parse_bind("[::1]:7000").unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.port(), 7000);
    }

    #[test]
    fn parse_http_url() {
        let addr = parse_bind("http://0.0.0.0:8080/mcp").unwrap();
        assert_eq!(addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());

        let addr = parse_bind("http://127.0.0.1").unwrap();
        assert_eq!(addr.port(), 80);
    }

    #[test]
    fn default_bind_parses() {
        assert_eq!(parse_bind(DEFAULT_BIND).unwrap().port(), 8000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_bind("   ").unwrap_err().to_string().contains("empty"));
        assert!(parse_bind("not an address").is_err());
        assert!(parse_bind("127.0.0.1").is_err());
    }

    #[test]
    fn descriptor_carries_schema() {
        let def = crate::tools::find("notion_retrieve_block").unwrap();
        let tool = tool_descriptor(def);
        assert_eq!(tool.name, "notion_retrieve_block");
        assert_eq!(tool.input_schema["required"], json!(["block_id"]));
    }

    #[tokio::test]
    async fn end_to_end_over_duplex() {
        let transport = RecordingTransport::replying(json!({
            "object": "block", "id": "b1", "type": "divider", "divider": {}
        }));
        let dispatcher = Dispatcher::new(
            NotionClient::new(transport.clone()),
            EnabledTools::parse("notion_retrieve_block,notion_search").unwrap(),
        );
        let server = NotionMcpServer::new(Arc::new(dispatcher));

        let (server_io, client_io) = tokio::io::duplex(4096);
        let server_task = tokio::spawn(async move {
            let running = server.serve(server_io).await?;
            running.waiting().await?;
            anyhow::Ok(())
        });

        let client = ().serve(client_io).await.unwrap();

        let listed = client.list_tools(Default::default()).await.unwrap();
        let names: Vec<_> = listed.tools.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, vec!["notion_retrieve_block", "notion_search"]);

        let result = client
            .call_tool(CallToolRequestParam {
                name: "notion_retrieve_block".into(),
                arguments: json!({"block_id": "b1"}).as_object().cloned(),
            })
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
        assert_eq!(text, "---");
        assert_eq!(transport.recorded()[0].path, "/blocks/b1");

        let result = client
            .call_tool(CallToolRequestParam {
                name: "notion_delete_block".into(),
                arguments: json!({"block_id": "b1"}).as_object().cloned(),
            })
            .await
            .unwrap();
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
        assert_eq!(text, r#"{"error":"Tool not enabled: notion_delete_block"}"#);

        let _ = client.cancel().await;
        let _ = server_task.await;
    }
}
