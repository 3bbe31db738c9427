/*!
`serve.rs`

Implements the `serve` subcommand: run the MCP server.

  --transport stdio   (default) speak MCP over stdin/stdout
  --transport http    streamable HTTP at http://<bind>/mcp
*/

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{info, warn};

use crate::cmd::shared::{build_dispatcher, runtime};
use crate::config::{Config, Overrides};
use crate::mcp::{self, DEFAULT_BIND, NotionMcpServer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Transport to serve on
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport (host:port or http URL)
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_BIND)]
    pub bind: String,
}

pub fn execute_serve(args: ServeArgs, overrides: &Overrides) -> Result<()> {
    let cfg = Config::load(overrides)?;
    info!(
        "Starting Notion MCP server: {} tool(s) enabled, markdown {}",
        cfg.enabled_tools.len(),
        if cfg.enable_markdown { "on" } else { "off" }
    );
    if cfg.enabled_tools.is_empty() {
        warn!("No tools enabled; tools/list will be empty");
    }
    let server = NotionMcpServer::new(build_dispatcher(&cfg)?);

    match args.transport {
        Transport::Stdio => runtime()?.block_on(mcp::serve_stdio(server)),
        Transport::Http => {
            let addr = mcp::parse_bind(&args.bind)
                .with_context(|| format!("Failed to parse --bind '{}'", args.bind))?;
            runtime()?.block_on(mcp::serve_http(server, addr))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Serve(ServeArgs),
    }

    #[test]
    fn defaults_to_stdio() {
        let TestSub::Serve(a) = TestCli::try_parse_from(["t", "serve"]).unwrap().cmd;
        assert_eq!(a.transport, Transport::Stdio);
    }

    #[test]
    fn parses_http_transport() {
        let TestSub::Serve(a) =
            TestCli::try_parse_from(["t", "serve", "--transport", "http", "--bind", "127.0.0.1:9000"])
                .unwrap()
                .cmd;
        assert_eq!(a.transport, Transport::Http);
        assert_eq!(a.bind, "127.0.0.1:9000");
    }

    #[test]
    fn rejects_unknown_transport() {
        assert!(TestCli::try_parse_from(["t", "serve", "--transport", "sse"]).is_err());
    }
}
