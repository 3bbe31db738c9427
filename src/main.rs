use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod dispatch;
mod error;
mod markdown;
mod mcp;
mod notion;
mod tools;
mod utils;

use cmd::{CallArgs, ListArgs, ServeArgs};
use config::Overrides;

/// Notion MCP server: the Notion API as a set of MCP tools.
///
/// Commands:
///   notion-mcp serve [--transport stdio|http] [--bind ADDR]
///   notion-mcp list  [--json] [--all]
///   notion-mcp call  <tool> [--param k=v ...] [--param-file PATH] [--args JSON] [--json]
///
/// Global flags / env:
///   -v / -vv            Increase verbosity (RUST_LOG overrides)
///   -q / --quiet        Errors only
///   --token             Integration token (or NOTION_API_TOKEN)
///   --no-markdown       Always return raw JSON (or ENABLE_MARKDOWN=false)
///   --tools a,b,c       Enabled tool names (or NOTION_ENABLED_TOOLS)
///   NOTION_API_BASE_URL API base, default https://api.notion.com/v1
///
/// Examples:
///   NOTION_API_TOKEN=secret_... notion-mcp serve
///   notion-mcp serve --transport http --bind 127.0.0.1:8000
///   notion-mcp list --all
///   notion-mcp call notion_search --param query=roadmap --param page_size=5
///   notion-mcp call notion_retrieve_page --param page_id=<id> --param format=json
#[derive(Parser, Debug)]
#[command(
    name = "notion-mcp",
    version,
    author,
    about = "Notion MCP server - exposes the Notion API as MCP tools",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Notion integration token (falls back to NOTION_API_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// Disable Markdown conversion of responses
    #[arg(long, global = true)]
    no_markdown: bool,

    /// Comma-separated list of enabled tools (falls back to NOTION_ENABLED_TOOLS)
    #[arg(long, global = true, value_name = "NAMES")]
    tools: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server
    Serve(ServeArgs),

    /// List the tool catalog
    List(ListArgs),

    /// Invoke one tool directly
    Call(CallArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let overrides = Overrides {
        token: cli.token.clone(),
        no_markdown: cli.no_markdown,
        tools: cli.tools.clone(),
    };

    match cli.command {
        Commands::Serve(args) => cmd::execute_serve(args, &overrides),
        Commands::List(args) => cmd::execute_list(args, &overrides),
        Commands::Call(args) => cmd::execute_call(args, &overrides),
    }
}
