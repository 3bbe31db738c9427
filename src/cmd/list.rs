/*!
`list.rs`

Implements the `list` subcommand: print the tool catalog without touching
the network (no token required).

  - default : only the enabled tools (`--tools` / NOTION_ENABLED_TOOLS)
  - --all   : the whole catalog, with an ENABLED column in the table

JSON Output Shape:
{
  "status": "ok",
  "count": 2,
  "tools": [
    { "name": "...", "description": "...", "enabled": true, "inputSchema": { ... } }
  ]
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::cmd::format::{Role, StyleOptions, color, emoji, header, table, truncate_ellipsis};
use crate::config::{self, Overrides};
use crate::tools::{self, EnabledTools, ToolDef};

/// CLI arguments for `notion-mcp list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// Include tools that are not enabled
    #[arg(long)]
    pub all: bool,
}

pub fn execute_list(args: ListArgs, overrides: &Overrides) -> Result<()> {
    let enabled = config::enabled_tools(overrides, &|key: &str| std::env::var(key).ok())?;
    let defs = selected(&enabled, args.all);

    if args.json {
        let items: Vec<_> = defs
            .iter()
            .map(|d| {
                json!({
                    "name": d.name,
                    "description": d.description,
                    "enabled": enabled.contains(d.name),
                    "inputSchema": d.input_schema(),
                })
            })
            .collect();
        let out = json!({"status": "ok", "count": items.len(), "tools": items});
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!("{}", render_table(&defs, &enabled, args.all, &style));
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(
            Role::Dim,
            "Use `notion-mcp call <name> --param KEY=VALUE` to invoke a tool",
            &style
        )
    );
    Ok(())
}

fn selected(enabled: &EnabledTools, all: bool) -> Vec<&'static ToolDef> {
    if all {
        tools::list_tools(&EnabledTools::all())
    } else {
        tools::list_tools(enabled)
    }
}

fn render_table(
    defs: &[&'static ToolDef],
    enabled: &EnabledTools,
    all: bool,
    style: &StyleOptions,
) -> String {
    let subtitle = format!("{} of {} enabled", enabled.len(), tools::all_names().count());
    let mut out = header(
        format!("{} Tools ({})", emoji("list", style), defs.len()),
        Some(&subtitle),
        style,
    );
    out.push('\n');

    if defs.is_empty() {
        out.push_str(&color(Role::Dim, "(none)", style));
        return out;
    }

    let mut headers = vec!["#", "NAME", "PARAMS", "DESCRIPTION"];
    if all {
        headers.insert(2, "ENABLED");
    }
    let rows: Vec<Vec<String>> = defs
        .iter()
        .enumerate()
        .map(|(idx, d)| {
            let mut row = vec![(idx + 1).to_string(), d.name.to_string()];
            if all {
                row.push(if enabled.contains(d.name) { "yes" } else { "no" }.to_string());
            }
            row.push(param_summary(d));
            row.push(truncate_ellipsis(d.description, 90));
            row
        })
        .collect();
    out.push_str(&table(&headers, &rows, style));
    out
}

/// `name*:type` for each param; `*` marks a required one.
fn param_summary(def: &ToolDef) -> String {
    if def.params.is_empty() {
        return "-".to_string();
    }
    def.params
        .iter()
        .map(|p| {
            let mark = if p.listed_required() { "*" } else { "" };
            format!("{}{mark}:{}", p.name, p.shape.type_name())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
