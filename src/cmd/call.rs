/*!
`call.rs`

Implements the `call` subcommand: run one tool through the dispatcher,
in-process, and print its text payload.

Argument sources (later wins):
    --param-file params.(json|yaml)
    --args '{"key": ...}'
    --param KEY=VALUE              (repeatable, coerced by the tool's param shape)

Default output is the payload exactly as an MCP client would receive it.
On failure the `{"error": ...}` payload is printed and the process exits
non-zero.

JSON Output (--json):
{
  "status": "ok" | "error",
  "tool": "notion_retrieve_page",
  "elapsed_ms": 42,
  "arguments": { ... },
  "text": "<payload>"
}
*/

use anyhow::{Context, Result, bail};
use clap::Args;
use log::debug;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::time::Instant;

use crate::cmd::format::{Role, StyleOptions, color, emoji, header};
use crate::cmd::shared::{
    build_arguments, build_dispatcher, load_param_file, parse_args_json, parse_param, runtime,
};
use crate::config::{Config, Overrides};
use crate::dispatch::error_payload;
use crate::tools;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML)
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<PathBuf>,

    /// Arguments as one JSON object
    #[arg(long = "args", value_name = "JSON")]
    pub args_json: Option<String>,

    /// Wrap the payload in a JSON status envelope
    #[arg(long)]
    pub json: bool,

    /// Print a header with timing above the payload
    #[arg(long)]
    pub pretty: bool,
}

pub fn execute_call(args: CallArgs, overrides: &Overrides) -> Result<()> {
    let tool_name = args.tool.trim().to_string();
    if tool_name.is_empty() {
        bail!("tool name cannot be empty");
    }

    let arguments = collect_arguments(&args, &tool_name)?;
    let cfg = Config::load(overrides)?;
    let dispatcher = build_dispatcher(&cfg)?;
    debug!("call {tool_name} with {} argument(s)", arguments.len());

    let started = Instant::now();
    let outcome = runtime()?.block_on(dispatcher.try_call(&tool_name, Some(&arguments)));
    let elapsed_ms = started.elapsed().as_millis();

    let (ok, text) = match &outcome {
        Ok(text) => (true, text.clone()),
        Err(e) => (false, error_payload(e)),
    };

    if args.json {
        let out = json!({
            "status": if ok { "ok" } else { "error" },
            "tool": tool_name,
            "elapsed_ms": elapsed_ms,
            "arguments": arguments,
            "text": text,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
    } else if args.pretty {
        let style = StyleOptions::detect();
        let (tag, role, label) = if ok {
            ("success", Role::Success, "ok")
        } else {
            ("error", Role::Error, "error")
        };
        let title = format!("{} {tool_name}", emoji(tag, &style));
        let subtitle = format!("{} • {elapsed_ms} ms", color(role, label, &style));
        println!("{}", header(title, Some(&subtitle), &style));
        println!("{text}");
    } else {
        println!("{text}");
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("tool '{tool_name}' failed")),
    }
}

fn collect_arguments(args: &CallArgs, tool_name: &str) -> Result<Map<String, Value>> {
    let params = args
        .params
        .iter()
        .map(|kv| parse_param(kv))
        .collect::<Result<Vec<_>>>()?;
    let file = match &args.param_file {
        Some(path) => load_param_file(path)?,
        None => Map::new(),
    };
    let json_args = match &args.args_json {
        Some(raw) => parse_args_json(raw)?,
        None => Map::new(),
    };
    Ok(build_arguments(
        tools::find(tool_name),
        file,
        json_args,
        &params,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Call(CallArgs),
    }

    fn parse(argv: &[&str]) -> CallArgs {
        let TestSub::Call(a) = TestCli::try_parse_from(argv).unwrap().cmd;
        a
    }

    #[test]
    fn clap_parses_call() {
        let a = parse(&[
            "t",
            "call",
            "notion_search",
            "--param",
            "query=roadmap",
            "--param",
            "page_size=5",
            "--json",
        ]);
        assert_eq!(a.tool, "notion_search");
        assert_eq!(a.params, vec!["query=roadmap", "page_size=5"]);
        assert!(a.json);
        assert!(a.param_file.is_none());
    }

    #[test]
    fn arguments_are_coerced_and_merged() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"{{"filter": {{"property": "object", "value": "page"}}, "page_size": 1}}"#)
            .unwrap();
        let path = f.path().to_string_lossy().to_string();
        let a = parse(&[
            "t",
            "call",
            "notion_search",
            "--param-file",
            &path,
            "--args",
            r#"{"query": "plan"}"#,
            "--param",
            "page_size=20",
        ]);
        let args = collect_arguments(&a, &a.tool).unwrap();
        assert_eq!(
            Value::Object(args),
            json!({
                "filter": {"property": "object", "value": "page"},
                "page_size": 20,
                "query": "plan"
            })
        );
    }

    #[test]
    fn bad_param_is_rejected() {
        let a = parse(&["t", "call", "notion_search", "--param", "oops"]);
        assert!(collect_arguments(&a, &a.tool).is_err());
    }
}
