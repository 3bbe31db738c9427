/*!
shared.rs - helpers shared by subcommands.

  - runtime / build_dispatcher: wire Config -> transport -> client -> dispatcher
  - parse_param / load_param_file: raw CLI and file inputs
  - coerce_value / build_arguments: typed argument bag from a tool's params
*/

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::notion::{HttpTransport, NotionClient};
use crate::tools::{Shape, ToolDef};

/* ---- Runtime / Wiring ---- */

/// Commands are sync; each builds its own multi-threaded runtime.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")
}

pub fn build_dispatcher(cfg: &Config) -> Result<Arc<Dispatcher>> {
    let transport =
        HttpTransport::new(&cfg.base_url, &cfg.token).context("Failed to build HTTP client")?;
    let client = NotionClient::new(Arc::new(transport));
    let dispatcher =
        Dispatcher::new(client, cfg.enabled_tools.clone()).with_markdown(cfg.enable_markdown);
    Ok(Arc::new(dispatcher))
}

/* ---- Raw Inputs ---- */

/// Split `KEY=VALUE`; the key is trimmed, the value kept verbatim.
pub fn parse_param(kv: &str) -> Result<(String, String)> {
    let Some((k, v)) = kv.split_once('=') else {
        bail!("invalid --param (expected KEY=VALUE): {kv}");
    };
    let key = k.trim();
    if key.is_empty() {
        bail!("invalid --param (empty key): {kv}");
    }
    Ok((key.to_string(), v.to_string()))
}

/// Read a JSON or YAML (by extension) object of arguments.
pub fn load_param_file(path: &Path) -> Result<Map<String, Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let value: Value = if is_yaml {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("param file root must be an object"),
    }
}

/// Parse `--args` as a JSON object.
pub fn parse_args_json(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw).context("--args is not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => bail!("--args must be a JSON object"),
    }
}

/* ---- Coercion ---- */

/// Coerce a raw CLI string using the declared parameter shape.
/// Values that do not fit the shape stay strings; the dispatcher reports them.
pub fn coerce_value(raw: &str, shape: &Shape) -> Value {
    match shape {
        Shape::Id | Shape::Text | Shape::Enum(_) => Value::String(raw.to_string()),
        Shape::Number => raw
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            })
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Shape::Object(_) | Shape::Nullable(_) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        Shape::Array(_) => match serde_json::from_str::<Value>(raw) {
            Ok(v @ Value::Array(_)) => v,
            _ => Value::Array(
                raw.split(',')
                    .map(|s| Value::String(s.trim().to_string()))
                    .collect(),
            ),
        },
    }
}

/// Merge argument sources: file values, then `--args`, then `--param`
/// (coerced by shape; unknown keys stay strings).
pub fn build_arguments(
    def: Option<&ToolDef>,
    file: Map<String, Value>,
    json_args: Map<String, Value>,
    params: &[(String, String)],
) -> Map<String, Value> {
    let mut out = file;
    out.extend(json_args);
    for (key, raw) in params {
        let value = match def.and_then(|d| d.param(key)) {
            Some(p) => coerce_value(raw, &p.shape),
            None => Value::String(raw.clone()),
        };
        out.insert(key.clone(), value);
    }
    out
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::find;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn coerce_number() {
        assert_eq!(coerce_value("42", &Shape::Number), json!(42));
        assert_eq!(coerce_value("2.5", &Shape::Number), json!(2.5));
        assert_eq!(
            coerce_value("x42", &Shape::Number),
            json!("x42"),
            "invalid number remains string"
        );
    }

    #[test]
    fn coerce_ids_stay_strings() {
        assert_eq!(coerce_value("123", &Shape::Id), json!("123"));
    }

    #[test]
    fn coerce_object_and_array() {
        assert_eq!(
            coerce_value(r#"{"Done":{"checkbox":true}}"#, &Shape::Object(&[])),
            json!({"Done": {"checkbox": true}})
        );
        assert_eq!(
            coerce_value("a,b, c", &Shape::Array(&Shape::Text)),
            json!(["a", "b", "c"]),
            "comma splitting with trimming"
        );
        assert_eq!(
            coerce_value(r#"[{"type":"divider","divider":{}}]"#, &Shape::Array(&Shape::Text)),
            json!([{"type": "divider", "divider": {}}])
        );
    }

    #[test]
    fn parse_param_forms() {
        assert_eq!(
            parse_param("block_id=abc=def").unwrap(),
            ("block_id".to_string(), "abc=def".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param(" =x").is_err());
    }

    #[test]
    fn build_arguments_precedence() {
        let def = find("notion_retrieve_block_children");
        let file = json!({"block_id": "from-file", "page_size": 1})
            .as_object()
            .cloned()
            .unwrap();
        let json_args = json!({"start_cursor": "c1", "page_size": 2})
            .as_object()
            .cloned()
            .unwrap();
        let params = vec![
            ("page_size".to_string(), "10".to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        let args = build_arguments(def, file, json_args, &params);
        assert_eq!(
            Value::Object(args),
            json!({"block_id": "from-file", "page_size": 10, "start_cursor": "c1", "format": "json"})
        );
    }

    #[test]
    fn param_file_yaml() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(f, "block_id: abc\npage_size: 5").unwrap();
        let map = load_param_file(f.path()).unwrap();
        assert_eq!(map.get("block_id"), Some(&json!("abc")));
        assert_eq!(map.get("page_size"), Some(&json!(5)));
    }

    #[test]
    fn param_file_json_must_be_object() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, "[1, 2]").unwrap();
        let err = load_param_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn args_json_must_be_object() {
        assert!(parse_args_json(r#"{"query":"x"}"#).is_ok());
        assert!(parse_args_json("[]").is_err());
        assert!(parse_args_json("{").is_err());
    }
}
