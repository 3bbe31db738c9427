//! Process configuration, resolved once at startup.
//!
//! Precedence: CLI flag, then environment variable, then default.

use anyhow::{Context, Result, bail};
use std::fmt;

use crate::notion::transport::DEFAULT_BASE_URL;
use crate::tools::EnabledTools;

pub const ENV_TOKEN: &str = "NOTION_API_TOKEN";
pub const ENV_MARKDOWN: &str = "ENABLE_MARKDOWN";
pub const ENV_TOOLS: &str = "NOTION_ENABLED_TOOLS";
pub const ENV_BASE_URL: &str = "NOTION_API_BASE_URL";

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub no_markdown: bool,
    pub tools: Option<String>,
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub enable_markdown: bool,
    pub enabled_tools: EnabledTools,
    pub base_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("enable_markdown", &self.enable_markdown)
            .field("enabled_tools", &self.enabled_tools.len())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Resolve against the process environment.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    pub fn resolve(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = overrides
            .token
            .clone()
            .or_else(|| env(ENV_TOKEN))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let Some(token) = token else {
            bail!("{ENV_TOKEN} is not set (pass --token or export {ENV_TOKEN})");
        };

        let enable_markdown =
            !overrides.no_markdown && markdown_enabled(env(ENV_MARKDOWN).as_deref());

        let base_url = env(ENV_BASE_URL)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let parsed = url::Url::parse(&base_url)
            .with_context(|| format!("invalid {ENV_BASE_URL}: '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("invalid {ENV_BASE_URL}: scheme must be http or https");
        }

        Ok(Self {
            token,
            enable_markdown,
            enabled_tools: enabled_tools(overrides, &env)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Enabled tool set from `--tools` or the environment; every tool by default.
/// Needs no token, so `list` can use it on its own.
pub fn enabled_tools(
    overrides: &Overrides,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<EnabledTools> {
    match overrides.tools.clone().or_else(|| env(ENV_TOOLS)) {
        Some(list) if !list.trim().is_empty() => {
            EnabledTools::parse(&list).context("invalid enabled tool list")
        }
        _ => Ok(EnabledTools::all()),
    }
}

/// Conversion is on when unset; a set value enables it only if it reads `true`.
pub fn markdown_enabled(raw: Option<&str>) -> bool {
    raw.is_none_or(|v| v.trim().eq_ignore_ascii_case("true"))
}
