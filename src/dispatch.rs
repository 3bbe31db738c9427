//! Tool dispatcher: validate arguments, route to the Notion client, render.
//!
//! `try_call` surfaces a typed [`DispatchError`]; `call` folds every error
//! into the `{"error": ...}` payload callers receive as ordinary text.

use log::{debug, info, warn};
use rmcp::model::{CallToolRequestParam, CallToolResult, Content};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::error::DispatchError;
use crate::markdown::{MarkdownRenderer, Render};
use crate::notion::{
    CommentTarget, DatabaseQuery, DatabaseUpdate, NotionClient, Page, SearchQuery,
};
use crate::tools::{self, EnabledTools, Param, Shape, ToolDef, ToolKind};

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    /// Absent and `"markdown"` select Markdown; anything else, `null`
    /// included, selects JSON.
    pub fn resolve(arg: Option<&Value>) -> Self {
        match arg {
            None => Self::Markdown,
            Some(Value::String(s)) if s == "markdown" => Self::Markdown,
            Some(_) => Self::Json,
        }
    }
}

pub struct Dispatcher {
    client: NotionClient,
    renderer: Arc<dyn Render>,
    markdown: bool,
    enabled: EnabledTools,
}

impl Dispatcher {
    pub fn new(client: NotionClient, enabled: EnabledTools) -> Self {
        Self {
            client,
            renderer: Arc::new(MarkdownRenderer),
            markdown: true,
            enabled,
        }
    }

    pub fn with_markdown(mut self, enabled: bool) -> Self {
        self.markdown = enabled;
        self
    }

    /// Enabled catalog entries, in catalog order.
    pub fn list_tools(&self) -> Vec<&'static ToolDef> {
        tools::list_tools(&self.enabled)
    }

    /// MCP entry point: always exactly one text unit, never error-flagged.
    pub async fn call_tool(&self, request: CallToolRequestParam) -> CallToolResult {
        let text = self.call(&request.name, request.arguments.as_ref()).await;
        CallToolResult::success(vec![Content::text(text)])
    }

    pub async fn call(&self, name: &str, args: Option<&JsonObject>) -> String {
        match self.try_call(name, args).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Error executing tool {name}: {e}");
                error_payload(&e)
            }
        }
    }

    pub async fn try_call(
        &self,
        name: &str,
        args: Option<&JsonObject>,
    ) -> Result<String, DispatchError> {
        info!("Received CallToolRequest: {name}");

        let args = match args {
            Some(map) if !map.is_empty() => Args(map),
            _ => return Err(DispatchError::InvalidArguments),
        };
        let def = tools::find(name).ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
        if !self.enabled.contains(def.name) {
            return Err(DispatchError::ToolDisabled(name.to_string()));
        }
        for param in def.enforced() {
            args.check(param)?;
        }

        let response = self.route(def.kind, &args).await?;

        let format = OutputFormat::resolve(args.0.get("format"));
        if self.markdown && format == OutputFormat::Markdown {
            debug!("rendering {name} response as markdown");
            Ok(self.renderer.render(&response))
        } else {
            Ok(serde_json::to_string_pretty(&response)?)
        }
    }

    async fn route(&self, kind: ToolKind, args: &Args<'_>) -> Result<Value, DispatchError> {
        let c = &self.client;
        let value = match kind {
            ToolKind::AppendBlockChildren => {
                c.append_block_children(
                    args.str("block_id")?,
                    args.value("children")?,
                    args.opt("after"),
                )
                .await?
            }
            ToolKind::RetrieveBlock => c.retrieve_block(args.str("block_id")?).await?,
            ToolKind::RetrieveBlockChildren => {
                c.retrieve_block_children(args.str("block_id")?, args.page())
                    .await?
            }
            ToolKind::DeleteBlock => c.delete_block(args.str("block_id")?).await?,
            ToolKind::UpdateBlock => {
                c.update_block(args.str("block_id")?, args.value("block")?)
                    .await?
            }
            ToolKind::RetrievePage => c.retrieve_page(args.str("page_id")?).await?,
            ToolKind::UpdatePageProperties => {
                c.update_page_properties(args.str("page_id")?, args.value("properties")?)
                    .await?
            }
            ToolKind::ListAllUsers => c.list_all_users(args.page()).await?,
            ToolKind::RetrieveUser => c.retrieve_user(args.str("user_id")?).await?,
            ToolKind::RetrieveBotUser => c.retrieve_bot_user().await?,
            ToolKind::CreateDatabase => {
                c.create_database(
                    args.value("parent")?,
                    args.value("properties")?,
                    args.opt("title"),
                )
                .await?
            }
            ToolKind::QueryDatabase => {
                let query = DatabaseQuery {
                    filter: args.opt("filter"),
                    sorts: args.opt("sorts"),
                    page: args.page(),
                };
                c.query_database(args.str("database_id")?, query).await?
            }
            ToolKind::RetrieveDatabase => c.retrieve_database(args.str("database_id")?).await?,
            ToolKind::UpdateDatabase => {
                let update = DatabaseUpdate {
                    title: args.opt("title"),
                    description: args.opt("description"),
                    properties: args.opt("properties"),
                };
                c.update_database(args.str("database_id")?, update).await?
            }
            ToolKind::CreateDatabaseItem => {
                c.create_database_item(args.str("database_id")?, args.value("properties")?)
                    .await?
            }
            ToolKind::CreateComment => {
                let target = CommentTarget {
                    parent: args.opt("parent"),
                    discussion_id: args.opt("discussion_id"),
                };
                c.create_comment(args.value("rich_text")?, target).await?
            }
            ToolKind::RetrieveComments => {
                c.retrieve_comments(args.str("block_id")?, args.page())
                    .await?
            }
            ToolKind::Search => {
                let search = SearchQuery {
                    query: args.opt("query"),
                    filter: args.opt("filter"),
                    sort: args.opt("sort"),
                    page: args.page(),
                };
                c.search(search).await?
            }
        };
        Ok(value)
    }
}

/// `{"error": "<message>"}` as compact JSON.
pub fn error_payload(err: &DispatchError) -> String {
    json!({ "error": err.to_string() }).to_string()
}

/// Borrowed, non-empty argument bag.
struct Args<'a>(&'a JsonObject);

impl Args<'_> {
    /// Presence and basic type check for one required parameter.
    fn check(&self, param: &Param) -> Result<(), DispatchError> {
        let v = self.0.get(param.name);
        let ok = match param.shape {
            Shape::Id | Shape::Text | Shape::Enum(_) => {
                return self.str(param.name).map(|_| ());
            }
            Shape::Object(_) => v.and_then(Value::as_object).is_some_and(|o| !o.is_empty()),
            Shape::Array(_) => v.and_then(Value::as_array).is_some_and(|a| !a.is_empty()),
            Shape::Number => v.is_some_and(Value::is_number),
            Shape::Nullable(_) => v.is_some(),
        };
        if ok {
            Ok(())
        } else {
            Err(DispatchError::missing(param.name))
        }
    }

    fn str(&self, field: &'static str) -> Result<&str, DispatchError> {
        match self.0.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Err(DispatchError::missing_string(field)),
        }
    }

    fn value(&self, field: &'static str) -> Result<Value, DispatchError> {
        self.opt(field).ok_or_else(|| DispatchError::missing(field))
    }

    fn opt(&self, field: &str) -> Option<Value> {
        self.0.get(field).filter(|v| !v.is_null()).cloned()
    }

    fn page(&self) -> Page {
        Page {
            start_cursor: self.opt("start_cursor"),
            page_size: self.opt("page_size"),
        }
    }
}
