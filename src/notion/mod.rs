//! Notion API client.
//!
//! [`NotionClient`] has one method per remote resource-and-verb pair. Each
//! method only shapes an [`ApiRequest`]; sending it is the job of a
//! [`NotionTransport`] (`HttpTransport` in production, a recorder in tests).
//! Optional arguments that are absent or `null` never reach the request.
//! Identifiers are percent-encoded into exactly one path segment.

pub mod transport;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value, json};
use std::borrow::Cow;
use std::sync::Arc;

use crate::error::ApiError;
pub use transport::HttpTransport;

/// A single outbound call, described before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn with_query(mut self, key: &'static str, value: Option<Value>) -> Self {
        if let Some(v) = present(value) {
            let s = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.query.push((key, s));
        }
        self
    }

    fn with_page(self, page: Page) -> Self {
        self.with_query("start_cursor", page.start_cursor)
            .with_query("page_size", page.page_size)
    }
}

#[async_trait]
pub trait NotionTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Single-page cursor arguments; `None` means "remote default".
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub start_cursor: Option<Value>,
    pub page_size: Option<Value>,
}

/// Optional payload fragments for `POST /databases/{id}/query`.
#[derive(Debug, Clone, Default)]
pub struct DatabaseQuery {
    pub filter: Option<Value>,
    pub sorts: Option<Value>,
    pub page: Page,
}

/// Optional payload fragments for `PATCH /databases/{id}`.
#[derive(Debug, Clone, Default)]
pub struct DatabaseUpdate {
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub properties: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentTarget {
    pub parent: Option<Value>,
    pub discussion_id: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: Option<Value>,
    pub filter: Option<Value>,
    pub sort: Option<Value>,
    pub page: Page,
}

#[derive(Clone)]
pub struct NotionClient {
    transport: Arc<dyn NotionTransport>,
}

impl NotionClient {
    pub fn new(transport: Arc<dyn NotionTransport>) -> Self {
        Self { transport }
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.transport.execute(request).await
    }

    /* ---- Blocks ---- */

    pub async fn append_block_children(
        &self,
        block_id: &str,
        children: Value,
        after: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut body = Map::new();
        body.insert("children".into(), children);
        put(&mut body, "after", after);
        let path = format!("/blocks/{}/children", segment(block_id)?);
        self.send(ApiRequest::new(Method::PATCH, path).with_body(body.into()))
            .await
    }

    pub async fn retrieve_block(&self, block_id: &str) -> Result<Value, ApiError> {
        let path = format!("/blocks/{}", segment(block_id)?);
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn retrieve_block_children(
        &self,
        block_id: &str,
        page: Page,
    ) -> Result<Value, ApiError> {
        let path = format!("/blocks/{}/children", segment(block_id)?);
        self.send(ApiRequest::new(Method::GET, path).with_page(page))
            .await
    }

    pub async fn delete_block(&self, block_id: &str) -> Result<Value, ApiError> {
        let path = format!("/blocks/{}", segment(block_id)?);
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    /// The block object itself is the request body.
    pub async fn update_block(&self, block_id: &str, block: Value) -> Result<Value, ApiError> {
        let path = format!("/blocks/{}", segment(block_id)?);
        self.send(ApiRequest::new(Method::PATCH, path).with_body(block))
            .await
    }

    /* ---- Pages ---- */

    pub async fn retrieve_page(&self, page_id: &str) -> Result<Value, ApiError> {
        let path = format!("/pages/{}", segment(page_id)?);
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn update_page_properties(
        &self,
        page_id: &str,
        properties: Value,
    ) -> Result<Value, ApiError> {
        let path = format!("/pages/{}", segment(page_id)?);
        let body = json!({ "properties": properties });
        self.send(ApiRequest::new(Method::PATCH, path).with_body(body))
            .await
    }

    /* ---- Users ---- */

    pub async fn list_all_users(&self, page: Page) -> Result<Value, ApiError> {
        self.send(ApiRequest::new(Method::GET, "/users").with_page(page))
            .await
    }

    pub async fn retrieve_user(&self, user_id: &str) -> Result<Value, ApiError> {
        let path = format!("/users/{}", segment(user_id)?);
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn retrieve_bot_user(&self) -> Result<Value, ApiError> {
        self.send(ApiRequest::new(Method::GET, "/users/me")).await
    }

    /* ---- Databases ---- */

    pub async fn create_database(
        &self,
        parent: Value,
        properties: Value,
        title: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut body = Map::new();
        body.insert("parent".into(), parent);
        body.insert("properties".into(), properties);
        put(&mut body, "title", title);
        self.send(ApiRequest::new(Method::POST, "/databases").with_body(body.into()))
            .await
    }

    /// Cursor and page size travel in the body for this endpoint.
    pub async fn query_database(
        &self,
        database_id: &str,
        query: DatabaseQuery,
    ) -> Result<Value, ApiError> {
        let mut body = Map::new();
        put(&mut body, "filter", query.filter);
        put(&mut body, "sorts", query.sorts);
        put(&mut body, "start_cursor", query.page.start_cursor);
        put(&mut body, "page_size", query.page.page_size);
        let path = format!("/databases/{}/query", segment(database_id)?);
        self.send(ApiRequest::new(Method::POST, path).with_body(body.into()))
            .await
    }

    pub async fn retrieve_database(&self, database_id: &str) -> Result<Value, ApiError> {
        let path = format!("/databases/{}", segment(database_id)?);
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn update_database(
        &self,
        database_id: &str,
        update: DatabaseUpdate,
    ) -> Result<Value, ApiError> {
        let mut body = Map::new();
        put(&mut body, "title", update.title);
        put(&mut body, "description", update.description);
        put(&mut body, "properties", update.properties);
        let path = format!("/databases/{}", segment(database_id)?);
        self.send(ApiRequest::new(Method::PATCH, path).with_body(body.into()))
            .await
    }

    /// Creates a page whose parent is the given database.
    pub async fn create_database_item(
        &self,
        database_id: &str,
        properties: Value,
    ) -> Result<Value, ApiError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        self.send(ApiRequest::new(Method::POST, "/pages").with_body(body))
            .await
    }

    /* ---- Comments ---- */

    pub async fn create_comment(
        &self,
        rich_text: Value,
        target: CommentTarget,
    ) -> Result<Value, ApiError> {
        let mut body = Map::new();
        body.insert("rich_text".into(), rich_text);
        put(&mut body, "parent", target.parent);
        put(&mut body, "discussion_id", target.discussion_id);
        self.send(ApiRequest::new(Method::POST, "/comments").with_body(body.into()))
            .await
    }

    pub async fn retrieve_comments(&self, block_id: &str, page: Page) -> Result<Value, ApiError> {
        let request = ApiRequest::new(Method::GET, "/comments")
            .with_query("block_id", Some(Value::String(block_id.to_string())))
            .with_page(page);
        self.send(request).await
    }

    /* ---- Search ---- */

    pub async fn search(&self, search: SearchQuery) -> Result<Value, ApiError> {
        let mut body = Map::new();
        put(&mut body, "query", search.query);
        put(&mut body, "filter", search.filter);
        put(&mut body, "sort", search.sort);
        put(&mut body, "start_cursor", search.page.start_cursor);
        put(&mut body, "page_size", search.page.page_size);
        self.send(ApiRequest::new(Method::POST, "/search").with_body(body.into()))
            .await
    }
}

/// Percent-encode `id` as a single path segment. `.` and `..` are rejected
/// since URL normalisation resolves them even when escaped.
fn segment(id: &str) -> Result<Cow<'_, str>, ApiError> {
    match id {
        "." | ".." => Err(ApiError::InvalidId(id.to_string())),
        _ => Ok(urlencoding::encode(id)),
    }
}

fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

fn put(body: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = present(value) {
        body.insert(key.to_string(), v);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingTransport;
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> (NotionClient, Arc<RecordingTransport>) {
        let transport = RecordingTransport::replying(json!({"object": "list"}));
        (NotionClient::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn page_arguments_become_query_params() {
        let (c, t) = client();
        c.retrieve_block_children(
            "b1",
            Page {
                start_cursor: Some(json!("cur")),
                page_size: Some(json!(10)),
            },
        )
        .await
        .unwrap();
        let req = &t.recorded()[0];
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/blocks/b1/children");
        assert_eq!(
            req.query,
            vec![("start_cursor", "cur".to_string()), ("page_size", "10".to_string())]
        );
        assert_eq!(req.body, None);
    }

    #[tokio::test]
    async fn null_optionals_are_omitted() {
        let (c, t) = client();
        c.search(SearchQuery {
            query: Some(json!("roadmap")),
            filter: Some(Value::Null),
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(t.recorded()[0].body, Some(json!({"query": "roadmap"})));
    }

    #[tokio::test]
    async fn query_database_puts_cursor_in_body() {
        let (c, t) = client();
        c.query_database(
            "db1",
            DatabaseQuery {
                sorts: Some(json!([{"property": "Name", "direction": "ascending"}])),
                page: Page {
                    start_cursor: None,
                    page_size: Some(json!(3)),
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let req = &t.recorded()[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/databases/db1/query");
        assert!(req.query.is_empty());
        assert_eq!(
            req.body,
            Some(json!({
                "sorts": [{"property": "Name", "direction": "ascending"}],
                "page_size": 3
            }))
        );
    }

    #[tokio::test]
    async fn database_item_is_a_page_under_the_database() {
        let (c, t) = client();
        c.create_database_item("db1", json!({"Name": {"title": []}}))
            .await
            .unwrap();
        let req = &t.recorded()[0];
        assert_eq!(req.path, "/pages");
        assert_eq!(
            req.body,
            Some(json!({
                "parent": {"database_id": "db1"},
                "properties": {"Name": {"title": []}}
            }))
        );
    }

    #[tokio::test]
    async fn comments_always_carry_block_id() {
        let (c, t) = client();
        c.retrieve_comments("blk", Page::default()).await.unwrap();
        let req = &t.recorded()[0];
        assert_eq!(req.path, "/comments");
        assert_eq!(req.query, vec![("block_id", "blk".to_string())]);
    }

    #[tokio::test]
    async fn ids_stay_in_one_path_segment() {
        let (c, t) = client();
        c.delete_block("x/../../databases/db1").await.unwrap();
        c.retrieve_page("p1?filter=a#frag").await.unwrap();
        let reqs = t.recorded();
        assert_eq!(reqs[0].method, Method::DELETE);
        assert_eq!(reqs[0].path, "/blocks/x%2F..%2F..%2Fdatabases%2Fdb1");
        assert_eq!(reqs[1].path, "/pages/p1%3Ffilter%3Da%23frag");
    }

    #[tokio::test]
    async fn dot_segments_are_refused() {
        let (c, t) = client();
        let err = c.retrieve_user("..").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidId(_)));
        assert!(c.retrieve_block(".").await.is_err());
        assert!(t.recorded().is_empty());
    }

    #[tokio::test]
    async fn bot_user_path() {
        let (c, t) = client();
        c.retrieve_bot_user().await.unwrap();
        assert_eq!(t.recorded()[0].path, "/users/me");
    }
}
