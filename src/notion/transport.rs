//! HTTP transport for the Notion REST API.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use super::{ApiRequest, NotionTransport};
use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

/// reqwest-backed transport. Cheap to clone; the connection pool and
/// credentials are shared read-only across concurrent calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("notion-version", HeaderValue::from_static(NOTION_VERSION));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("notion-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl NotionTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        debug!("Notion {} {}", request.method, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .bearer_auth(&self.token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("could not read Notion error body ({status}): {e}");
                    String::new()
                }
            };
            return Err(ApiError::Status { status, body });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::NotionClient;
    use httpmock::Method::{DELETE, GET, PATCH};
    use httpmock::MockServer;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn sends_auth_and_version_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/blocks/abc-123")
                .header("authorization", "Bearer secret-token")
                .header("notion-version", NOTION_VERSION);
            then.status(200)
                .json_body(json!({"id": "abc-123", "type": "paragraph"}));
        });

        let transport =
            HttpTransport::new(&format!("{}/v1/", server.base_url()), "secret-token").unwrap();
        let value = transport
            .execute(ApiRequest::new(Method::GET, "/blocks/abc-123"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(value, json!({"id": "abc-123", "type": "paragraph"}));
    }

    #[tokio::test]
    async fn forwards_query_and_json_body() {
        let server = MockServer::start();
        let list = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/comments")
                .query_param("block_id", "b1")
                .query_param("page_size", "5");
            then.status(200).json_body(json!({"object": "list", "results": []}));
        });
        let patch = server.mock(|when, then| {
            when.method(PATCH)
                .path("/v1/pages/p1")
                .header("content-type", "application/json")
                .json_body(json!({"properties": {"Done": {"checkbox": true}}}));
            then.status(200).json_body(json!({"object": "page", "id": "p1"}));
        });

        let transport =
            HttpTransport::new(&format!("{}/v1", server.base_url()), "t").unwrap();
        let mut req = ApiRequest::new(Method::GET, "/comments");
        req.query = vec![("block_id", "b1".into()), ("page_size", "5".into())];
        transport.execute(req).await.unwrap();

        let req = ApiRequest::new(Method::PATCH, "/pages/p1")
            .with_body(json!({"properties": {"Done": {"checkbox": true}}}));
        transport.execute(req).await.unwrap();

        list.assert();
        patch.assert();
    }

    #[tokio::test]
    async fn error_status_keeps_body_verbatim() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/pages/missing");
            then.status(404)
                .body(r#"{"object":"error","status":404,"code":"object_not_found"}"#);
        });

        let transport =
            HttpTransport::new(&format!("{}/v1", server.base_url()), "t").unwrap();
        let err = transport
            .execute(ApiRequest::new(Method::GET, "/pages/missing"))
            .await
            .unwrap_err();

        match &err {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 404);
                assert!(body.contains("object_not_found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(err.to_string().contains(r#""code":"object_not_found""#));
    }

    #[tokio::test]
    async fn escaped_id_cannot_reach_another_endpoint() {
        let server = MockServer::start();
        let database = server.mock(|when, then| {
            when.method(DELETE).path("/v1/databases/db1");
            then.status(200)
                .json_body(json!({"object": "database", "archived": true}));
        });

        let transport = HttpTransport::new(&format!("{}/v1", server.base_url()), "t").unwrap();
        let client = NotionClient::new(Arc::new(transport));
        let result = client.delete_block("x/../../databases/db1").await;

        database.assert_hits(0);
        assert!(matches!(result, Err(ApiError::Status { .. })));
    }

    #[tokio::test]
    async fn undecodable_body_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/users/me");
            then.status(200).body("not json");
        });

        let transport =
            HttpTransport::new(&format!("{}/v1", server.base_url()), "t").unwrap();
        let err = transport
            .execute(ApiRequest::new(Method::GET, "/users/me"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
