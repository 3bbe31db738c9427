//! Error types for the Notion client and the tool dispatcher.

use reqwest::StatusCode;

/// Failure talking to the Notion API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-success status; `body` is the raw response text.
    #[error("Notion API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("request to Notion failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode Notion response: {0}")]
    Decode(String),

    /// An identifier that cannot stand as one URL path segment.
    #[error("Invalid identifier: '{0}'")]
    InvalidId(String),
}

/// Failure of a single tool call. Every variant is turned into an
/// `{"error": ...}` payload at the dispatch boundary.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No arguments provided")]
    InvalidArguments,

    #[error("Missing required {expected}argument: {field}")]
    MissingArgument {
        field: &'static str,
        /// `"string "` for identifier/text fields, empty otherwise.
        expected: &'static str,
    },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool not enabled: {0}")]
    ToolDisabled(String),

    #[error(transparent)]
    Remote(#[from] ApiError),

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DispatchError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingArgument {
            field,
            expected: "",
        }
    }

    pub fn missing_string(field: &'static str) -> Self {
        Self::MissingArgument {
            field,
            expected: "string ",
        }
    }
}
