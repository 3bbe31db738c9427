//! Tool catalog: the fixed, ordered set of Notion tools.
//!
//! Each [`ToolDef`] couples a [`ToolKind`] (what the dispatcher routes on)
//! with the parameter table its published schema and call-time checks are
//! derived from. Catalog order is the listing order.

pub mod schema;

use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::fmt;

pub use schema::{Param, Rule, Shape};
use schema::{BLOCK, RICH_TEXT, SORT_DIRECTION};

/// One variant per tool; the dispatcher matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    AppendBlockChildren,
    RetrieveBlock,
    RetrieveBlockChildren,
    DeleteBlock,
    UpdateBlock,
    RetrievePage,
    UpdatePageProperties,
    ListAllUsers,
    RetrieveUser,
    RetrieveBotUser,
    CreateDatabase,
    QueryDatabase,
    RetrieveDatabase,
    UpdateDatabase,
    CreateDatabaseItem,
    CreateComment,
    RetrieveComments,
    Search,
}

#[derive(Debug)]
pub struct ToolDef {
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [Param],
}

impl ToolDef {
    /// JSON Schema object published as the tool's `inputSchema`.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = match schema::properties(self.params) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        properties.insert("format".into(), schema::format_param_schema());

        let mut obj = Map::new();
        obj.insert("type".into(), json!("object"));
        obj.insert("properties".into(), Value::Object(properties));
        let required = schema::required_names(self.params);
        if !required.is_empty() {
            obj.insert("required".into(), json!(required));
        }
        obj
    }

    /// Parameters checked for presence and type before the remote call.
    pub fn enforced(&self) -> impl Iterator<Item = &'static Param> + '_ {
        self.params.iter().filter(|p| p.rule == Rule::Required)
    }

    pub fn param(&self, name: &str) -> Option<&'static Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

impl ToolKind {
    pub fn def(self) -> &'static ToolDef {
        // Every variant has exactly one entry; see `every_kind_has_one_entry`.
        CATALOG
            .iter()
            .find(|d| d.kind == self)
            .unwrap_or(&CATALOG[0])
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.def().name)
    }
}

/// Look up a catalog entry by exact tool name.
pub fn find(name: &str) -> Option<&'static ToolDef> {
    CATALOG.iter().find(|d| d.name == name)
}

/// Names of every catalog entry, in catalog order.
pub fn all_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|d| d.name)
}

/// Catalog entries whose name is enabled, in catalog order.
pub fn list_tools(enabled: &EnabledTools) -> Vec<&'static ToolDef> {
    CATALOG.iter().filter(|d| enabled.contains(d.name)).collect()
}

/* ---- Enabled set ---- */

/// Tool names exposed by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledTools {
    names: BTreeSet<String>,
}

impl EnabledTools {
    pub fn all() -> Self {
        Self {
            names: all_names().map(str::to_string).collect(),
        }
    }

    /// Parse a comma-separated list of catalog names. Blank entries are
    /// ignored; names missing from the catalog are rejected.
    pub fn parse(list: &str) -> Result<Self, UnknownToolName> {
        let mut names = BTreeSet::new();
        for raw in list.split(',') {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            if find(name).is_none() {
                return Err(UnknownToolName(name.to_string()));
            }
            names.insert(name.to_string());
        }
        Ok(Self { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for EnabledTools {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tool name '{0}' (run `notion-mcp list --all` for the catalog)")]
pub struct UnknownToolName(pub String);

/* ---- Catalog ---- */

const PAGE_SIZE_DESC: &str = "Number of results per page (max 100)";
const CURSOR_DESC: &str = "Pagination cursor for next page of results";

const SORT_ITEM: Shape = Shape::Object(&[
    Param::field("property", Shape::Text),
    Param::field("timestamp", Shape::Text),
    Param::required("direction", SORT_DIRECTION, ""),
]);

static CATALOG: [ToolDef; 18] = [
    // Blocks
    ToolDef {
        kind: ToolKind::AppendBlockChildren,
        name: "notion_append_block_children",
        description: "Append new children blocks to a specified parent block in Notion. Requires insert content capabilities. You can optionally specify the 'after' parameter to append after a certain block.",
        params: &[
            Param::required("block_id", Shape::Id, "The ID of the parent block."),
            Param::required(
                "children",
                Shape::Array(&BLOCK),
                "Array of block objects to append. Each block must follow the Notion block schema.",
            ),
            Param::optional(
                "after",
                Shape::Id,
                "The ID of the existing block that the new block should be appended after.",
            ),
        ],
    },
    ToolDef {
        kind: ToolKind::RetrieveBlock,
        name: "notion_retrieve_block",
        description: "Retrieve a block from Notion",
        params: &[Param::required(
            "block_id",
            Shape::Id,
            "The ID of the block to retrieve.",
        )],
    },
    ToolDef {
        kind: ToolKind::RetrieveBlockChildren,
        name: "notion_retrieve_block_children",
        description: "Retrieve the children of a block",
        params: &[
            Param::required("block_id", Shape::Id, "The ID of the block."),
            Param::optional("start_cursor", Shape::Text, CURSOR_DESC),
            Param::optional("page_size", Shape::Number, PAGE_SIZE_DESC),
        ],
    },
    ToolDef {
        kind: ToolKind::DeleteBlock,
        name: "notion_delete_block",
        description: "Delete a block in Notion",
        params: &[Param::required(
            "block_id",
            Shape::Id,
            "The ID of the block to delete.",
        )],
    },
    ToolDef {
        kind: ToolKind::UpdateBlock,
        name: "notion_update_block",
        description: "Update the content of a block in Notion based on its type. The update replaces the entire value for a given field.",
        params: &[
            Param::required("block_id", Shape::Id, "The ID of the block to update."),
            Param::required(
                "block",
                Shape::Object(&[]),
                "The updated content for the block. Must match the block's type schema.",
            ),
        ],
    },
    // Pages
    ToolDef {
        kind: ToolKind::RetrievePage,
        name: "notion_retrieve_page",
        description: "Retrieve a page from Notion",
        params: &[Param::required(
            "page_id",
            Shape::Id,
            "The ID of the page to retrieve.",
        )],
    },
    ToolDef {
        kind: ToolKind::UpdatePageProperties,
        name: "notion_update_page_properties",
        description: "Update properties of a page or an item in a Notion database",
        params: &[
            Param::required(
                "page_id",
                Shape::Id,
                "The ID of the page or database item to update.",
            ),
            Param::required(
                "properties",
                Shape::Object(&[]),
                "Properties to update. These correspond to the columns or fields in the database.",
            ),
        ],
    },
    // Users
    ToolDef {
        kind: ToolKind::ListAllUsers,
        name: "notion_list_all_users",
        description: "List all users in the Notion workspace. **Note:** This function requires upgrading to the Notion Enterprise plan and using an Organization API key to avoid permission errors.",
        params: &[
            Param::optional(
                "start_cursor",
                Shape::Text,
                "Pagination start cursor for listing users",
            ),
            Param::optional(
                "page_size",
                Shape::Number,
                "Number of users to retrieve (max 100)",
            ),
        ],
    },
    ToolDef {
        kind: ToolKind::RetrieveUser,
        name: "notion_retrieve_user",
        description: "Retrieve a specific user by user_id in Notion. **Note:** This function requires upgrading to the Notion Enterprise plan and using an Organization API key to avoid permission errors.",
        params: &[Param::required(
            "user_id",
            Shape::Id,
            "The ID of the user to retrieve.",
        )],
    },
    ToolDef {
        kind: ToolKind::RetrieveBotUser,
        name: "notion_retrieve_bot_user",
        description: "Retrieve the bot user associated with the current token in Notion",
        params: &[Param::placeholder(
            "random_string",
            "Dummy parameter for no-parameter tools",
        )],
    },
    // Databases
    ToolDef {
        kind: ToolKind::CreateDatabase,
        name: "notion_create_database",
        description: "Create a database in Notion",
        params: &[
            Param::required(
                "parent",
                Shape::Object(&[]),
                "Parent object of the database",
            ),
            Param::optional(
                "title",
                Shape::Array(&RICH_TEXT),
                "Title of database as it appears in Notion. An array of rich text objects.",
            ),
            Param::required(
                "properties",
                Shape::Object(&[]),
                "Property schema of database. The keys are the names of properties as they appear in Notion and the values are property schema objects.",
            ),
        ],
    },
    ToolDef {
        kind: ToolKind::QueryDatabase,
        name: "notion_query_database",
        description: "Query a database in Notion",
        params: &[
            Param::required(
                "database_id",
                Shape::Id,
                "The ID of the database to query.",
            ),
            Param::optional("filter", Shape::Object(&[]), "Filter conditions"),
            Param::optional("sorts", Shape::Array(&SORT_ITEM), "Sort conditions"),
            Param::optional("start_cursor", Shape::Text, CURSOR_DESC),
            Param::optional("page_size", Shape::Number, PAGE_SIZE_DESC),
        ],
    },
    ToolDef {
        kind: ToolKind::RetrieveDatabase,
        name: "notion_retrieve_database",
        description: "Retrieve a database in Notion",
        params: &[Param::required(
            "database_id",
            Shape::Id,
            "The ID of the database to retrieve.",
        )],
    },
    ToolDef {
        kind: ToolKind::UpdateDatabase,
        name: "notion_update_database",
        description: "Update a database in Notion",
        params: &[
            Param::required(
                "database_id",
                Shape::Id,
                "The ID of the database to update.",
            ),
            Param::optional(
                "title",
                Shape::Array(&RICH_TEXT),
                "An array of rich text objects that represents the title of the database that is displayed in the Notion UI.",
            ),
            Param::optional(
                "description",
                Shape::Array(&RICH_TEXT),
                "An array of rich text objects that represents the description of the database that is displayed in the Notion UI.",
            ),
            Param::optional(
                "properties",
                Shape::Object(&[]),
                "The properties of a database to be changed in the request, in the form of a JSON object.",
            ),
        ],
    },
    ToolDef {
        kind: ToolKind::CreateDatabaseItem,
        name: "notion_create_database_item",
        description: "Create a new item (page) in a Notion database",
        params: &[
            Param::required(
                "database_id",
                Shape::Id,
                "The ID of the database to add the item to.",
            ),
            Param::required(
                "properties",
                Shape::Object(&[]),
                "Properties of the new database item. These should match the database schema.",
            ),
        ],
    },
    // Comments
    ToolDef {
        kind: ToolKind::CreateComment,
        name: "notion_create_comment",
        description: "Create a comment in Notion. This requires the integration to have 'insert comment' capabilities. You can either specify a page parent or a discussion_id, but not both.",
        params: &[
            Param::optional(
                "parent",
                Shape::Object(&[Param::optional(
                    "page_id",
                    Shape::Id,
                    "The ID of the page to comment on.",
                )]),
                "Parent object that specifies the page to comment on. Must include a page_id if used.",
            ),
            Param::optional(
                "discussion_id",
                Shape::Id,
                "The ID of an existing discussion thread to add a comment to.",
            ),
            Param::required(
                "rich_text",
                Shape::Array(&RICH_TEXT),
                "Array of rich text objects representing the comment content.",
            ),
        ],
    },
    ToolDef {
        kind: ToolKind::RetrieveComments,
        name: "notion_retrieve_comments",
        description: "Retrieve a list of unresolved comments from a Notion page or block. Requires the integration to have 'read comment' capabilities.",
        params: &[
            Param::required(
                "block_id",
                Shape::Id,
                "The ID of the block or page whose comments you want to retrieve.",
            ),
            Param::optional(
                "start_cursor",
                Shape::Text,
                "If supplied, returns a page of results starting after the cursor.",
            ),
            Param::optional(
                "page_size",
                Shape::Number,
                "Number of comments to retrieve (max 100).",
            ),
        ],
    },
    // Search
    ToolDef {
        kind: ToolKind::Search,
        name: "notion_search",
        description: "Search pages or databases by title in Notion",
        params: &[
            Param::optional(
                "query",
                Shape::Text,
                "Text to search for in page or database titles",
            ),
            Param::optional(
                "filter",
                Shape::Object(&[
                    Param::optional("property", Shape::Text, "Must be 'object'"),
                    Param::optional("value", Shape::Text, "Either 'page' or 'database'"),
                ]),
                "Filter results by object type (page or database)",
            ),
            Param::optional(
                "sort",
                Shape::Object(&[
                    Param::field("direction", SORT_DIRECTION),
                    Param::field("timestamp", Shape::Enum(&["last_edited_time"])),
                ]),
                "Sort order of results",
            ),
            Param::optional("start_cursor", Shape::Text, "Pagination start cursor"),
            Param::optional(
                "page_size",
                Shape::Number,
                "Number of results to return (max 100). ",
            ),
        ],
    },
];
