//! Markdown rendering of Notion API responses.
//!
//! Objects are recognised by their `object` field. Anything the renderer
//! does not know how to present is emitted as a fenced JSON block, so no
//! response is ever lost.

use serde_json::Value;

/// Turns a Notion response into display text.
pub trait Render: Send + Sync {
    fn render(&self, response: &Value) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl Render for MarkdownRenderer {
    fn render(&self, response: &Value) -> String {
        let out = match object_kind(response) {
            "list" => render_list(response),
            "block" => render_block(response, 0),
            "page" => render_page(response),
            "database" => render_database(response),
            "user" => render_user(response),
            "comment" => render_comment(response),
            _ => fenced_json(response),
        };
        out.trim_end().to_string()
    }
}

fn object_kind(v: &Value) -> &str {
    v.get("object").and_then(Value::as_str).unwrap_or("")
}

fn str_at<'a>(v: &'a Value, key: &str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or("")
}

fn fenced_json(v: &Value) -> String {
    let body = serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string());
    format!("```json\n{body}\n```")
}

/* ---- Lists ---- */

fn render_list(list: &Value) -> String {
    let results = list
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut out = String::new();
    if results.is_empty() {
        out.push_str("_No results._");
    }

    let mut prev: Option<&str> = None;
    for item in results {
        let kind = object_kind(item);
        let text = match kind {
            "block" => render_block(item, 0),
            "page" | "database" => summary_line(item),
            "user" => format!("- {}", render_user(item)),
            "comment" => render_comment(item),
            _ => fenced_json(item),
        };
        if let Some(p) = prev {
            out.push_str(if tight(p, item) { "\n" } else { "\n\n" });
        }
        out.push_str(&text);
        prev = Some(block_type_or_kind(item));
    }

    if list.get("has_more").and_then(Value::as_bool) == Some(true) {
        let cursor = str_at(list, "next_cursor");
        out.push_str(&format!(
            "\n\n_More results available. next_cursor: `{cursor}`_"
        ));
    }
    out
}

fn block_type_or_kind(item: &Value) -> &str {
    match object_kind(item) {
        "block" => str_at(item, "type"),
        other => other,
    }
}

/// Consecutive items of one list-like kind are joined without a blank line.
fn tight(prev: &str, item: &Value) -> bool {
    let cur = block_type_or_kind(item);
    prev == cur
        && matches!(
            cur,
            "bulleted_list_item"
                | "numbered_list_item"
                | "to_do"
                | "table_row"
                | "page"
                | "database"
                | "user"
        )
}

fn summary_line(item: &Value) -> String {
    let title = match object_kind(item) {
        "database" => rich_text(&item["title"]),
        _ => page_title(item),
    };
    let title = if title.is_empty() { "Untitled".to_string() } else { title };
    match item.get("url").and_then(Value::as_str) {
        Some(url) => format!("- [{title}]({url})"),
        None => format!("- {title}"),
    }
}

/* ---- Rich text ---- */

/// Concatenate a rich text array, applying annotations and links.
pub fn rich_text(v: &Value) -> String {
    let Some(items) = v.as_array() else {
        return String::new();
    };
    items.iter().map(rich_text_item).collect()
}

fn rich_text_item(item: &Value) -> String {
    if str_at(item, "type") == "equation" {
        let expr = item["equation"]["expression"]
            .as_str()
            .unwrap_or_else(|| str_at(item, "plain_text"));
        return format!("${expr}$");
    }

    let mut text = match item.get("plain_text").and_then(Value::as_str) {
        Some(t) => t.to_string(),
        None => item["text"]["content"].as_str().unwrap_or("").to_string(),
    };
    if text.is_empty() {
        return text;
    }

    let ann = &item["annotations"];
    let on = |key: &str| ann.get(key).and_then(Value::as_bool) == Some(true);
    if on("code") {
        text = format!("`{text}`");
    }
    if on("bold") {
        text = format!("**{text}**");
    }
    if on("italic") {
        text = format!("*{text}*");
    }
    if on("strikethrough") {
        text = format!("~~{text}~~");
    }

    let href = item
        .get("href")
        .and_then(Value::as_str)
        .or_else(|| item["text"]["link"]["url"].as_str());
    match href {
        Some(url) => format!("[{text}]({url})"),
        None => text,
    }
}

/* ---- Blocks ---- */

fn render_block(block: &Value, depth: usize) -> String {
    let ty = str_at(block, "type");
    let data = &block[ty];
    let text = rich_text(&data["rich_text"]);

    let line = match ty {
        "paragraph" => text,
        "heading_1" => format!("# {text}"),
        "heading_2" => format!("## {text}"),
        "heading_3" => format!("### {text}"),
        "bulleted_list_item" => format!("- {text}"),
        "numbered_list_item" => format!("1. {text}"),
        "to_do" => {
            let mark = if data["checked"].as_bool() == Some(true) { "x" } else { " " };
            format!("- [{mark}] {text}")
        }
        "quote" => format!("> {text}"),
        "callout" => {
            let icon = data["icon"]["emoji"].as_str().unwrap_or("");
            format!("> {icon} {text}").replace(">  ", "> ")
        }
        "toggle" => format!("<details><summary>{text}</summary></details>"),
        "code" => {
            let lang = str_at(data, "language");
            format!("```{lang}\n{text}\n```")
        }
        "divider" => "---".to_string(),
        "equation" => format!("$$\n{}\n$$", str_at(data, "expression")),
        "child_page" | "child_database" => format!("**{}**", str_at(data, "title")),
        "image" => format!("![{}]({})", rich_text(&data["caption"]), file_url(data)),
        "video" | "file" | "pdf" | "audio" => {
            let caption = rich_text(&data["caption"]);
            let label = if caption.is_empty() { ty.to_string() } else { caption };
            format!("[{label}]({})", file_url(data))
        }
        "bookmark" | "embed" | "link_preview" => {
            let url = str_at(data, "url");
            format!("[{url}]({url})")
        }
        "table_row" => {
            let cells: Vec<String> = data["cells"]
                .as_array()
                .map(|cells| cells.iter().map(|c| table_cell(&rich_text(c))).collect())
                .unwrap_or_default();
            format!("| {} |", cells.join(" | "))
        }
        "" => return fenced_json(block),
        other => format!("<!-- unsupported block: {other} -->"),
    };

    let indent = "  ".repeat(depth);
    let mut out = indent_lines(&line, &indent);
    if let Some(children) = data.get("children").and_then(Value::as_array) {
        for child in children {
            out.push('\n');
            out.push_str(&render_block(child, depth + 1));
        }
    }
    out
}

fn indent_lines(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    text.lines()
        .map(|l| format!("{indent}{l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// URL of a hosted or external file object.
fn file_url(data: &Value) -> &str {
    data["external"]["url"]
        .as_str()
        .or_else(|| data["file"]["url"].as_str())
        .unwrap_or("")
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

/* ---- Pages and databases ---- */

fn page_title(page: &Value) -> String {
    page.get("properties")
        .and_then(Value::as_object)
        .and_then(|props| props.values().find(|p| str_at(p, "type") == "title"))
        .map(|p| rich_text(&p["title"]))
        .unwrap_or_default()
}

fn render_page(page: &Value) -> String {
    let title = page_title(page);
    let mut out = format!("# {}\n", if title.is_empty() { "Untitled" } else { &title });

    let rows: Vec<(String, String)> = page
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .filter(|(_, p)| str_at(p, "type") != "title")
                .map(|(name, p)| (table_cell(name), table_cell(&property_value(p))))
                .collect()
        })
        .unwrap_or_default();

    if !rows.is_empty() {
        out.push_str("\n| Property | Value |\n| --- | --- |\n");
        for (name, value) in rows {
            out.push_str(&format!("| {name} | {value} |\n"));
        }
    }
    if let Some(url) = page.get("url").and_then(Value::as_str) {
        out.push_str(&format!("\n{url}\n"));
    }
    out
}

fn property_value(p: &Value) -> String {
    let ty = str_at(p, "type");
    let v = &p[ty];
    match ty {
        "title" | "rich_text" => rich_text(v),
        "select" | "status" => str_at(v, "name").to_string(),
        "multi_select" | "people" | "files" => join_names(v),
        "relation" => v
            .as_array()
            .map(|r| r.iter().map(|x| str_at(x, "id")).collect::<Vec<_>>().join(", "))
            .unwrap_or_default(),
        "date" => match (v["start"].as_str(), v["end"].as_str()) {
            (Some(s), Some(e)) => format!("{s} → {e}"),
            (Some(s), None) => s.to_string(),
            _ => String::new(),
        },
        "checkbox" => (v.as_bool() == Some(true)).to_string(),
        "formula" => {
            let inner = str_at(v, "type");
            scalar(&v[inner])
        }
        "unique_id" => match v["prefix"].as_str() {
            Some(prefix) => format!("{prefix}-{}", scalar(&v["number"])),
            None => scalar(&v["number"]),
        },
        "created_by" | "last_edited_by" => str_at(v, "name").to_string(),
        _ => scalar(v),
    }
}

fn join_names(v: &Value) -> String {
    v.as_array()
        .map(|items| {
            items
                .iter()
                .map(|i| str_at(i, "name"))
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn scalar(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_database(db: &Value) -> String {
    let title = rich_text(&db["title"]);
    let mut out = format!("# {}\n", if title.is_empty() { "Untitled" } else { &title });

    let description = rich_text(&db["description"]);
    if !description.is_empty() {
        out.push_str(&format!("\n{description}\n"));
    }

    if let Some(props) = db.get("properties").and_then(Value::as_object) {
        out.push_str("\n| Property | Type |\n| --- | --- |\n");
        for (name, p) in props {
            out.push_str(&format!("| {} | {} |\n", table_cell(name), str_at(p, "type")));
        }
    }
    if let Some(url) = db.get("url").and_then(Value::as_str) {
        out.push_str(&format!("\n{url}\n"));
    }
    out
}

/* ---- Users and comments ---- */

fn render_user(user: &Value) -> String {
    let name = user
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_else(|| str_at(user, "id"));
    let mut out = format!("**{name}**");
    let ty = str_at(user, "type");
    if !ty.is_empty() {
        out.push_str(&format!(" ({ty})"));
    }
    if let Some(email) = user["person"]["email"].as_str() {
        out.push_str(&format!(" <{email}>"));
    }
    out
}

fn render_comment(comment: &Value) -> String {
    let text = rich_text(&comment["rich_text"]);
    let mut out = format!("> {text}");
    let when = str_at(comment, "created_time");
    let who = comment["created_by"]["id"].as_str().unwrap_or("");
    if !when.is_empty() || !who.is_empty() {
        out.push_str(&format!("\n\n`{who}` {when}"));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text(s: &str) -> Value {
        json!([{"type": "text", "text": {"content": s, "link": null}, "plain_text": s, "href": null}])
    }

    fn block(ty: &str, data: Value) -> Value {
        json!({"object": "block", "id": "b", "type": ty, ty: data})
    }

    #[test]
    fn block_children_list() {
        let list = json!({
            "object": "list",
            "results": [
                block("heading_1", json!({"rich_text": text("Plan")})),
                block("paragraph", json!({"rich_text": text("Intro")})),
                block("bulleted_list_item", json!({"rich_text": text("one")})),
                block("bulleted_list_item", json!({"rich_text": text("two")})),
                block("to_do", json!({"rich_text": text("ship"), "checked": true})),
            ],
            "has_more": false,
            "next_cursor": null
        });
        assert_eq!(
            MarkdownRenderer.render(&list),
            "# Plan\n\nIntro\n\n- one\n- two\n\n- [x] ship"
        );
    }

    #[test]
    fn has_more_reports_cursor() {
        let list = json!({"object": "list", "results": [], "has_more": true, "next_cursor": "abc"});
        assert_eq!(
            MarkdownRenderer.render(&list),
            "_No results._\n\n_More results available. next_cursor: `abc`_"
        );
    }

    #[test]
    fn annotations_and_links() {
        let rt = json!([
            {"plain_text": "bold", "annotations": {"bold": true}},
            {"plain_text": " and "},
            {"plain_text": "site", "href": "https://example.com", "annotations": {"code": true}},
            {"type": "equation", "equation": {"expression": "x^2"}, "plain_text": "x^2"}
        ]);
        assert_eq!(
            rich_text(&rt),
            "**bold** and [`site`](https://example.com)$x^2$"
        );
    }

    #[test]
    fn code_block_and_unsupported() {
        let code = block("code", json!({"rich_text": text("fn main() {}"), "language": "rust"}));
        assert_eq!(MarkdownRenderer.render(&code), "```rust\nfn main() {}\n```");

        let odd = block("synced_block", json!({}));
        assert_eq!(
            MarkdownRenderer.render(&odd),
            "<!-- unsupported block: synced_block -->"
        );
    }

    #[test]
    fn nested_children_are_indented() {
        let parent = block(
            "bulleted_list_item",
            json!({
                "rich_text": text("parent"),
                "children": [block("bulleted_list_item", json!({"rich_text": text("child")}))]
            }),
        );
        assert_eq!(MarkdownRenderer.render(&parent), "- parent\n  - child");
    }

    #[test]
    fn page_with_properties() {
        let page = json!({
            "object": "page",
            "id": "p1",
            "url": "https://www.notion.so/p1",
            "properties": {
                "Name": {"type": "title", "title": text("Roadmap")},
                "Status": {"type": "status", "status": {"name": "In progress"}},
                "Tags": {"type": "multi_select", "multi_select": [{"name": "a"}, {"name": "b"}]},
                "Done": {"type": "checkbox", "checkbox": false}
            }
        });
        assert_eq!(
            MarkdownRenderer.render(&page),
            "# Roadmap\n\n| Property | Value |\n| --- | --- |\n| Status | In progress |\n| Tags | a, b |\n| Done | false |\n\nhttps://www.notion.so/p1"
        );
    }

    #[test]
    fn search_results_are_links() {
        let list = json!({
            "object": "list",
            "results": [
                {"object": "page", "url": "https://n/p", "properties": {"title": {"type": "title", "title": text("Doc")}}},
                {"object": "database", "url": "https://n/d", "title": text("Tasks")}
            ],
            "has_more": false
        });
        assert_eq!(
            MarkdownRenderer.render(&list),
            "- [Doc](https://n/p)\n\n- [Tasks](https://n/d)"
        );
    }

    #[test]
    fn user_line() {
        let user = json!({"object": "user", "id": "u1", "type": "bot", "name": "Helper"});
        assert_eq!(MarkdownRenderer.render(&user), "**Helper** (bot)");
    }

    #[test]
    fn unknown_object_falls_back_to_json() {
        let v = json!({"object": "error", "message": "nope"});
        assert_eq!(
            MarkdownRenderer.render(&v),
            "```json\n{\n  \"object\": \"error\",\n  \"message\": \"nope\"\n}\n```"
        );
    }

    #[test]
    fn table_cells_escape_pipes() {
        let row = block("table_row", json!({"cells": [text("a|b"), text("c")]}));
        assert_eq!(MarkdownRenderer.render(&row), "| a\\|b | c |");
    }
}
