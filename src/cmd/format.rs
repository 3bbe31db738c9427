/*!
format.rs

Human-output helpers for the `notion-mcp` CLI.

  - StyleOptions::detect() honours NO_COLOR / NO_EMOJI / COLUMNS and piped stdout
  - color(role, text, &style) / emoji(tag, &style)
  - header(title, subtitle, &style): one framed title line
  - table(headers, rows, &style): aligned columns, widest column shrinks first

JSON output paths never go through these helpers.
*/

use std::borrow::Cow;
use std::io::IsTerminal;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        if !std::io::stdout().is_terminal() {
            return Self::plain(width);
        }
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// No color, no emoji; fixed width. Used when stdout is piped.
    pub fn plain(term_width: usize) -> Self {
        Self {
            use_color: false,
            use_emoji: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "info" => "ℹ",
        "list" => "📜",
        _ => "",
    }
}

/// `── title  subtitle ──` padded with rules to the terminal width.
pub fn header(title: impl AsRef<str>, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let title = title.as_ref().trim();
    let mut inner = color(Role::Primary, title, style);
    if let Some(sub) = subtitle {
        inner.push_str("  ");
        inner.push_str(&color(Role::Secondary, sub, style));
    }
    let used = display_width(&inner) + 4;
    let rest = style.term_width.saturating_sub(used).max(2);
    format!("── {inner} {}", "─".repeat(rest))
}

/// Render an aligned table. Cells wider than their column are cut with `…`.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }
    shrink_to_fit(&mut widths, style.term_width);

    let mut out = String::new();
    out.push_str(&color(
        Role::Accent,
        render_row(&widths, headers.iter().copied()),
        style,
    ));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&color(Role::Dim, rule.join("  "), style));
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
    }
    out
}

fn render_row<'a>(widths: &[usize], mut cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::new();
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let cell = cells.next().unwrap_or("");
        line.push_str(&pad(&truncate_ellipsis(cell, *w), *w));
    }
    line.trim_end().to_string()
}

/// Take width from the widest columns until the row fits `limit`.
fn shrink_to_fit(widths: &mut [usize], limit: usize) {
    const MIN: usize = 3;
    let gaps = widths.len().saturating_sub(1) * 2;
    loop {
        let total: usize = widths.iter().sum::<usize>() + gaps;
        if total <= limit {
            return;
        }
        let Some((idx, widest)) = widths
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, w)| *w)
        else {
            return;
        };
        if widest <= MIN {
            return;
        }
        widths[idx] = (widest - (total - limit)).max(MIN);
    }
}

fn pad(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}
