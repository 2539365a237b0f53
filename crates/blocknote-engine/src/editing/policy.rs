//! Adjacency and display policy.
//!
//! Everything here is derived fresh from the current document and session
//! state on each render; no presentational fact is ever stored on a block.
//! The rendering surface consumes the [`Snapshot`] and never reads the
//! model directly.

use std::sync::OnceLock;

use regex::Regex;

use crate::editing::session::EditSession;
use crate::editing::{BlockId, Document};
use crate::registry::BlockKind;

/// Matches markup tags like `<br>`, `<b>` and `</div>`.
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"))
}

/// Strip markup tags and decode HTML entities, leaving the visible text.
pub fn strip_markup(content: &str) -> String {
    let stripped = tag_regex().replace_all(content, "");
    html_escape::decode_html_entities(stripped.as_ref()).into_owned()
}

/// A block is "empty" when its visible text trims to nothing: `"<br>"`,
/// `"&nbsp;"` and all-whitespace content all count as empty. Emptiness
/// drives showing the block's type label as a placeholder tag.
pub fn text_is_empty(content: &str) -> bool {
    strip_markup(content).trim().is_empty()
}

/// Whether the block at `index` gets flush-top spacing: a paragraph
/// immediately following a heading of any level, by document order.
pub fn follows_heading(doc: &Document, index: usize) -> bool {
    if index == 0 || index >= doc.len() {
        return false;
    }
    let blocks = doc.blocks();
    blocks[index].kind == BlockKind::Paragraph && blocks[index - 1].kind.is_heading()
}

/// Whether a block shows its insert/menu affordance: when it is either the
/// hovered block or the focused block. Hover is transient surface state,
/// passed in as an input.
pub fn menu_visible(id: BlockId, hovered: Option<BlockId>, focused: Option<BlockId>) -> bool {
    hovered == Some(id) || focused == Some(id)
}

/// Per-block render facts derived for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Live content: the session's pending buffer while focused, the
    /// committed content otherwise.
    pub content: String,
    pub is_empty: bool,
    /// The type label to show as an empty-state tag, present only while
    /// the block is empty.
    pub label: Option<&'static str>,
    /// Placeholder text for the kind, always available to the surface.
    pub placeholder: &'static str,
    /// Zero top margin because the block directly follows a heading.
    pub flush_top: bool,
    pub focused: bool,
    pub show_menu: bool,
}

/// Immutable per-render view of the whole document. The surface renders
/// from this and never mutates the model through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub blocks: Vec<RenderBlock>,
    pub version: u64,
}

/// Derive the display snapshot for the current document, session and hover
/// state.
pub fn snapshot(doc: &Document, session: &EditSession, hovered: Option<BlockId>) -> Snapshot {
    let focused = session.focused();
    let blocks = doc
        .blocks()
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let content = session
                .live_content(doc, block.id)
                .unwrap_or(block.content.as_str())
                .to_string();
            let is_empty = text_is_empty(&content);
            RenderBlock {
                id: block.id,
                kind: block.kind,
                is_empty,
                label: is_empty.then(|| block.kind.label()),
                placeholder: block.kind.placeholder(),
                flush_top: follows_heading(doc, index),
                focused: focused == Some(block.id),
                show_menu: menu_visible(block.id, hovered, focused),
                content,
            }
        })
        .collect();
    Snapshot {
        blocks,
        version: doc.version(),
    }
}

/// Format a snapshot as a readable string for snapshot testing.
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for block in &snapshot.blocks {
        let mut flags = Vec::new();
        if block.is_empty {
            flags.push("empty");
        }
        if block.flush_top {
            flags.push("flush_top");
        }
        if block.focused {
            flags.push("focused");
        }
        if block.show_menu {
            flags.push("menu");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        writeln!(out, "{}{}: {:?}", block.kind.name(), flags, block.content).unwrap();
    }
    out
}
