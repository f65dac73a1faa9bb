//! Numbered-item extraction.
//!
//! Turns a block of plain text into an ordered list of [`Item`]s. A line that
//! begins with digits followed by `.` or `)` opens a new item; any other
//! non-blank line is appended to the open item with a single space.
//!
//! ```text
//! 1. Hello world           →  { id: 1, text: "Hello world" }
//! 2. Second item           →  { id: 2, text: "Second item still second" }
//! still second
//! 3) Third                 →  { id: 3, text: "Third" }
//! ```
//!
//! Rules:
//!
//! - Blank and whitespace-only lines are dropped before scanning.
//! - Text before the first marker belongs to no item and is dropped.
//! - A marker with nothing after it opens an item with empty text. If no
//!   continuation line follows, the item is dropped when it is flushed: only
//!   items with text are emitted.
//! - A marker numbered `0`, or with a number too large for `u64`, closes the
//!   open item but opens nothing, so lines after it are dropped until the
//!   next usable marker.
//! - Numbering is not checked for continuity. Output is sorted by id with a
//!   stable sort, so duplicate ids keep their encounter order.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ItemError;
use crate::models::Item;

/// ASCII digits, then `.` or `)`, then optional whitespace and the remainder.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)[.)]\s*(.*)$").expect("marker pattern compiles"));

/// The item currently accumulating continuation lines.
struct OpenItem {
    id: u64,
    text: String,
}

impl OpenItem {
    fn push_line(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
    }
}

/// Extracts numbered items from `text`, sorted ascending by id.
///
/// Returns [`ItemError::NoItemsFound`] when nothing with content was found.
pub fn extract_items(text: &str) -> Result<Vec<Item>, ItemError> {
    let mut items = Vec::new();
    let mut open: Option<OpenItem> = None;

    let lines = text
        .split(|c: char| c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|line| !line.is_empty());

    for line in lines {
        match parse_marker(line) {
            Some((id, rest)) => {
                flush(&mut items, open.take());
                open = (id > 0).then(|| OpenItem {
                    id,
                    text: rest.to_string(),
                });
            }
            None => {
                if let Some(item) = open.as_mut() {
                    item.push_line(line);
                }
            }
        }
    }
    flush(&mut items, open.take());

    if items.is_empty() {
        return Err(ItemError::NoItemsFound);
    }
    items.sort_by_key(|item| item.id);
    Ok(items)
}

/// Splits a trimmed line into its number and remainder, if it is a marker.
///
/// A number too large for `u64` reads as `0`, which opens no item.
fn parse_marker(line: &str) -> Option<(u64, &str)> {
    let caps = MARKER.captures(line)?;
    let id = caps.get(1)?.as_str().parse::<u64>().unwrap_or(0);
    let rest = caps.get(2).map_or("", |m| m.as_str());
    Some((id, rest))
}

fn flush(items: &mut Vec<Item>, open: Option<OpenItem>) {
    if let Some(item) = open {
        let text = item.text.trim();
        if !text.is_empty() {
            items.push(Item::new(item.id, text));
        }
    }
}
