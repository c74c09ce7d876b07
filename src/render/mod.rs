//! Output rendering for presentations.
//!
//! This module provides renderers for converting parsed slides
//! to various output formats: Markdown, plain text, and JSON.
//!
//! # Example
//!
//! ```
//! use slidemark::{parse_str, render::*};
//!
//! let deck = parse_str("<SECTION><H1>Hello</H1><P>World</P></SECTION>");
//!
//! // Render to Markdown
//! let md = to_markdown(&deck, &RenderOptions::default())?;
//! assert!(md.starts_with("# Hello"));
//!
//! // Render to plain text
//! let text = to_text(&deck, &RenderOptions::default())?;
//!
//! // Render to JSON
//! let json = to_json(&deck, JsonFormat::Pretty)?;
//! # Ok::<(), slidemark::Error>(())
//! ```

mod json;
mod markdown;
mod options;
mod text;

pub use json::{slides_to_json, to_json, to_json_default, JsonFormat};
pub use markdown::to_markdown;
pub use options::RenderOptions;
pub use text::to_text;

use unicode_width::UnicodeWidthStr;

use crate::chart::ChartData;
use crate::model::{ContentNode, NodeKind};

/// Cell text of a table or chart, row-major.
pub(crate) struct Grid {
    pub rows: Vec<Vec<String>>,
    /// The first row holds header cells
    pub header: bool,
}

impl Grid {
    /// Collect the rows of a TABLE node, rendering each cell with `cell_text`.
    pub fn from_table(table: &ContentNode, cell_text: impl Fn(&ContentNode) -> String) -> Self {
        let mut rows = Vec::new();
        collect_rows(table, &mut rows);

        let header = rows.first().is_some_and(|row| {
            let mut cells = cells(row).peekable();
            cells.peek().is_some() && cells.all(|cell| cell.kind == NodeKind::TableHeader)
        });

        let rows = rows
            .into_iter()
            .map(|row| cells(row).map(&cell_text).collect::<Vec<_>>())
            .filter(|cells: &Vec<String>| !cells.is_empty())
            .collect();

        Self { rows, header }
    }

    /// Label/value rows of a chart.
    pub fn from_chart(chart: &ChartData) -> Self {
        Self {
            rows: chart.to_table(),
            header: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Display width of each column, at least 3.
    pub fn widths(&self) -> Vec<usize> {
        let mut widths = vec![3; self.column_count()];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }
        widths
    }
}

fn collect_rows<'a>(node: &'a ContentNode, rows: &mut Vec<&'a ContentNode>) {
    for child in node.child_nodes() {
        match child.kind {
            NodeKind::TableRow => rows.push(child),
            // Nested tables are rendered on their own
            NodeKind::Table => {}
            _ => collect_rows(child, rows),
        }
    }
}

fn cells(row: &ContentNode) -> impl Iterator<Item = &ContentNode> {
    row.child_nodes()
        .filter(|cell| matches!(cell.kind, NodeKind::TableHeader | NodeKind::TableCell))
}

/// Pad `text` with spaces to a display width.
pub(crate) fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    let mut out = String::with_capacity(text.len() + fill);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', fill));
    out
}

/// Label of a structured layout group: its first heading, if any.
pub(crate) fn group_label(group: &ContentNode) -> Option<(usize, String)> {
    group
        .children
        .iter()
        .enumerate()
        .find_map(|(i, child)| match child.as_node() {
            Some(node) if node.kind.is_heading() => Some((i, node.plain_text())),
            _ => None,
        })
        .filter(|(_, label)| !label.is_empty())
}
