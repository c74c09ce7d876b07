//! Plain text renderer implementation.

use crate::chart::ChartData;
use crate::error::Result;
use crate::model::{ContentChild, ContentNode, NodeKind, Presentation, Slide};

use super::options::RenderOptions;
use super::{group_label, pad, Grid};

/// Convert a Presentation to plain text.
pub fn to_text(deck: &Presentation, options: &RenderOptions) -> Result<String> {
    let slides: Vec<String> = deck
        .slides
        .iter()
        .map(|slide| render_slide(slide, options))
        .filter(|text| !text.is_empty())
        .collect();

    Ok(slides.join("\n\n").trim().to_string())
}

fn render_slide(slide: &Slide, options: &RenderOptions) -> String {
    let mut blocks = Vec::new();

    if options.include_slide_ids {
        blocks.push(format!("[{}]", slide.id));
    }
    if let Some(ref image) = slide.root_image {
        blocks.push(format!("[Image: {}]", image.query));
    }
    for node in &slide.content {
        let text = render_node(node, 0, options);
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    blocks.join(options.block_separator())
}

fn render_node(node: &ContentNode, depth: usize, options: &RenderOptions) -> String {
    match node.kind {
        NodeKind::List => render_list(node, depth),
        NodeKind::Table => render_table_text(&Grid::from_table(node, ContentNode::plain_text)),
        NodeKind::Chart => match ChartData::from_node(node) {
            Some(chart) if !chart.is_empty() => {
                let table = render_table_text(&Grid::from_chart(&chart));
                match chart.chart_type {
                    Some(kind) => format!("Chart ({}):\n{}", kind, table),
                    None => table,
                }
            }
            _ => String::new(),
        },
        NodeKind::Image => {
            let label = node
                .attribute("query")
                .or_else(|| node.caption.as_ref().and_then(|c| c.first()).map(|l| l.text.as_str()));
            match label {
                Some(label) => format!("[Image: {}]", label),
                None => "[Image]".to_string(),
            }
        }
        NodeKind::Icon => match node.attribute("query") {
            Some(query) => format!("[Icon: {}]", query),
            None => String::new(),
        },
        ref kind if kind.is_structured_layout() => render_layout(node, options),
        _ => render_blocks(node, depth, options),
    }
}

/// Inline text first, then nested nodes as separate blocks.
fn render_blocks(node: &ContentNode, depth: usize, options: &RenderOptions) -> String {
    let mut parts = Vec::new();
    let inline = inline_text(node);
    if !inline.is_empty() {
        parts.push(inline);
    }
    for child in node.child_nodes() {
        let text = render_node(child, depth, options);
        if !text.is_empty() {
            parts.push(text);
        }
    }
    parts.join(options.block_separator())
}

fn render_layout(node: &ContentNode, options: &RenderOptions) -> String {
    let mut groups = Vec::new();
    for group in node.child_nodes() {
        let mut lines = Vec::new();
        let label = group_label(group);
        if let Some((_, ref label)) = label {
            lines.push(label.clone());
        }
        for (i, child) in group.children.iter().enumerate() {
            if label.as_ref().is_some_and(|(at, _)| *at == i) {
                continue;
            }
            let text = match child {
                ContentChild::Node(child) => render_node(child, 0, options),
                ContentChild::Text(leaf) => leaf.text.clone(),
            };
            if !text.is_empty() {
                lines.push(text);
            }
        }
        if !lines.is_empty() {
            groups.push(lines.join("\n"));
        }
    }
    groups.join(options.block_separator())
}

fn render_list(list: &ContentNode, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();
    for item in list.child_nodes() {
        match item.kind {
            NodeKind::ListItem => {
                lines.push(format!("{}• {}", indent, inline_text(item)));
                for nested in item.child_nodes() {
                    if nested.kind == NodeKind::List {
                        lines.push(render_list(nested, depth + 1));
                    }
                }
            }
            NodeKind::List => lines.push(render_list(item, depth + 1)),
            _ => {}
        }
    }
    lines.retain(|line| !line.is_empty());
    lines.join("\n")
}

/// Concatenated text leaves directly under `node`.
fn inline_text(node: &ContentNode) -> String {
    let separator = if node.kind.holds_inline_text() { "" } else { " " };
    node.children
        .iter()
        .filter_map(ContentChild::as_text)
        .map(|leaf| leaf.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Render a grid as an ASCII table.
fn render_table_text(grid: &Grid) -> String {
    if grid.is_empty() {
        return String::new();
    }

    let widths = grid.widths();
    let border = |fill: &str| {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&fill.repeat(*w + 2));
            line.push('+');
        }
        line
    };

    let mut output = border("-");
    output.push('\n');

    for (row_idx, row) in grid.rows.iter().enumerate() {
        output.push('|');
        for (i, width) in widths.iter().enumerate() {
            let text = row.get(i).map(|t| t.replace('\n', " ")).unwrap_or_default();
            output.push_str(&format!(" {} |", pad(&text, *width)));
        }
        output.push('\n');

        if row_idx == 0 && grid.header {
            output.push_str(&border("="));
            output.push('\n');
        }
    }

    output.push_str(&border("-"));
    output
}
