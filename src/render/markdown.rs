//! Markdown renderer implementation.

use crate::chart::ChartData;
use crate::error::Result;
use crate::model::{ContentChild, ContentNode, NodeKind, Presentation, RootImage, Slide, TextLeaf};

use super::options::RenderOptions;
use super::{group_label, pad, Grid};

/// Convert a Presentation to Markdown.
///
/// Slides are separated by horizontal rules.
pub fn to_markdown(deck: &Presentation, options: &RenderOptions) -> Result<String> {
    let slides: Vec<String> = deck
        .slides
        .iter()
        .map(|slide| render_slide(slide, options))
        .collect();

    let mut output = slides.join("\n\n---\n\n");
    let trimmed = output.trim_end().len();
    output.truncate(trimmed);
    if !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}

fn render_slide(slide: &Slide, options: &RenderOptions) -> String {
    let mut blocks = Vec::new();

    if options.include_slide_ids {
        blocks.push(format!("<!-- {} -->", slide.id));
    }
    if let Some(ref image) = slide.root_image {
        blocks.push(render_root_image(image, options));
    }
    for node in &slide.content {
        let md = render_node(node, options);
        if !md.is_empty() {
            blocks.push(md);
        }
    }

    blocks.join(options.block_separator())
}

fn render_root_image(image: &RootImage, options: &RenderOptions) -> String {
    let alt = escape_alt(&image.query);
    match image.url {
        Some(ref url) => format!("![{}]({})", alt, resolve_url(url, options)),
        None => format!("![{}]()", alt),
    }
}

/// Apply the image prefix to relative URLs.
fn resolve_url(url: &str, options: &RenderOptions) -> String {
    let absolute = url.contains("://") || url.starts_with('/') || url.starts_with("data:");
    if absolute || options.image_path_prefix.is_empty() {
        url.to_string()
    } else {
        format!("{}{}", options.image_path_prefix, url)
    }
}

fn render_node(node: &ContentNode, options: &RenderOptions) -> String {
    match node.kind {
        NodeKind::H1 | NodeKind::H2 | NodeKind::H3 => {
            let level = node.kind.heading_level().unwrap_or(1) as usize;
            let text = render_inline(node, options);
            if text.is_empty() {
                String::new()
            } else {
                format!("{} {}", "#".repeat(level), text)
            }
        }
        NodeKind::List => render_list(node, 0, options),
        NodeKind::Table => render_table(&Grid::from_table(node, |cell| {
            render_inline(cell, options).replace('\n', " ")
        })),
        NodeKind::Chart => render_chart(node),
        NodeKind::Image => {
            let alt = node
                .caption
                .as_ref()
                .map(|caption| caption.iter().map(|l| l.text.as_str()).collect::<String>())
                .or_else(|| node.attribute("query").map(str::to_string))
                .unwrap_or_else(|| "image".to_string());
            let url = node
                .url
                .as_deref()
                .map(|url| resolve_url(url, options))
                .unwrap_or_default();
            format!("![{}]({})", escape_alt(&alt), url)
        }
        NodeKind::Icon => match node.attribute("query") {
            Some(query) => format!("[icon: {}]", query),
            None => String::new(),
        },
        ref kind if kind.is_structured_layout() => render_layout(node, options),
        _ => render_blocks(node, options),
    }
}

/// Inline text first, then nested nodes as separate blocks.
fn render_blocks(node: &ContentNode, options: &RenderOptions) -> String {
    let mut parts = Vec::new();
    let inline = render_inline(node, options);
    if !inline.is_empty() {
        parts.push(inline);
    }
    for child in node.child_nodes() {
        let md = render_node(child, options);
        if !md.is_empty() {
            parts.push(md);
        }
    }
    parts.join(options.block_separator())
}

/// One block per DIV group, labelled by the group's first heading.
fn render_layout(node: &ContentNode, options: &RenderOptions) -> String {
    let mut groups = Vec::new();
    for (n, group) in node.child_nodes().enumerate() {
        let label = group_label(group);
        let mut parts = Vec::new();
        match label {
            Some((_, ref text)) => parts.push(format!("**{}**", escape_markdown(text, options))),
            None => parts.push(format!("**{} {}**", capitalize(node.kind.as_str()), n + 1)),
        }

        let mut inline = String::new();
        for (i, child) in group.children.iter().enumerate() {
            if label.as_ref().is_some_and(|(at, _)| *at == i) {
                continue;
            }
            match child {
                ContentChild::Text(leaf) => inline.push_str(&render_leaf(leaf, options)),
                ContentChild::Node(child) => {
                    if !inline.is_empty() {
                        parts.push(std::mem::take(&mut inline));
                    }
                    let md = render_node(child, options);
                    if !md.is_empty() {
                        parts.push(md);
                    }
                }
            }
        }
        if !inline.is_empty() {
            parts.push(inline);
        }

        groups.push(parts.join("\n"));
    }
    groups.join(options.block_separator())
}

fn render_list(list: &ContentNode, depth: usize, options: &RenderOptions) -> String {
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();
    for item in list.child_nodes() {
        match item.kind {
            NodeKind::ListItem => {
                let level = depth + item.indent.unwrap_or(0) as usize;
                let indent = "  ".repeat(level);
                lines.push(format!(
                    "{}{} {}",
                    indent,
                    options.list_marker,
                    render_inline(item, options)
                ));
                for nested in item.child_nodes() {
                    if nested.kind == NodeKind::List {
                        lines.push(render_list(nested, level + 1, options));
                    }
                }
            }
            NodeKind::List => lines.push(render_list(item, depth + 1, options)),
            _ => {
                let md = render_node(item, options);
                if !md.is_empty() {
                    lines.push(format!("{}{}", indent, md));
                }
            }
        }
    }
    lines.retain(|line| !line.is_empty());
    lines.join("\n")
}

fn render_chart(node: &ContentNode) -> String {
    let Some(chart) = ChartData::from_node(node) else {
        return String::new();
    };
    if chart.is_empty() {
        return String::new();
    }

    let table = render_table(&Grid::from_chart(&chart));
    match chart.chart_type {
        Some(ref kind) => format!("*{} chart*\n\n{}", capitalize(kind), table),
        None => table,
    }
}

/// Render a grid as a pipe table. The first row is always the header row.
fn render_table(grid: &Grid) -> String {
    if grid.is_empty() {
        return String::new();
    }

    let widths = grid.widths();
    let mut lines = Vec::with_capacity(grid.rows.len() + 1);

    for (i, row) in grid.rows.iter().enumerate() {
        let mut line = String::from("|");
        for (col, width) in widths.iter().enumerate() {
            let text = row.get(col).map(String::as_str).unwrap_or("");
            line.push_str(&format!(" {} |", pad(text, *width)));
        }
        lines.push(line);

        if i == 0 {
            let mut separator = String::from("|");
            for width in &widths {
                separator.push_str(&format!(" {} |", "-".repeat(*width)));
            }
            lines.push(separator);
        }
    }

    lines.join("\n")
}

/// Text leaves directly under `node`, with formatting.
fn render_inline(node: &ContentNode, options: &RenderOptions) -> String {
    let separator = if node.kind.holds_inline_text() { "" } else { " " };
    node.children
        .iter()
        .filter_map(ContentChild::as_text)
        .map(|leaf| render_leaf(leaf, options))
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_leaf(leaf: &TextLeaf, options: &RenderOptions) -> String {
    // Emphasis markers must hug the text, so keep outer whitespace outside
    let core = leaf.text.trim();
    if core.is_empty() {
        return leaf.text.clone();
    }
    let start = leaf.text.len() - leaf.text.trim_start().len();
    let leading = &leaf.text[..start];
    let trailing = &leaf.text[start + core.len()..];

    let mut text = if leaf.style.code {
        format!("`{}`", core.replace('`', "\\`"))
    } else {
        escape_markdown(core, options)
    };

    if leaf.style.bold && leaf.style.italic {
        text = format!("***{}***", text);
    } else if leaf.style.bold {
        text = format!("**{}**", text);
    } else if leaf.style.italic {
        text = format!("*{}*", text);
    }
    if leaf.style.underline {
        text = format!("<u>{}</u>", text);
    }

    format!("{}{}{}", leading, text, trailing)
}

/// Escape Markdown special characters.
///
/// `\`, `` ` `` and `|` are always escaped. `*` and `_` are escaped where
/// they can open or close emphasis: next to a non-whitespace character on
/// either side.
fn escape_markdown(s: &str, options: &RenderOptions) -> String {
    if !options.escape_special_chars {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\\' | '`' | '|' => {
                result.push('\\');
                result.push(c);
            }
            '*' | '_' => {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();

                let opens = next.is_some_and(|n| !n.is_whitespace());
                let closes = prev.is_some_and(|p| !p.is_whitespace());
                if opens || closes {
                    result.push('\\');
                }
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

fn escape_alt(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextStyle;
    use crate::parse_str;

    fn md(markup: &str) -> String {
        to_markdown(&parse_str(markup), &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            md("<SECTION><H1>Title</H1><P>Body</P></SECTION>"),
            "# Title\n\nBody\n"
        );
    }

    #[test]
    fn test_slide_separator() {
        let out = md("<SECTION><H1>A</H1></SECTION><SECTION><H2>B</H2></SECTION>");
        assert_eq!(out, "# A\n\n---\n\n## B\n");
    }

    #[test]
    fn test_formatted_text() {
        let out = md("<SECTION><P>Hello <B>bold </B><I>it</I> <CODE>a|b</CODE> <U>u</U></P></SECTION>");
        assert_eq!(out, "Hello **bold** *it* `a|b` <u>u</u>\n");
    }

    #[test]
    fn test_root_image() {
        let out = md(r#"<SECTION><IMG query="mountain sunrise"/><H1>Peak</H1></SECTION>"#);
        assert!(out.starts_with("![mountain sunrise]()\n\n# Peak"));

        let deck = parse_str(r#"<SECTION><IMG query="cat" url="cat.png"/></SECTION>"#);
        let options = RenderOptions::new().with_image_prefix("assets/");
        let out = to_markdown(&deck, &options).unwrap();
        assert_eq!(out, "![cat](assets/cat.png)\n");
    }

    #[test]
    fn test_nested_list() {
        let deck = parse_str("<SECTION><UL><LI>One<UL><LI>Inner</LI></UL></LI><LI>Two</LI></UL></SECTION>");
        let options = RenderOptions::new().with_list_marker('*');
        let out = to_markdown(&deck, &options).unwrap();
        assert_eq!(out, "* One\n  * Inner\n* Two\n");
    }

    #[test]
    fn test_simple_table() {
        let out = md(
            "<SECTION><TABLE><TR><TH>Name</TH><TH>Score</TH></TR><TR><TD>Ann</TD><TD><B>9</B></TD></TR></TABLE></SECTION>",
        );
        assert_eq!(
            out,
            "| Name | Score |\n| ---- | ----- |\n| Ann  | **9** |\n"
        );
    }

    #[test]
    fn test_cjk_table_alignment() {
        let out = md("<SECTION><TABLE><TR><TH>名前</TH></TR><TR><TD>A</TD></TR></TABLE></SECTION>");
        assert_eq!(out, "| 名前 |\n| ---- |\n| A    |\n");
    }

    #[test]
    fn test_chart_table() {
        let out = md(
            r#"<SECTION><CHART charttype="pie"><DATA><LABEL>Q1</LABEL><VALUE>40%</VALUE></DATA><DATA><LABEL>Q2</LABEL><VALUE>1,250.50</VALUE></DATA></CHART></SECTION>"#,
        );
        assert_eq!(
            out,
            "*Pie chart*\n\n| Label | Value    |\n| ----- | -------- |\n| Q1    | 40%      |\n| Q2    | 1,250.50 |\n"
        );
    }

    #[test]
    fn test_structured_layout() {
        let out = md(
            "<SECTION><TIMELINE><DIV><H3>2024</H3><P>Launch</P></DIV><DIV><P>Unlabelled</P></DIV></TIMELINE></SECTION>",
        );
        assert_eq!(out, "**2024**\nLaunch\n\n**Timeline 2**\nUnlabelled\n");
    }

    #[test]
    fn test_icons_and_slide_ids() {
        let deck = parse_str(r#"<SECTION><ICONS><DIV><ICON query="rocket"/><H3>Fast</H3></DIV></ICONS></SECTION>"#);
        let options = RenderOptions::new().with_slide_ids(true);
        let out = to_markdown(&deck, &options).unwrap();
        assert_eq!(out, "<!-- slide-1 -->\n\n**Fast**\n[icon: rocket]\n");
    }

    #[test]
    fn test_escape_markdown() {
        let options = RenderOptions::default();
        assert_eq!(escape_markdown("a|b", &options), "a\\|b");
        assert_eq!(escape_markdown("snake_case_name", &options), "snake\\_case\\_name");
        assert_eq!(escape_markdown("* item", &options), "* item");
        assert_eq!(escape_markdown("*word* and 2 * 3", &options), "\\*word\\* and 2 * 3");
        assert_eq!(escape_markdown("_lead", &options), "\\_lead");
        assert_eq!(
            escape_markdown("a|b", &RenderOptions::new().with_escape_special_chars(false)),
            "a|b"
        );
    }

    #[test]
    fn test_render_leaf_whitespace() {
        let leaf = TextLeaf::styled(
            " both ",
            TextStyle {
                bold: true,
                italic: true,
                ..Default::default()
            },
        );
        assert_eq!(render_leaf(&leaf, &RenderOptions::default()), " ***both*** ");
    }

    #[test]
    fn test_empty_presentation() {
        assert_eq!(md(""), "");
    }
}
