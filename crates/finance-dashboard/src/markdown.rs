//! Markdown to display-tree conversion for model output
//!
//! [`parse`] is a pure function from model text to a [`Document`]; [`render`]
//! turns that tree into plain terminal text. Only the subset models actually
//! emit is recognized: ATX headings, paragraphs, bullet and ordered lists,
//! pipe tables, block quotes, fenced code, horizontal rules, and inline code,
//! strong, emphasis, and links. Anything else is kept as paragraph text.

use comfy_table::{Table, presets};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").expect("valid regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid regex"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,9})[.)]\s+(.*)$").expect("valid regex"));
static RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s{0,3}(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").expect("valid regex")
});
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}>\s?(.*)$").expect("valid regex"));
static TABLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-+:?\s*(?:\|\s*:?-+:?\s*)*\|?\s*$").expect("valid regex")
});
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"`([^`]+)`",
        r"|\*\*(.+?)\*\*",
        r"|\b__(.+?)__\b",
        r"|\*([^*\s][^*]*?)\*",
        r"|\b_([^_\s][^_]*?)_\b",
        r"|\[([^\]]+)\]\(([^)\s]+)\)",
    ))
    .expect("valid regex")
});

/// Inline span inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    Code(String),
    Link { text: String, url: String },
}

/// Block-level element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    /// `start` is the first item's number; 1 for bullet lists
    List { ordered: bool, start: u64, items: Vec<Vec<Inline>> },
    Table { header: Vec<Vec<Inline>>, rows: Vec<Vec<Vec<Inline>>> },
    Quote(Vec<Inline>),
    Code { language: Option<String>, code: String },
    Rule,
}

/// Parsed model output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Parse markdown `content` into a display tree
pub fn parse(content: &str) -> Document {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            i += 1;
        } else if let Some(fence) = line.trim_start().strip_prefix("```") {
            let language = Some(fence.trim().to_string()).filter(|l| !l.is_empty());
            let mut code = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim_start().starts_with("```") {
                code.push(lines[i]);
                i += 1;
            }
            // skip the closing fence; an unclosed fence runs to the end
            i += 1;
            blocks.push(Block::Code {
                language,
                code: code.join("\n"),
            });
        } else if let Some(caps) = HEADING.captures(line) {
            blocks.push(Block::Heading {
                level: caps[1].len() as u8,
                content: parse_inline(&caps[2]),
            });
            i += 1;
        } else if RULE.is_match(line) {
            blocks.push(Block::Rule);
            i += 1;
        } else if is_table_start(&lines, i) {
            let header = split_row(line);
            let mut rows = Vec::new();
            i += 2;
            while i < lines.len() && lines[i].contains('|') && !lines[i].trim().is_empty() {
                rows.push(split_row(lines[i]));
                i += 1;
            }
            blocks.push(Block::Table { header, rows });
        } else if QUOTE.is_match(line) {
            let mut text = Vec::new();
            while i < lines.len() {
                let Some(caps) = QUOTE.captures(lines[i]) else {
                    break;
                };
                text.push(caps[1].trim().to_string());
                i += 1;
            }
            blocks.push(Block::Quote(parse_inline(&join_words(&text))));
        } else if list_item(line).is_some() {
            let (block, next) = parse_list(&lines, i);
            blocks.push(block);
            i = next;
        } else {
            let mut text = vec![line.trim().to_string()];
            i += 1;
            while i < lines.len() && continues_paragraph(&lines, i) {
                text.push(lines[i].trim().to_string());
                i += 1;
            }
            blocks.push(Block::Paragraph(parse_inline(&join_words(&text))));
        }
    }

    Document { blocks }
}

/// `(number, text)` when `line` is a list item; bullets carry no number
fn list_item(line: &str) -> Option<(Option<u64>, &str)> {
    if RULE.is_match(line) {
        return None;
    }
    if let Some(caps) = BULLET.captures(line) {
        return caps.get(1).map(|m| (None, m.as_str()));
    }
    let caps = ORDERED.captures(line)?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    caps.get(2).map(|m| (Some(number), m.as_str()))
}

fn parse_list(lines: &[&str], start: usize) -> (Block, usize) {
    let first = list_item(lines[start]).and_then(|(number, _)| number);
    let ordered = first.is_some();
    let same_kind =
        |line: &str| list_item(line).is_some_and(|(number, _)| number.is_some() == ordered);
    let mut items: Vec<Vec<String>> = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];
        match list_item(line) {
            Some((number, text)) if number.is_some() == ordered => {
                items.push(vec![text.trim().to_string()]);
            }
            Some(_) => break,
            None if line.trim().is_empty() => {
                // a blank line only continues a loose list of the same kind
                if !lines.get(i + 1).is_some_and(|next| same_kind(*next)) {
                    break;
                }
            }
            None if line.starts_with(char::is_whitespace) => match items.last_mut() {
                Some(last) => last.push(line.trim().to_string()),
                None => break,
            },
            None => break,
        }
        i += 1;
    }

    let items = items.iter().map(|words| parse_inline(&join_words(words))).collect();
    let start = first.unwrap_or(1);
    (Block::List { ordered, start, items }, i)
}

fn is_table_start(lines: &[&str], i: usize) -> bool {
    lines[i].contains('|') && lines.get(i + 1).is_some_and(|next| TABLE_SEPARATOR.is_match(next))
}

fn continues_paragraph(lines: &[&str], i: usize) -> bool {
    let line = lines[i];
    !line.trim().is_empty()
        && !line.trim_start().starts_with("```")
        && !HEADING.is_match(line)
        && !RULE.is_match(line)
        && !QUOTE.is_match(line)
        && list_item(line).is_none()
        && !is_table_start(lines, i)
}

fn split_row(line: &str) -> Vec<Vec<Inline>> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(|cell| parse_inline(cell.trim())).collect()
}

fn join_words(parts: &[String]) -> String {
    parts.join(" ")
}

/// Split a line of text into inline spans
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Inline::Text(text[last..whole.start()].to_string()));
        }

        let group = |n: usize| caps.get(n).map(|m| m.as_str().to_string());
        let span = if let Some(code) = group(1) {
            Inline::Code(code)
        } else if let Some(strong) = group(2).or_else(|| group(3)) {
            Inline::Strong(strong)
        } else if let Some(emphasis) = group(4).or_else(|| group(5)) {
            Inline::Emphasis(emphasis)
        } else if let (Some(text), Some(url)) = (group(6), group(7)) {
            Inline::Link { text, url }
        } else {
            Inline::Text(whole.as_str().to_string())
        };
        spans.push(span);
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Inline::Text(text[last..].to_string()));
    }
    spans
}

/// Flatten inline spans into terminal text
pub fn render_inline(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(text) | Inline::Strong(text) | Inline::Emphasis(text) => text.clone(),
            Inline::Code(code) => format!("`{code}`"),
            Inline::Link { text, url } => format!("{text} ({url})"),
        })
        .collect()
}

/// Render a document as terminal text
pub fn render(document: &Document) -> String {
    document
        .blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            let text = render_inline(content);
            let width = text.chars().count();
            match level {
                1 => format!("{}\n{}", text.to_uppercase(), "=".repeat(width)),
                2 => format!("{text}\n{}", "-".repeat(width)),
                _ => format!("▸ {text}"),
            }
        }
        Block::Paragraph(spans) => render_inline(spans),
        Block::List { ordered, start, items } => items
            .iter()
            .zip(*start..)
            .map(|(item, n)| {
                if *ordered {
                    format!("  {n}. {}", render_inline(item))
                } else {
                    format!("  • {}", render_inline(item))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Table { header, rows } => {
            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL_CONDENSED);
            table.set_header(header.iter().map(|cell| render_inline(cell)));
            for row in rows {
                table.add_row(row.iter().map(|cell| render_inline(cell)));
            }
            table.to_string()
        }
        Block::Quote(spans) => format!("  ▌ {}", render_inline(spans)),
        Block::Code { code, .. } => code
            .lines()
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Rule => "─".repeat(40),
    }
}

/// Parse and render in one step
pub fn to_terminal(content: &str) -> String {
    render(&parse(content))
}
