//! Shared helpers over parsed HTML documents

use scraper::{ElementRef, Node};

/// Elements whose whole subtree is dropped
pub const SKIP_TAGS: &[&str] = &[
    "style", "script", "head", "meta", "link", "noscript", "template", "title",
];

/// Elements that never have children
pub const VOID_TAGS: &[&str] = &[
    "img", "br", "hr", "input", "wbr", "col", "area", "base", "embed", "source", "track",
];

/// Elements whose children belong to the enclosing level
pub const TRANSPARENT_TAGS: &[&str] = &["html", "body", "tbody", "thead", "tfoot"];

const BREAKING_TAGS: &[&str] = &[
    "br", "p", "div", "li", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
    "pre", "hr", "ul", "ol", "table",
];

pub fn is_skipped(name: &str) -> bool {
    SKIP_TAGS.contains(&name)
}

pub fn is_void(name: &str) -> bool {
    VOID_TAGS.contains(&name)
}

pub fn is_transparent(name: &str) -> bool {
    TRANSPARENT_TAGS.contains(&name)
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of an element, skipped subtrees excluded, whitespace
/// collapsed. Line-breaking elements separate their neighbours by a space.
pub fn flat_text(element: ElementRef) -> String {
    let mut out = String::new();
    push_flat_text(element, &mut out);
    collapse_whitespace(&out)
}

fn push_flat_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(data) => {
                let name = data.name();
                if is_skipped(name) {
                    continue;
                }
                let breaks = BREAKING_TAGS.contains(&name);
                if breaks {
                    out.push(' ');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_flat_text(child_el, out);
                }
                if breaks {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Rows of one table as cell text. Rows of nested tables are not
/// included; their text is flattened into the enclosing cell.
pub fn table_rows(table: ElementRef) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    collect_rows(table, &mut rows);
    rows
}

fn collect_rows(element: ElementRef, rows: &mut Vec<Vec<String>>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => {
                let cells: Vec<String> = child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(flat_text)
                    .collect();
                if !cells.is_empty() {
                    rows.push(cells);
                }
            }
            "table" => {}
            name if is_skipped(name) => {}
            _ => collect_rows(child, rows),
        }
    }
}

/// Decode the HTML entities common in mail markup.
///
/// Only used on text that never went through the DOM parser.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }

    Some(match entity {
        "nbsp" => '\u{a0}',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "euro" => '\u{20ac}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        _ => return None,
    })
}
