//! HTML to readable plain text

use scraper::{ElementRef, Html, Node};
use std::ops::Range;

use crate::dom::{self, is_skipped};

/// Render HTML as block-aware plain text.
///
/// Headings are set off by blank lines, paragraphs and divs start on their
/// own line, links keep only their text, and tables become one
/// `| cell | cell |` line per row. Never fails; broken markup renders as
/// whatever the HTML parser recovered.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);
    let mut writer = TextWriter::default();
    writer.walk(document.root_element());
    writer.finish()
}

#[derive(Default)]
struct TextWriter {
    out: String,
    pending_space: bool,
    pre_depth: usize,
    /// Byte ranges of `out` written from inside `<pre>`
    pre_spans: Vec<Range<usize>>,
}

impl TextWriter {
    fn walk(&mut self, element: ElementRef) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    if self.pre_depth > 0 {
                        self.push_preformatted(text);
                    } else {
                        self.push_text(text);
                    }
                }
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.element(child_el);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef) {
        let name = element.value().name();
        if is_skipped(name) {
            return;
        }

        match name {
            "br" => self.push_newline(),
            "table" => self.table(element),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.block(element, 2),
            "p" | "div" | "ul" | "ol" | "blockquote" | "section" | "article" | "header"
            | "footer" | "center" | "address" => self.block(element, 1),
            "hr" => self.break_lines(1),
            "li" => {
                self.break_lines(1);
                self.out.push_str("- ");
                self.walk(element);
                self.break_lines(1);
            }
            "pre" => {
                self.break_lines(1);
                let start = self.out.len();
                self.pre_depth += 1;
                self.walk(element);
                self.pre_depth -= 1;
                self.pre_spans.push(start..self.out.len());
                self.break_lines(1);
            }
            _ => self.walk(element),
        }
    }

    fn block(&mut self, element: ElementRef, breaks: usize) {
        self.break_lines(breaks);
        self.walk(element);
        self.break_lines(breaks);
    }

    fn table(&mut self, table: ElementRef) {
        let rows = dom::table_rows(table);
        if rows.is_empty() {
            return;
        }

        self.break_lines(2);
        for row in rows {
            self.out.push_str("| ");
            self.out.push_str(&row.join(" | "));
            self.out.push_str(" |\n");
        }
        self.break_lines(2);
    }

    fn push_text(&mut self, text: &str) {
        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            self.pending_space |= !text.is_empty();
            return;
        }

        let mut space = self.pending_space || text.starts_with(char::is_whitespace);
        for word in words {
            if space && !self.at_line_start() && !self.out.ends_with(' ') {
                self.out.push(' ');
            }
            self.out.push_str(word);
            space = true;
        }
        self.pending_space = text.ends_with(char::is_whitespace);
    }

    fn push_preformatted(&mut self, text: &str) {
        self.out.push_str(text);
        self.pending_space = false;
    }

    fn push_newline(&mut self) {
        self.out.push('\n');
        self.pending_space = false;
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Make sure the output ends with at least `count` line breaks
    fn break_lines(&mut self, count: usize) {
        self.pending_space = false;
        if self.out.is_empty() {
            return;
        }
        let trailing = self.out.chars().rev().take_while(|&c| c == '\n').count();
        for _ in trailing..count {
            self.out.push('\n');
        }
    }

    fn is_preformatted(&self, line_start: usize) -> bool {
        self.pre_spans
            .iter()
            .any(|span| span.start <= line_start && line_start < span.end)
    }

    /// Collapse blank-line runs and trailing spaces outside `<pre>` content
    fn finish(self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        let mut blank_run = 0;
        let mut offset = 0;

        for line in self.out.split('\n') {
            let line_start = offset;
            offset += line.len() + 1;

            if self.is_preformatted(line_start) {
                blank_run = 0;
                lines.push(line);
                continue;
            }

            let line = line.trim_end();
            if line.trim().is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
                lines.push("");
            } else {
                blank_run = 0;
                lines.push(line);
            }
        }

        lines.join("\n").trim_matches('\n').to_string()
    }
}
