//! HTML tables to a column-name -> values mapping

use regex::Regex;
use scraper::{Html, Selector};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::dom::{collapse_whitespace, decode_entities, table_rows};

static TABLE_SELECTOR: std::sync::LazyLock<Selector> =
    std::sync::LazyLock::new(|| Selector::parse("table").unwrap());

static TABLE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").unwrap());

static ROW_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap());

static CELL_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)</t[dh]\s*>").unwrap());

static TAG_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static COMMENT_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Column header -> cell values, columns in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnarTable {
    columns: Vec<(String, Vec<String>)>,
}

impl ColumnarTable {
    #[must_use]
    pub fn column(&self, header: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, values)| values.as_slice())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn values_mut(&mut self, header: &str) -> &mut Vec<String> {
        let index = match self.columns.iter().position(|(name, _)| name == header) {
            Some(index) => index,
            None => {
                self.columns.push((header.to_string(), Vec::new()));
                self.columns.len() - 1
            }
        };
        &mut self.columns[index].1
    }

    /// Merge one table given as rows of cell text; the first row is the header
    fn add_table(&mut self, rows: &[Vec<String>]) {
        let Some((header_row, data_rows)) = rows.split_first() else {
            return;
        };

        let start = self.row_count();
        let headers = unique_headers(header_row);
        for header in &headers {
            self.values_mut(header).resize(start, String::new());
        }

        for row in data_rows {
            for (i, header) in headers.iter().enumerate() {
                let value = row.get(i).cloned().unwrap_or_default();
                self.values_mut(header).push(value);
            }
        }

        // Columns this table lacks are padded so every column stays aligned
        let end = start + data_rows.len();
        for (_, values) in &mut self.columns {
            values.resize(end, String::new());
        }
    }

    /// Number of data rows merged so far
    fn row_count(&self) -> usize {
        self.columns.iter().map(|(_, values)| values.len()).max().unwrap_or(0)
    }
}

impl Serialize for ColumnarTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in &self.columns {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Blank headers become `column_<n>`; repeats within one table get a
/// `_<k>` suffix so every column of a table stays the same length.
fn unique_headers(cells: &[String]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let base = if cell.is_empty() {
            format!("column_{}", i + 1)
        } else {
            cell.clone()
        };

        let mut name = base.clone();
        let mut k = 2;
        while headers.contains(&name) {
            name = format!("{base}_{k}");
            k += 1;
        }
        headers.push(name);
    }
    headers
}

/// Extract every table in the document into one [`ColumnarTable`].
///
/// Tables sharing a header name append to the same column; columns a
/// table lacks get `""` for its rows, so all columns have equal length. No
/// tables means an empty mapping.
#[must_use]
pub fn to_columnar_json(html: &str) -> ColumnarTable {
    let mut table = ColumnarTable::default();
    if html.trim().is_empty() {
        return table;
    }

    let document = Html::parse_document(html);
    let mut found = false;
    for element in document.select(&TABLE_SELECTOR) {
        let rows = table_rows(element);
        if !rows.is_empty() {
            table.add_table(&rows);
            found = true;
        }
    }

    if !found {
        for rows in scan_tables(html) {
            debug!("Recovered table by tag scan");
            table.add_table(&rows);
        }
    }

    table
}

/// Tag-matching table scan for markup the DOM parser did not surface
fn scan_tables(html: &str) -> Vec<Vec<Vec<String>>> {
    let html = COMMENT_REGEX.replace_all(html, "");

    TABLE_REGEX
        .captures_iter(&html)
        .filter_map(|table| table.get(1))
        .map(|body| {
            ROW_REGEX
                .captures_iter(body.as_str())
                .filter_map(|row| row.get(1))
                .map(|row| {
                    CELL_REGEX
                        .captures_iter(row.as_str())
                        .filter_map(|cell| cell.get(1))
                        .map(|cell| cell_text(cell.as_str()))
                        .collect::<Vec<_>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|rows| !rows.is_empty())
        .collect()
}

fn cell_text(markup: &str) -> String {
    let stripped = TAG_REGEX.replace_all(markup, " ");
    collapse_whitespace(&decode_entities(&stripped))
}
