//! Resolving one authoritative body for a message

use serde::Serialize;
use tracing::{debug, warn};

use crate::columnar::{ColumnarTable, to_columnar_json};
use crate::hierarchy::{HierarchicalNode, to_hierarchical_json};
use crate::mime::{RawMessage, decode_part, parse_raw, parse_text_section};
use crate::navigator::classify;
use crate::options::{Projection, ResolveOptions};
use crate::sanitize::sanitize_html;
use crate::source::{FetchSection, FetchedMessage, MessageSource};
use crate::structure::MimePart;

/// Suffix appended to truncated bodies
pub const TRUNCATION_SUFFIX: &str = "...";

/// Format the body content was found in
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    #[default]
    Plain,
    Html,
}

/// Body content after projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BodyContent {
    Text(String),
    Hierarchical(HierarchicalNode),
    Columnar(ColumnarTable),
}

impl Default for BodyContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// The chosen representation of a message's content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBody {
    #[serde(rename = "text")]
    pub content: BodyContent,
    pub source_format: SourceFormat,
    pub truncated: bool,
}

impl ResolvedBody {
    /// No retrievable content
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            BodyContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for blank text; structured results are never empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_text().is_some_and(|text| text.trim().is_empty())
    }
}

/// Resolve the body of `message`.
///
/// Tries the HTML leaf, then the plain leaf, then a parse of the raw
/// message (pre-fetched, or the `TEXT` section re-fetched by UID). The
/// first stage with non-blank content wins. Fetch and parse failures are
/// logged and skipped.
pub async fn resolve_body(
    message: &FetchedMessage,
    source: &dyn MessageSource,
    options: &ResolveOptions,
) -> ResolvedBody {
    let uid = message.uid;
    let parts = classify(message.structure());

    if let Some(part) = parts.html
        && let Some(html) = fetch_leaf(uid, part, source).await
    {
        let body = apply_projection(html, SourceFormat::Html, options);
        if !body.is_empty() {
            return body;
        }
        debug!("UID {uid}: HTML leaf rendered empty, trying plain text");
    }

    if let Some(part) = parts.plain
        && let Some(text) = fetch_leaf(uid, part, source).await
    {
        return apply_projection(text, SourceFormat::Plain, options);
    }

    if let Some((text, format)) = parse_fallback(message, source).await {
        let body = apply_projection(text, format, options);
        if !body.is_empty() {
            return body;
        }
    }

    debug!("UID {uid}: no body content found");
    ResolvedBody::empty()
}

/// Shape raw content according to the requested projection.
///
/// Projections only change HTML sources; plain text passes through.
#[must_use]
pub fn apply_projection(text: String, format: SourceFormat, options: &ResolveOptions) -> ResolvedBody {
    let content = match (format, options.projection) {
        (SourceFormat::Plain, _) | (SourceFormat::Html, Projection::RawHtml) => {
            BodyContent::Text(text)
        }
        (SourceFormat::Html, Projection::HierarchicalJson) => {
            BodyContent::Hierarchical(to_hierarchical_json(&text))
        }
        (SourceFormat::Html, Projection::ColumnarJson) => {
            BodyContent::Columnar(to_columnar_json(&text))
        }
        (SourceFormat::Html, Projection::Plain | Projection::FullSanitized) => {
            BodyContent::Text(sanitize_html(&text))
        }
    };

    let mut body = ResolvedBody {
        content,
        source_format: format,
        truncated: false,
    };

    if options.should_truncate()
        && let BodyContent::Text(text) = &mut body.content
        && let Some(short) = truncate(text, options.truncate_at)
    {
        *text = short;
        body.truncated = true;
    }

    body
}

/// Cut `text` to `limit` characters plus [`TRUNCATION_SUFFIX`]; `None`
/// when it already fits
#[must_use]
pub fn truncate(text: &str, limit: usize) -> Option<String> {
    let (cut, _) = text.char_indices().nth(limit)?;
    Some(format!("{}{TRUNCATION_SUFFIX}", &text[..cut]))
}

async fn fetch_leaf(uid: u32, part: &MimePart, source: &dyn MessageSource) -> Option<String> {
    match source.fetch_part(uid, part).await {
        Ok(raw) => {
            let text = decode_part(part, &raw);
            if text.trim().is_empty() {
                debug!("UID {uid}: {} leaf is blank", part.content_type);
                None
            } else {
                Some(text)
            }
        }
        Err(e) => {
            warn!("UID {uid}: fetching {} leaf failed: {e}", part.content_type);
            None
        }
    }
}

async fn parse_fallback(
    message: &FetchedMessage,
    source: &dyn MessageSource,
) -> Option<(String, SourceFormat)> {
    let uid = message.uid;

    let parsed = if let Some(raw) = &message.raw {
        debug!("UID {uid}: parsing pre-fetched raw message");
        parse_raw(raw)
    } else {
        debug!("UID {uid}: re-fetching TEXT section");
        match source.refetch_by_uid(uid, FetchSection::Text).await {
            Ok(Some(raw)) => parse_text_section(&raw),
            Ok(None) => return None,
            Err(e) => {
                warn!("UID {uid}: TEXT re-fetch failed: {e}");
                return None;
            }
        }
    };

    match parsed {
        Ok(parsed) => best_body(&parsed),
        Err(e) => {
            warn!("UID {uid}: fallback parse failed: {e}");
            None
        }
    }
}

fn best_body(parsed: &RawMessage) -> Option<(String, SourceFormat)> {
    parsed.best_body().map(|(text, is_html)| {
        let format = if is_html {
            SourceFormat::Html
        } else {
            SourceFormat::Plain
        };
        (text.to_string(), format)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("héllo wörld", 5).as_deref(), Some("héllo..."));
        assert_eq!(truncate("short", 5), None);
        assert_eq!(truncate("", 0), None);
    }

    #[test]
    fn structured_results_are_never_empty() {
        let body = apply_projection(
            "<p>no tables</p>".to_string(),
            SourceFormat::Html,
            &ResolveOptions::default().with_projection(Projection::ColumnarJson),
        );
        assert!(!body.is_empty());
        assert_eq!(body.content, BodyContent::Columnar(ColumnarTable::default()));
    }
}
