//! Generic RFC 822 parsing and leaf content decoding

use mailparse::{DispositionType, ParsedMail};
use tracing::{debug, warn};

use crate::error::Result;
use crate::structure::MimePart;

/// What a generic MIME parse reports about a message
#[derive(Debug, Clone, Default)]
pub struct RawMessage {
    /// First text/plain body found
    pub text: Option<String>,

    /// First text/html body found
    pub html: Option<String>,

    /// Parts carrying an attachment disposition or a filename
    pub attachments: Vec<RawAttachment>,
}

/// An attachment found by the generic parser
#[derive(Debug, Clone)]
pub struct RawAttachment {
    pub filename: Option<String>,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl RawMessage {
    /// Plain text if it has content, otherwise HTML
    #[must_use]
    pub fn best_body(&self) -> Option<(&str, bool)> {
        let has_content = |s: &&String| !s.trim().is_empty();
        self.text
            .as_ref()
            .filter(has_content)
            .map(|t| (t.as_str(), false))
            .or_else(|| {
                self.html
                    .as_ref()
                    .filter(has_content)
                    .map(|h| (h.as_str(), true))
            })
    }

    /// Filenames of all attachments that declare one
    #[must_use]
    pub fn attachment_names(&self) -> Vec<&str> {
        self.attachments
            .iter()
            .filter_map(|a| a.filename.as_deref())
            .collect()
    }
}

/// Parse a complete raw message (headers + body)
pub fn parse_raw(raw: &[u8]) -> Result<RawMessage> {
    let parsed = mailparse::parse_mail(raw)?;
    let mut message = RawMessage::default();
    collect_parts(&parsed, &mut message);
    Ok(message)
}

/// Parse a `TEXT` section fetch, which has no top-level headers.
///
/// When the section starts with a MIME boundary line the boundary is used
/// to rebuild a multipart envelope; otherwise the whole section is one
/// text body.
pub fn parse_text_section(raw: &[u8]) -> Result<RawMessage> {
    let text = String::from_utf8_lossy(raw);

    let header = if let Some(boundary) = sniff_boundary(&text) {
        debug!("Rebuilding multipart envelope with boundary {boundary}");
        format!("Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n")
    } else if looks_like_html(&text) {
        "Content-Type: text/html; charset=utf-8\r\n\r\n".to_string()
    } else {
        "Content-Type: text/plain; charset=utf-8\r\n\r\n".to_string()
    };

    let mut rebuilt = header.into_bytes();
    rebuilt.extend_from_slice(raw);
    parse_raw(&rebuilt)
}

/// Decode fetched leaf bytes using the part's transfer encoding and charset
#[must_use]
pub fn decode_part(part: &MimePart, raw: &[u8]) -> String {
    let encoding = part.encoding.as_deref().unwrap_or("7bit");
    let charset = part.charset().unwrap_or("utf-8");

    let mut wrapped = format!(
        "Content-Type: {}; charset=\"{charset}\"\r\nContent-Transfer-Encoding: {encoding}\r\n\r\n",
        part.content_type
    )
    .into_bytes();
    wrapped.extend_from_slice(raw);

    match mailparse::parse_mail(&wrapped).and_then(|p| p.get_body()) {
        Ok(body) => body,
        Err(e) => {
            warn!("Falling back to lossy UTF-8 for {}: {e}", part.content_type);
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

fn collect_parts(parsed: &ParsedMail, message: &mut RawMessage) {
    if !parsed.subparts.is_empty() {
        for part in &parsed.subparts {
            collect_parts(part, message);
        }
        return;
    }

    let content_type = parsed.ctype.mimetype.to_lowercase();
    let disposition = parsed.get_content_disposition();
    let filename = disposition
        .params
        .get("filename")
        .or_else(|| parsed.ctype.params.get("name"))
        .filter(|name| !name.trim().is_empty())
        .cloned();

    if disposition.disposition == DispositionType::Attachment || filename.is_some() {
        match parsed.get_body_raw() {
            Ok(content) => message.attachments.push(RawAttachment {
                filename,
                content_type,
                content,
            }),
            Err(e) => warn!("Skipping undecodable attachment: {e}"),
        }
        return;
    }

    let wants_text = content_type == "text/plain" && message.text.is_none();
    let wants_html = content_type == "text/html" && message.html.is_none();
    if !wants_text && !wants_html {
        return;
    }

    match parsed.get_body() {
        Ok(body) if wants_text => message.text = Some(body),
        Ok(body) => message.html = Some(body),
        Err(e) => warn!("Skipping undecodable {content_type} part: {e}"),
    }
}

fn sniff_boundary(text: &str) -> Option<&str> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let boundary = first.strip_prefix("--")?.trim();
    (!boundary.is_empty() && !boundary.contains(char::is_whitespace)).then_some(boundary)
}

fn looks_like_html(text: &str) -> bool {
    let head: String = text.trim_start().chars().take(512).collect::<String>().to_lowercase();
    head.starts_with('<')
        && (head.contains("<html")
            || head.contains("<body")
            || head.contains("<div")
            || head.contains("<table")
            || head.contains("<p"))
}
