// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Email Body Extraction
//!
//! Turns the MIME structure of a fetched message into a single readable
//! body, an attachment summary, and structured projections of HTML
//! bodies.
//!
//! # Features
//!
//! - Body/attachment leaf classification over ragged structure trees
//! - Multi-stage body resolution with fetch and re-fetch fallbacks
//! - HTML to block-aware text, with tables as `| a | b |` rows
//! - HTML to a nested object mirroring element nesting
//! - HTML tables to column-name -> values mappings
//!
//! Transport concerns (IMAP sessions, re-fetching) stay behind the
//! [`MessageSource`] trait.
//!
//! # Example
//!
//! ```rust
//! use email_body_extract::{sanitize_html, to_columnar_json};
//!
//! let html = "<table><tr><th>Field</th><th>Response</th></tr>\
//!             <tr><td>Name</td><td>John Doe</td></tr></table>";
//!
//! assert_eq!(sanitize_html(html), "| Field | Response |\n| Name | John Doe |");
//!
//! let columns = to_columnar_json(html);
//! assert_eq!(columns.column("Response"), Some(&["John Doe".to_string()][..]));
//! ```

mod attachments;
mod body;
mod columnar;
mod dom;
mod error;
mod fields;
mod hierarchy;
mod mime;
mod navigator;
mod options;
mod record;
mod sanitize;
mod source;
mod structure;

pub use attachments::{AttachmentSummary, resolve_attachment_summary, summarize_structure};
pub use body::{
    BodyContent, ResolvedBody, SourceFormat, TRUNCATION_SUFFIX, apply_projection, resolve_body,
    truncate,
};
pub use columnar::{ColumnarTable, to_columnar_json};
pub use error::{ExtractError, Result};
pub use fields::{EmailAddress, MessageFields, MessageId};
pub use hierarchy::{HierarchicalNode, NodeValue, TABLE_KEY, TEXT_KEY, to_hierarchical_json};
pub use mime::{RawAttachment, RawMessage, decode_part, parse_raw, parse_text_section};
pub use navigator::{
    AttachmentRule, PartClassification, attachment_filename, attachment_rule, classify,
};
pub use options::{DEFAULT_TRUNCATE_AT, Projection, ResolveOptions};
pub use record::{MessageRecord, RecordSet, extract_message};
pub use sanitize::sanitize_html;
pub use source::{FetchSection, FetchedMessage, MessageSource};
pub use structure::{
    ContentType, Disposition, DispositionKind, MessageStructure, MimePart, StructNode,
};
