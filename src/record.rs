//! Per-message extraction results and their batch accumulator

use serde::Serialize;
use tracing::{debug, warn};

use crate::attachments::{AttachmentSummary, resolve_attachment_summary};
use crate::body::{ResolvedBody, resolve_body};
use crate::fields::MessageFields;
use crate::options::ResolveOptions;
use crate::source::{FetchedMessage, MessageSource};

/// Everything extracted from one message
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    #[serde(flatten)]
    pub fields: MessageFields,
    pub body: ResolvedBody,
    pub attachments: AttachmentSummary,
}

/// Extract fields, attachment summary and body of one message.
///
/// Never fails: missing headers give empty fields, and the body and
/// attachment stages degrade on their own.
pub async fn extract_message(
    message: &FetchedMessage,
    source: &dyn MessageSource,
    options: &ResolveOptions,
) -> MessageRecord {
    let fields = message
        .headers
        .as_deref()
        .or(message.raw.as_deref())
        .map_or_else(
            || MessageFields::empty(message.uid),
            |raw| {
                MessageFields::from_header_block(message.uid, raw).unwrap_or_else(|e| {
                    warn!("UID {}: header parse failed: {e}", message.uid);
                    MessageFields::empty(message.uid)
                })
            },
        );

    let attachments = resolve_attachment_summary(message, Some(source)).await;
    let body = resolve_body(message, source, options).await;
    debug!("UID {}: extracted ({:?} body)", message.uid, body.source_format);

    MessageRecord {
        fields,
        body,
        attachments,
    }
}

/// Accumulates records across a batch of messages.
///
/// Owned by the caller's per-message loop and returned when the batch is
/// done; nothing is kept in process-wide state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<MessageRecord>,
}

impl RecordSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: MessageRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<MessageRecord> {
        self.records
    }

    /// Render the batch as a pretty-printed JSON array
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Extend<MessageRecord> for RecordSet {
    fn extend<I: IntoIterator<Item = MessageRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}
