//! Attachment presence and naming for a single message

use serde::{Serialize, Serializer};
use std::borrow::Cow;
use tracing::{debug, warn};

use crate::mime::parse_raw;
use crate::navigator::classify;
use crate::source::{FetchSection, FetchedMessage, MessageSource};
use crate::structure::MessageStructure;

/// Whether a message carries attachments, and what they are called.
///
/// Serializes as `false`, `true` or the joined names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSummary {
    None,
    /// Attachments exist but none declares a name
    Unnamed,
    /// One name, or several joined with `", "`
    Named(String),
}

impl AttachmentSummary {
    /// Summary for a list of names; empty means no attachment
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        if names.is_empty() {
            return Self::None;
        }
        let joined = names
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        Self::Named(joined)
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::None | Self::Unnamed => None,
        }
    }
}

impl Serialize for AttachmentSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_bool(false),
            Self::Unnamed => serializer.serialize_bool(true),
            Self::Named(name) => serializer.serialize_str(name),
        }
    }
}

/// Summary from structural metadata alone; `None` when the structure
/// shows no attachment
#[must_use]
pub fn summarize_structure(structure: &MessageStructure) -> Option<AttachmentSummary> {
    let parts = classify(structure);
    parts
        .has_attachments()
        .then(|| AttachmentSummary::from_names(parts.attachment_names()))
}

/// Resolve the attachment summary of a message.
///
/// The structure is consulted first. When it shows nothing, the full raw
/// message (pre-fetched, or re-fetched through `source`) is parsed and its
/// attachment list used instead. Any failure along the way yields
/// [`AttachmentSummary::None`].
pub async fn resolve_attachment_summary(
    message: &FetchedMessage,
    source: Option<&dyn MessageSource>,
) -> AttachmentSummary {
    if let Some(summary) = summarize_structure(message.structure()) {
        return summary;
    }

    let Some(raw) = raw_message(message, source).await else {
        return AttachmentSummary::None;
    };

    match parse_raw(&raw) {
        Ok(parsed) if parsed.attachments.is_empty() => AttachmentSummary::None,
        Ok(parsed) => {
            let names = parsed.attachment_names();
            if names.is_empty() {
                AttachmentSummary::Unnamed
            } else {
                AttachmentSummary::from_names(names)
            }
        }
        Err(e) => {
            warn!("UID {}: raw message parse failed: {e}", message.uid);
            AttachmentSummary::None
        }
    }
}

async fn raw_message<'a>(
    message: &'a FetchedMessage,
    source: Option<&dyn MessageSource>,
) -> Option<Cow<'a, [u8]>> {
    if let Some(raw) = &message.raw {
        return Some(Cow::Borrowed(raw.as_slice()));
    }

    let source = source?;
    debug!("UID {}: re-fetching full message for attachments", message.uid);
    match source.refetch_by_uid(message.uid, FetchSection::Full).await {
        Ok(raw) => raw.map(Cow::Owned),
        Err(e) => {
            warn!("UID {}: re-fetch failed: {e}", message.uid);
            None
        }
    }
}
