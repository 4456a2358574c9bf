//! Locating body and attachment leaves in a message structure

use tracing::trace;

use crate::structure::{DispositionKind, MessageStructure, MimePart};

/// Why a leaf was classified as an attachment.
///
/// Variants are listed in precedence order; the first rule that matches a
/// leaf decides its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentRule {
    /// `Content-Disposition: attachment`
    Disposition,
    /// A filename is declared on the disposition or the content type
    Named,
    /// Inline disposition on an application part
    InlineBinary,
    /// `application/*` part without any disposition hint
    UndeclaredBinary,
}

/// Body and attachment leaves found in one structure
#[derive(Debug, Clone, Default)]
pub struct PartClassification<'a> {
    /// First text/plain leaf in depth-first order
    pub plain: Option<&'a MimePart>,

    /// First text/html leaf in depth-first order
    pub html: Option<&'a MimePart>,

    /// All attachment-like leaves in depth-first order
    pub attachments: Vec<&'a MimePart>,
}

impl PartClassification<'_> {
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Resolved filenames of every attachment leaf
    #[must_use]
    pub fn attachment_names(&self) -> Vec<String> {
        self.attachments
            .iter()
            .map(|part| attachment_filename(part))
            .collect()
    }
}

/// Walk the structure once and classify every leaf.
///
/// Text leaves with an explicit `attachment` disposition only become body
/// candidates when the structure has no other text/plain or text/html leaf.
#[must_use]
pub fn classify(structure: &MessageStructure) -> PartClassification<'_> {
    let mut found = PartClassification::default();
    let mut attached = PartClassification::default();

    for leaf in structure.leaves() {
        if let Some(rule) = attachment_rule(leaf) {
            trace!(content_type = %leaf.content_type, ?rule, "Attachment leaf");
            found.attachments.push(leaf);
        }

        let candidates = if leaf.disposition_kind() == Some(&DispositionKind::Attachment) {
            &mut attached
        } else {
            &mut found
        };

        if candidates.plain.is_none() && leaf.content_type.is("text", "plain") {
            candidates.plain = Some(leaf);
        } else if candidates.html.is_none() && leaf.content_type.is("text", "html") {
            candidates.html = Some(leaf);
        }
    }

    if found.plain.is_none() && found.html.is_none() {
        found.plain = attached.plain;
        found.html = attached.html;
    }

    found
}

/// Decide whether a leaf is attachment-like, returning the rule that fired
#[must_use]
pub fn attachment_rule(part: &MimePart) -> Option<AttachmentRule> {
    let kind = part.disposition_kind();
    let has_name = declared_filename(part).is_some();
    let is_application = part.content_type.is_kind("application");

    if kind == Some(&DispositionKind::Attachment) {
        Some(AttachmentRule::Disposition)
    } else if has_name {
        Some(AttachmentRule::Named)
    } else if kind == Some(&DispositionKind::Inline) && is_application {
        Some(AttachmentRule::InlineBinary)
    } else if is_application && part.content_type.subtype().is_some() {
        Some(AttachmentRule::UndeclaredBinary)
    } else {
        None
    }
}

/// Display filename of an attachment leaf, synthesized when none is declared
#[must_use]
pub fn attachment_filename(part: &MimePart) -> String {
    if let Some(name) = declared_filename(part) {
        return name.to_string();
    }

    part.content_type.subtype().map_or_else(
        || "attachment".to_string(),
        |sub| format!("attachment.{}", sub.to_lowercase()),
    )
}

fn declared_filename(part: &MimePart) -> Option<&str> {
    part.disposition
        .as_ref()
        .and_then(|d| d.filename())
        .or_else(|| part.param("name"))
        .or_else(|| part.param("filename"))
}
