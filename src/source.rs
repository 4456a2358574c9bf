//! Transport capabilities the extraction core depends on

use async_trait::async_trait;

use crate::error::Result;
use crate::structure::{MessageStructure, MimePart};

/// Section requested when re-fetching a whole message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSection {
    /// The complete RFC 822 message, headers included
    Full,
    /// The `TEXT` section: the body without top-level headers
    Text,
}

impl FetchSection {
    /// IMAP section specifier
    #[must_use]
    pub const fn as_imap(self) -> &'static str {
        match self {
            Self::Full => "",
            Self::Text => "TEXT",
        }
    }
}

/// Asynchronous access to message content held by the mail server.
///
/// Implemented by the transport layer. Errors are logged by the caller and
/// treated as "no content"; they never abort extraction.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Raw bytes of one leaf part of message `uid`, still transfer-encoded
    async fn fetch_part(&self, uid: u32, part: &MimePart) -> Result<Vec<u8>>;

    /// Re-fetch message `uid`; `Ok(None)` when the server has nothing
    async fn refetch_by_uid(&self, uid: u32, section: FetchSection) -> Result<Option<Vec<u8>>>;
}

static EMPTY_STRUCTURE: MessageStructure = MessageStructure { parts: Vec::new() };

/// Everything the transport fetched up front for one message
#[derive(Debug, Clone, Default)]
pub struct FetchedMessage {
    pub uid: u32,

    /// Body structure; `None` when the server returned none
    pub structure: Option<MessageStructure>,

    /// Full raw message, when it was fetched alongside the structure
    pub raw: Option<Vec<u8>>,

    /// Raw header block
    pub headers: Option<Vec<u8>>,
}

impl FetchedMessage {
    #[must_use]
    pub fn new(uid: u32) -> Self {
        Self {
            uid,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_structure(mut self, structure: impl Into<MessageStructure>) -> Self {
        self.structure = Some(structure.into());
        self
    }

    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<Vec<u8>>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: impl Into<Vec<u8>>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// The structure, or an empty one when absent
    #[must_use]
    pub fn structure(&self) -> &MessageStructure {
        self.structure.as_ref().unwrap_or(&EMPTY_STRUCTURE)
    }
}
