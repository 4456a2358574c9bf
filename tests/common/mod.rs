#![allow(dead_code)]

use async_trait::async_trait;
use email_body_extract::{ExtractError, FetchSection, MessageSource, MimePart, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory transport keyed by part id
#[derive(Default)]
pub struct MockSource {
    parts: HashMap<String, Vec<u8>>,
    failing: Vec<String>,
    full: Option<Vec<u8>>,
    text: Option<Vec<u8>>,
    refetch_fails: bool,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, id: &str, content: &str) -> Self {
        self.parts.insert(id.to_string(), content.as_bytes().to_vec());
        self
    }

    pub fn with_failing_part(mut self, id: &str) -> Self {
        self.failing.push(id.to_string());
        self
    }

    pub fn with_full(mut self, raw: &str) -> Self {
        self.full = Some(raw.as_bytes().to_vec());
        self
    }

    pub fn with_text_section(mut self, raw: &str) -> Self {
        self.text = Some(raw.as_bytes().to_vec());
        self
    }

    pub fn with_failing_refetch(mut self) -> Self {
        self.refetch_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSource for MockSource {
    async fn fetch_part(&self, uid: u32, part: &MimePart) -> Result<Vec<u8>> {
        let id = part.part_id.clone().unwrap_or_default();
        self.calls.lock().unwrap().push(format!("part:{id}"));

        if self.failing.contains(&id) {
            return Err(ExtractError::Fetch(format!("uid {uid} part {id}: connection reset")));
        }
        self.parts
            .get(&id)
            .cloned()
            .ok_or(ExtractError::Unavailable(id))
    }

    async fn refetch_by_uid(&self, uid: u32, section: FetchSection) -> Result<Option<Vec<u8>>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("refetch:{}", section.as_imap()));

        if self.refetch_fails {
            return Err(ExtractError::Fetch(format!("uid {uid}: connection timed out")));
        }

        Ok(match section {
            FetchSection::Full => self.full.clone(),
            FetchSection::Text => self.text.clone(),
        })
    }
}

/// multipart/alternative with a plain leaf "1" and an HTML leaf "2"
pub fn alternative() -> MimePart {
    MimePart::multipart(
        "alternative",
        vec![
            MimePart::leaf("text", "plain").with_part_id("1"),
            MimePart::leaf("text", "html").with_part_id("2"),
        ],
    )
}
