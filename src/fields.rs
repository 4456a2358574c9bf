//! Header fields of a message

use chrono::{DateTime, Utc};
use mailparse::{MailAddr, MailHeader, MailHeaderMap, SingleInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::Result;

/// Message-ID wrapper type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Stand-in ID for messages without a Message-ID header
    #[must_use]
    pub fn synthetic(uid: u32) -> Self {
        Self(format!("<synthetic-{uid}@local>"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mailbox with optional display name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailAddress {
    /// Display name (e.g., "John Doe")
    pub name: Option<String>,

    /// Address (e.g., "john@example.com")
    pub address: String,
}

impl EmailAddress {
    /// Parse `Name <local@domain>` or a bare address
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        if let Some(start) = s.find('<')
            && let Some(end) = s[start..].find('>')
        {
            let address = s[start + 1..start + end].trim();
            let name = s[..start].trim().trim_matches('"').trim();
            return address.contains('@').then(|| Self {
                name: (!name.is_empty()).then(|| name.to_string()),
                address: address.to_string(),
            });
        }

        s.contains('@').then(|| Self {
            name: None,
            address: s.to_string(),
        })
    }

    /// Parse an address list, flattening groups.
    ///
    /// Lists `mailparse` rejects fall back to a plain comma split, skipping
    /// unparseable entries.
    #[must_use]
    pub fn parse_list(s: &str) -> Vec<Self> {
        match mailparse::addrparse(s) {
            Ok(list) => list
                .iter()
                .flat_map(|addr| match addr {
                    MailAddr::Single(info) => vec![Self::from(info)],
                    MailAddr::Group(group) => group.addrs.iter().map(Self::from).collect(),
                })
                .collect(),
            Err(e) => {
                debug!("Address list parse failed, splitting on commas: {e}");
                s.split(',').filter_map(Self::parse).collect()
            }
        }
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

impl From<&SingleInfo> for EmailAddress {
    fn from(info: &SingleInfo) -> Self {
        Self {
            name: info
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            address: info.addr.clone(),
        }
    }
}

/// Envelope fields of one message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageFields {
    pub uid: u32,
    pub message_id: MessageId,
    pub from: Option<EmailAddress>,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub subject: String,
    pub date: Option<DateTime<Utc>>,
}

impl MessageFields {
    /// Fields with nothing but the UID known
    #[must_use]
    pub fn empty(uid: u32) -> Self {
        Self {
            uid,
            message_id: MessageId::synthetic(uid),
            from: None,
            to: Vec::new(),
            cc: Vec::new(),
            subject: String::new(),
            date: None,
        }
    }

    /// Extract fields from a raw header block (or a whole raw message)
    pub fn from_header_block(uid: u32, raw: &[u8]) -> Result<Self> {
        let (headers, _) = mailparse::parse_headers(raw)?;
        Ok(Self::from_headers(uid, &headers))
    }

    #[must_use]
    pub fn from_headers(uid: u32, headers: &[MailHeader]) -> Self {
        let value = |key: &str| headers.get_first_value(key);

        Self {
            uid,
            message_id: value("Message-ID")
                .map(|id| MessageId::new(id.trim()))
                .unwrap_or_else(|| MessageId::synthetic(uid)),
            from: value("From").and_then(|v| EmailAddress::parse(&v)),
            to: value("To").map(|v| EmailAddress::parse_list(&v)).unwrap_or_default(),
            cc: value("Cc").map(|v| EmailAddress::parse_list(&v)).unwrap_or_default(),
            subject: value("Subject").unwrap_or_default().trim().to_string(),
            date: value("Date").and_then(|v| parse_date(&v)),
        }
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .or_else(|| {
            mailparse::dateparse(value)
                .ok()
                .and_then(|ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.fixed_offset()))
        })
        .map(|dt| dt.with_timezone(&Utc))
}
