//! Extraction options supplied by the embedding CLI or config layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExtractError;

/// Default character limit for truncated bodies
pub const DEFAULT_TRUNCATE_AT: usize = 200;

/// Requested shape of the resolved body
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Projection {
    /// Sanitized text, truncated for listings
    #[default]
    Plain,
    /// Sanitized text, never truncated
    FullSanitized,
    /// HTML exactly as fetched
    RawHtml,
    HierarchicalJson,
    ColumnarJson,
}

impl Projection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::FullSanitized => "full-sanitized",
            Self::RawHtml => "raw-html",
            Self::HierarchicalJson => "hierarchical-json",
            Self::ColumnarJson => "columnar-json",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Projection {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "full-sanitized" | "full" => Ok(Self::FullSanitized),
            "raw-html" | "html" => Ok(Self::RawHtml),
            "hierarchical-json" | "json" => Ok(Self::HierarchicalJson),
            "columnar-json" => Ok(Self::ColumnarJson),
            other => Err(ExtractError::InvalidOption(format!("unknown projection '{other}'"))),
        }
    }
}

/// How a message body should be resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolveOptions {
    pub projection: Projection,

    /// The caller asked for one specific message; bodies are not truncated
    pub single_message: bool,

    /// Character limit applied to plain listings
    pub truncate_at: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            projection: Projection::Plain,
            single_message: false,
            truncate_at: DEFAULT_TRUNCATE_AT,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub const fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    #[must_use]
    pub const fn with_single_message(mut self, single: bool) -> Self {
        self.single_message = single;
        self
    }

    #[must_use]
    pub const fn with_truncate_at(mut self, limit: usize) -> Self {
        self.truncate_at = limit;
        self
    }

    /// Only plain listings of several messages are truncated
    #[must_use]
    pub const fn should_truncate(&self) -> bool {
        matches!(self.projection, Projection::Plain) && !self.single_message
    }
}
