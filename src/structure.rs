//! MIME structure tree as delivered by the transport layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// MIME type/subtype pair
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentType {
    /// Primary type (e.g., "text", "application")
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Subtype (e.g., "plain", "pdf")
    #[serde(default)]
    pub subtype: Option<String>,
}

impl ContentType {
    pub fn new(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subtype: Some(subtype.into()),
        }
    }

    /// Case-insensitive match against a type/subtype pair
    #[must_use]
    pub fn is(&self, kind: &str, subtype: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
            && self
                .subtype
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(subtype))
    }

    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }

    /// Subtype, ignoring blank values
    #[must_use]
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subtype() {
            Some(sub) => write!(f, "{}/{}", self.kind.to_lowercase(), sub.to_lowercase()),
            None => write!(f, "{}", self.kind.to_lowercase()),
        }
    }
}

/// Content-Disposition kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum DispositionKind {
    Inline,
    Attachment,
    Other(String),
}

impl From<String> for DispositionKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "inline" => Self::Inline,
            "attachment" => Self::Attachment,
            _ => Self::Other(value),
        }
    }
}

impl From<DispositionKind> for String {
    fn from(kind: DispositionKind) -> Self {
        match kind {
            DispositionKind::Inline => "inline".into(),
            DispositionKind::Attachment => "attachment".into(),
            DispositionKind::Other(other) => other,
        }
    }
}

/// Content-Disposition header of a part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Disposition {
    #[serde(rename = "type")]
    pub kind: DispositionKind,

    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Disposition {
    /// The `filename` parameter, if non-blank
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        lookup(&self.params, "filename")
    }
}

/// A node of the message structure tree.
///
/// A part is a leaf iff `children` is empty. Ragged array nesting in the
/// input is flattened while deserializing, so `children` only ever holds
/// real parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MimePart {
    #[serde(default)]
    pub content_type: ContentType,

    #[serde(default)]
    pub disposition: Option<Disposition>,

    /// Content-Type parameters (name, charset, ...)
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// IMAP section specifier used to fetch this part (e.g., "1.2")
    #[serde(default)]
    pub part_id: Option<String>,

    /// Content-Transfer-Encoding
    #[serde(default)]
    pub encoding: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,

    #[serde(default, deserialize_with = "deserialize_children")]
    pub children: Vec<Self>,
}

impl MimePart {
    /// A childless part of the given type
    pub fn leaf(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::new(kind, subtype),
            ..Self::default()
        }
    }

    /// A `multipart/<subtype>` container
    pub fn multipart(subtype: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            content_type: ContentType::new("multipart", subtype),
            children,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_disposition(mut self, kind: DispositionKind, filename: Option<&str>) -> Self {
        let mut params = BTreeMap::new();
        if let Some(name) = filename {
            params.insert("filename".to_string(), name.to_string());
        }
        self.disposition = Some(Disposition { kind, params });
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_part_id(mut self, id: &str) -> Self {
        self.part_id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = Some(encoding.to_string());
        self
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Content-Type parameter by case-insensitive key, ignoring blank values
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        lookup(&self.params, key)
    }

    #[must_use]
    pub fn disposition_kind(&self) -> Option<&DispositionKind> {
        self.disposition.as_ref().map(|d| &d.kind)
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }
}

fn lookup<'a>(params: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Raw structure node: either a part or an array wrapping more nodes.
///
/// Arrays are an upstream flattening artifact and carry no meaning of
/// their own.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StructNode {
    Nested(Vec<StructNode>),
    Part(Box<MimePart>),
    Null,
}

impl StructNode {
    fn flatten_into(self, out: &mut Vec<MimePart>) {
        match self {
            Self::Part(part) => out.push(*part),
            Self::Null => {}
            Self::Nested(nodes) => {
                for node in nodes {
                    node.flatten_into(out);
                }
            }
        }
    }
}

fn flatten_nodes(nodes: Vec<StructNode>) -> Vec<MimePart> {
    let mut parts = Vec::with_capacity(nodes.len());
    for node in nodes {
        node.flatten_into(&mut parts);
    }
    parts
}

fn deserialize_children<'de, D>(deserializer: D) -> std::result::Result<Vec<MimePart>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let nodes = Option::<Vec<StructNode>>::deserialize(deserializer)?;
    Ok(nodes.map(flatten_nodes).unwrap_or_default())
}

/// Normalized structure of one message: zero or more top-level parts
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<StructNode>")]
pub struct MessageStructure {
    pub parts: Vec<MimePart>,
}

impl From<Option<StructNode>> for MessageStructure {
    fn from(node: Option<StructNode>) -> Self {
        let mut parts = Vec::new();
        if let Some(node) = node {
            node.flatten_into(&mut parts);
        }
        Self { parts }
    }
}

impl From<StructNode> for MessageStructure {
    fn from(node: StructNode) -> Self {
        Self::from(Some(node))
    }
}

impl From<MimePart> for MessageStructure {
    fn from(part: MimePart) -> Self {
        Self { parts: vec![part] }
    }
}

impl MessageStructure {
    /// Parse the transport's JSON rendering of a structure (`null` allowed)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// All leaves in depth-first order
    #[must_use]
    pub fn leaves(&self) -> Vec<&MimePart> {
        let mut out = Vec::new();
        collect_leaves(&self.parts, &mut out);
        out
    }
}

fn collect_leaves<'a>(parts: &'a [MimePart], out: &mut Vec<&'a MimePart>) {
    for part in parts {
        if part.is_leaf() {
            out.push(part);
        } else {
            collect_leaves(&part.children, out);
        }
    }
}
