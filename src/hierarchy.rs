//! HTML to a nested object that mirrors element nesting

use scraper::{ElementRef, Html, Node};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::dom::{collapse_whitespace, flat_text, is_skipped, is_transparent, is_void, table_rows};

/// Key under which loose text of a mixed-content element is stored
pub const TEXT_KEY: &str = "tag-data";

/// Key under which extracted tables are stored
pub const TABLE_KEY: &str = "table";

/// Value stored under one key of a [`HierarchicalNode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Text(String),
    Node(HierarchicalNode),
    /// Rows of cell text
    Table(Vec<Vec<String>>),
    /// Repeated sibling tags, in document order
    List(Vec<NodeValue>),
}

impl NodeValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_node(&self) -> Option<&HierarchicalNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl Serialize for NodeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Node(node) => node.serialize(serializer),
            Self::Table(rows) => rows.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Ordered mapping from tag name to value, unique keys per level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchicalNode {
    entries: Vec<(String, NodeValue)>,
}

impl HierarchicalNode {
    /// Insert under `key`; a repeated key turns the slot into a list
    pub fn insert(&mut self, key: &str, value: NodeValue) {
        let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) else {
            self.entries.push((key.to_string(), value));
            return;
        };

        match &mut slot.1 {
            NodeValue::List(items) => items.push(value),
            existing => {
                let first = std::mem::replace(existing, NodeValue::List(Vec::new()));
                *existing = NodeValue::List(vec![first, value]);
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop a lone wrapper key whose value is an object
    fn unwrap_single(mut self) -> Self {
        if self.entries.len() == 1 && matches!(self.entries[0].1, NodeValue::Node(_)) {
            if let Some((_, NodeValue::Node(inner))) = self.entries.pop() {
                return inner;
            }
        }
        self
    }
}

impl Serialize for HierarchicalNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Convert an HTML document into a [`HierarchicalNode`].
///
/// Layout wrappers with a single meaningful child collapse into that
/// child, tables become row arrays under `"table"`, and loose text beside
/// elements is kept under `"tag-data"`. Empty or unparseable input gives
/// an empty node.
#[must_use]
pub fn to_hierarchical_json(html: &str) -> HierarchicalNode {
    if html.trim().is_empty() {
        return HierarchicalNode::default();
    }

    let document = Html::parse_document(html);
    let mut root = HierarchicalNode::default();
    reduce_children(document.root_element(), &mut root);
    root.unwrap_single()
}

fn reduce_children(element: ElementRef, node: &mut HierarchicalNode) {
    let mut pending = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => pending.push_str(text),
            Node::Element(data) => {
                let name = data.name();
                if is_skipped(name) {
                    continue;
                }
                if is_void(name) {
                    pending.push(' ');
                    continue;
                }
                flush_text(&mut pending, node);
                if let Some(child_el) = ElementRef::wrap(child) {
                    insert_element(child_el, node);
                }
            }
            _ => {}
        }
    }

    flush_text(&mut pending, node);
}

fn flush_text(pending: &mut String, node: &mut HierarchicalNode) {
    let text = collapse_whitespace(pending);
    if !text.is_empty() {
        node.insert(TEXT_KEY, NodeValue::Text(text));
    }
    pending.clear();
}

fn insert_element(element: ElementRef, node: &mut HierarchicalNode) {
    let target = collapse_wrappers(element);
    let name = target.value().name();

    if name == "table" {
        let rows = table_rows(target);
        if !rows.is_empty() {
            node.insert(TABLE_KEY, NodeValue::Table(rows));
        }
        return;
    }

    if is_transparent(name) {
        reduce_children(target, node);
        return;
    }

    if !has_element_children(target) {
        let text = flat_text(target);
        if !text.is_empty() {
            node.insert(name, NodeValue::Text(text));
        }
        return;
    }

    let mut inner = HierarchicalNode::default();
    reduce_children(target, &mut inner);
    if !inner.is_empty() {
        node.insert(name, NodeValue::Node(inner));
    }
}

/// Follow single-meaningful-child chains down to the innermost element
fn collapse_wrappers(element: ElementRef) -> ElementRef {
    let mut current = element;
    loop {
        let name = current.value().name();
        if name == "table" || is_transparent(name) {
            return current;
        }
        match only_meaningful_child(current) {
            Some(child) => current = child,
            None => return current,
        }
    }
}

fn only_meaningful_child(element: ElementRef) -> Option<ElementRef> {
    let mut found = None;
    let mut count = 0;

    for child in element.children() {
        match child.value() {
            Node::Text(text) if !text.trim().is_empty() => count += 1,
            Node::Element(data) if is_meaningful_tag(data.name()) => {
                count += 1;
                found = ElementRef::wrap(child);
            }
            _ => {}
        }
        if count > 1 {
            return None;
        }
    }

    found
}

fn has_element_children(element: ElementRef) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| is_meaningful_tag(child.value().name()))
}

fn is_meaningful_tag(name: &str) -> bool {
    !is_skipped(name) && !is_void(name)
}
