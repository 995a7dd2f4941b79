#![deny(missing_docs)]

//! # Document Normalization
//!
//! Final passes run once every route has been written: the root tag list,
//! `x-tagGroups`, and ordering `paths` by tag so related operations sit
//! together in rendered documentation.

use crate::oas::registry::JsonMap;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Tags seen on documented routes and how they nest.
#[derive(Debug, Default)]
pub struct TagTree {
    descriptions: BTreeMap<String, Option<String>>,
    children: BTreeMap<String, BTreeSet<String>>,
    has_parent: HashSet<String>,
    terminal: HashSet<String>,
}

impl TagTree {
    /// Records the tag chain of one route, outermost first.
    pub fn record(&mut self, chain: &[(String, Option<String>)]) {
        for (name, description) in chain {
            let entry = self.descriptions.entry(name.clone()).or_insert(None);
            if entry.is_none() {
                *entry = description.clone();
            }
        }
        for pair in chain.windows(2) {
            let (parent, child) = (&pair[0].0, &pair[1].0);
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(child.clone());
            self.has_parent.insert(child.clone());
        }
        if let Some((last, _)) = chain.last() {
            self.terminal.insert(last.clone());
        }
    }

    /// Root `tags`, sorted by name.
    pub fn tags_value(&self) -> Vec<Value> {
        self.descriptions
            .iter()
            .map(|(name, description)| {
                let mut tag = JsonMap::new();
                tag.insert("name".to_string(), json!(name));
                if let Some(desc) = description {
                    tag.insert("description".to_string(), json!(desc));
                }
                Value::Object(tag)
            })
            .collect()
    }

    /// `x-tagGroups`, sorted by name.
    ///
    /// Every tag with children owns a group of those children, plus itself
    /// when routes also use it directly. A tag with neither parent nor
    /// children gets a group of its own.
    pub fn tag_groups_value(&self) -> Vec<Value> {
        let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (parent, children) in &self.children {
            let group = groups.entry(parent.as_str()).or_default();
            group.extend(children.iter().map(String::as_str));
            if self.terminal.contains(parent) {
                group.insert(parent.as_str());
            }
        }
        for name in self.descriptions.keys() {
            if !self.has_parent.contains(name) && !self.children.contains_key(name) {
                groups.entry(name.as_str()).or_default().insert(name.as_str());
            }
        }

        groups
            .into_iter()
            .map(|(name, tags)| json!({ "name": name, "tags": tags }))
            .collect()
    }
}

/// Stable-sorts path items by the first tag of their first operation.
pub fn sort_paths_by_tag(paths: JsonMap) -> JsonMap {
    let mut entries: Vec<(String, Value)> = paths.into_iter().collect();
    entries.sort_by(|(_, a), (_, b)| first_tag(a).cmp(first_tag(b)));
    entries.into_iter().collect()
}

fn first_tag(path_item: &Value) -> &str {
    path_item
        .as_object()
        .and_then(|ops| ops.values().next())
        .and_then(|op| op.get("tags"))
        .and_then(|tags| tags.get(0))
        .and_then(Value::as_str)
        .unwrap_or_default()
}
