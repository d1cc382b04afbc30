use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys under which npm-ls reports the same fact.
///
/// npm v6 hides several properties behind a leading `_`; newer versions
/// report them without it. Lookups take the first key that is present
/// and not `null`.
pub mod keys {
    pub const NAME: &[&str] = &["name"];
    pub const VERSION: &[&str] = &["version"];
    pub const PATH: &[&str] = &["path"];
    pub const ID: &[&str] = &["_id"];
    pub const DEV: &[&str] = &["dev", "_development"];
    pub const OPTIONAL: &[&str] = &["optional", "_optional"];
    pub const PEER: &[&str] = &["peer", "_peer"];
    pub const EXTRANEOUS: &[&str] = &["extraneous"];
    pub const PRIVATE: &[&str] = &["private"];
    pub const BUNDLED: &[&str] = &["inBundle", "_inBundle"];
    pub const RESOLVED: &[&str] = &["resolved", "_resolved"];
    pub const INTEGRITY: &[&str] = &["integrity", "_integrity"];
}

/// One package record from `npm ls --json --long`.
///
/// The record is kept as loose JSON so that an optional field of an
/// unexpected type reads as absent instead of failing the whole parse.
/// Entries of `dependencies` that are not objects are dropped.
#[derive(Debug, Clone, Default)]
pub struct RawNode {
    dependencies: BTreeMap<String, RawNode>,
    fields: Map<String, Value>,
}

/// A node whose children are still being converted.
struct PendingNode {
    name: String,
    fields: Map<String, Value>,
    unvisited: serde_json::map::IntoIter,
    children: BTreeMap<String, RawNode>,
}

impl PendingNode {
    fn open(name: String, value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        let unvisited = match fields.remove("dependencies") {
            Some(Value::Object(dependencies)) => dependencies.into_iter(),
            _ => Map::new().into_iter(),
        };
        Some(Self {
            name,
            fields,
            unvisited,
            children: BTreeMap::new(),
        })
    }

    fn close(self) -> (String, RawNode) {
        let node = RawNode {
            dependencies: self.children,
            fields: self.fields,
        };
        (self.name, node)
    }
}

impl RawNode {
    /// Parses npm-ls output, however deeply the tree is nested.
    ///
    /// The top level must be a JSON object.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        deserializer.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;

        if !value.is_object() {
            return Err(serde_json::Error::custom("npm-ls output is not a JSON object"));
        }
        Ok(Self::from(value))
    }

    /// Returns the value of the first key that is present and not `null`.
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .find(|value| !value.is_null())
    }

    /// True only when the first present value is the boolean `true`.
    pub fn flag(&self, keys: &[&str]) -> bool {
        matches!(self.first_present(keys), Some(Value::Bool(true)))
    }

    /// The first present value, if it is a string.
    pub fn text(&self, keys: &[&str]) -> Option<&str> {
        self.first_present(keys).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    pub fn name(&self) -> Option<&str> {
        self.text(keys::NAME)
    }

    pub fn version(&self) -> Option<&str> {
        self.text(keys::VERSION)
    }

    pub fn path(&self) -> Option<&str> {
        self.text(keys::PATH)
    }

    pub fn id(&self) -> Option<&str> {
        self.text(keys::ID)
    }

    /// Direct children keyed by dependency name, in name order.
    pub fn dependencies(&self) -> &BTreeMap<String, RawNode> {
        &self.dependencies
    }
}

impl From<Value> for RawNode {
    /// Converts without recursion, so tree depth is bounded by memory only.
    /// A value that is not an object becomes an empty node.
    fn from(value: Value) -> Self {
        let Some(root) = PendingNode::open(String::new(), value) else {
            return Self::default();
        };

        let mut stack = vec![root];
        while let Some(top) = stack.last_mut() {
            if let Some((name, child)) = top.unvisited.next() {
                if let Some(child) = PendingNode::open(name, child) {
                    stack.push(child);
                }
                continue;
            }

            let Some(finished) = stack.pop() else {
                break;
            };
            let (name, node) = finished.close();
            match stack.last_mut() {
                Some(parent) => {
                    parent.children.insert(name, node);
                }
                None => return node,
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_present_prefers_modern_key() {
        let node = RawNode::from(json!({ "dev": false, "_development": true }));
        assert!(!node.flag(keys::DEV));
    }

    #[test]
    fn test_first_present_falls_back_to_legacy_key() {
        let node = RawNode::from(json!({ "_development": true }));
        assert!(node.flag(keys::DEV));

        let node = RawNode::from(json!({ "dev": null, "_resolved": "https://x/y.tgz" }));
        assert_eq!(node.text(keys::RESOLVED), Some("https://x/y.tgz"));
    }

    #[test]
    fn test_flag_requires_literal_true() {
        let node = RawNode::from(json!({ "extraneous": "true", "private": 1 }));
        assert!(!node.flag(keys::EXTRANEOUS));
        assert!(!node.flag(keys::PRIVATE));
    }

    #[test]
    fn test_wrongly_typed_fields_read_as_absent() {
        let node = RawNode::from(json!({ "name": 42, "version": ["1.0.0"], "path": "/p" }));
        assert_eq!(node.name(), None);
        assert_eq!(node.version(), None);
        assert_eq!(node.path(), Some("/p"));
    }

    #[test]
    fn test_dependencies_are_parsed_recursively() {
        let node = RawNode::from(json!({
            "name": "root",
            "dependencies": {
                "b": { "name": "b", "dependencies": { "c": { "name": "c" } } },
                "a": { "name": "a" },
                "broken": "not-an-object"
            }
        }));

        let names: Vec<_> = node.dependencies().keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            node.dependencies()["b"].dependencies()["c"].name(),
            Some("c")
        );
    }

    #[test]
    fn test_non_object_dependencies_are_ignored() {
        let node = RawNode::from(json!({ "name": "root", "dependencies": [1, 2] }));
        assert!(node.dependencies().is_empty());
        assert!(node.get("dependencies").is_none());
    }

    fn chain(depth: usize) -> String {
        let mut json = String::from("{}");
        for level in (0..depth).rev() {
            json = format!(
                r#"{{"name":"d{level}","path":"/p/node_modules/d{level}","dependencies":{{"next":{json}}}}}"#
            );
        }
        json
    }

    #[test]
    fn test_from_slice_accepts_deep_trees() {
        let node = RawNode::from_slice(chain(300).as_bytes()).unwrap();

        let mut depth = 0;
        let mut current = &node;
        while let Some(next) = current.dependencies().get("next") {
            current = next;
            depth += 1;
        }
        assert_eq!(depth, 300);
    }

    #[test]
    fn test_from_slice_rejects_non_objects() {
        assert!(RawNode::from_slice(b"[1, 2]").is_err());
        assert!(RawNode::from_slice(b"npm WARN config").is_err());
        assert!(RawNode::from_slice(b"{} trailing").is_err());
        assert!(RawNode::from_slice(b"").is_err());
    }
}
