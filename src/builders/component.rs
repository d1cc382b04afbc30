use serde_json::Value;

use crate::model::{
    Component, ComponentType, ExternalReference, ExternalReferenceType, RawNode,
};

use super::ComponentBuilder;

/// Builds components from package.json-shaped records, which is what
/// `npm ls --long` emits for every package.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageJsonComponentBuilder;

impl ComponentBuilder for PackageJsonComponentBuilder {
    fn make_component(&self, node: &RawNode, component_type: ComponentType) -> Option<Component> {
        let full_name = node.name().filter(|n| !n.is_empty())?;
        let (group, name) = split_scope(full_name);
        if name.is_empty() {
            return None;
        }

        let mut component = Component::new(component_type, name);
        component.group = group.map(str::to_string);
        component.version = non_empty(node.version());
        component.description = non_empty(node.get("description").and_then(Value::as_str));
        component.license = license(node);
        component.author = author(node);

        for reference in external_references(node) {
            component.add_external_reference(reference);
        }

        Some(component)
    }
}

/// Splits `@scope/name` into its group and name.
fn split_scope(full_name: &str) -> (Option<&str>, &str) {
    if full_name.starts_with('@') {
        if let Some((scope, name)) = full_name.split_once('/') {
            return (Some(scope), name);
        }
    }
    (None, full_name)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn license(node: &RawNode) -> Option<String> {
    match node.get("license")? {
        Value::String(s) => non_empty(Some(s)),
        // legacy `{ "type": "MIT", "url": ... }`
        Value::Object(obj) => non_empty(obj.get("type").and_then(Value::as_str)),
        _ => None,
    }
}

fn author(node: &RawNode) -> Option<String> {
    match node.get("author")? {
        Value::String(s) => non_empty(Some(s)),
        Value::Object(obj) => non_empty(obj.get("name").and_then(Value::as_str)),
        _ => None,
    }
}

/// A URL given either as a plain string or as `{ "url": ... }`.
fn url_of(value: &Value) -> Option<&str> {
    let url = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str),
        _ => None,
    };
    url.filter(|url| !url.is_empty())
}

fn external_references(node: &RawNode) -> Vec<ExternalReference> {
    let sources = [
        ("homepage", ExternalReferenceType::Website),
        ("repository", ExternalReferenceType::Vcs),
        ("bugs", ExternalReferenceType::IssueTracker),
    ];

    sources
        .into_iter()
        .filter_map(|(key, ref_type)| {
            let url = node.get(key).and_then(url_of)?;
            Some(
                ExternalReference::new(url, ref_type)
                    .with_comment(format!("as detected from PackageJson property \"{}\"", key)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: Value) -> Option<Component> {
        PackageJsonComponentBuilder.make_component(&RawNode::from(value), ComponentType::Library)
    }

    #[test]
    fn test_requires_name() {
        assert!(build(json!({ "version": "1.0.0" })).is_none());
        assert!(build(json!({ "name": "" })).is_none());
        assert!(build(json!({ "name": "@scope/" })).is_none());
    }

    #[test]
    fn test_scoped_name_becomes_group() {
        let c = build(json!({ "name": "@babel/core", "version": "7.24.0" })).unwrap();
        assert_eq!(c.group.as_deref(), Some("@babel"));
        assert_eq!(c.name, "core");
        assert_eq!(c.version.as_deref(), Some("7.24.0"));
        assert_eq!(c.component_type, ComponentType::Library);
    }

    #[test]
    fn test_metadata_fields() {
        let c = build(json!({
            "name": "left-pad",
            "description": "pads left",
            "license": { "type": "WTFPL" },
            "author": { "name": "azer", "email": "azer@example.com" }
        }))
        .unwrap();

        assert_eq!(c.description.as_deref(), Some("pads left"));
        assert_eq!(c.license.as_deref(), Some("WTFPL"));
        assert_eq!(c.author.as_deref(), Some("azer"));
        assert_eq!(c.version, None);
    }

    #[test]
    fn test_external_references() {
        let c = build(json!({
            "name": "a",
            "homepage": "https://a.example",
            "repository": { "type": "git", "url": "git+https://github.com/x/a.git" },
            "bugs": { "url": "https://github.com/x/a/issues" }
        }))
        .unwrap();

        let vcs = c.external_reference(ExternalReferenceType::Vcs).unwrap();
        assert_eq!(vcs.url, "git+https://github.com/x/a.git");
        assert_eq!(
            vcs.comment.as_deref(),
            Some("as detected from PackageJson property \"repository\"")
        );
        assert!(c.external_reference(ExternalReferenceType::Website).is_some());
        assert!(c.external_reference(ExternalReferenceType::IssueTracker).is_some());
    }
}
