use super::Component;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The tool that produced a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub timestamp: Option<DateTime<Utc>>,
    pub tools: Vec<Tool>,
    pub component: Option<Component>,
}

/// Direct dependencies of one component, by bom-ref.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub bom_ref: String,
    pub depends_on: Vec<String>,
}

/// An assembled inventory, ready to be serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bom {
    pub serial_number: Option<String>,
    pub metadata: Metadata,
    pub components: Vec<Component>,
    pub dependencies: Vec<Dependency>,
}

impl Bom {
    /// All components in the document, depth first, excluding the root.
    pub fn all_components(&self) -> Vec<&Component> {
        fn collect<'a>(components: &'a [Component], out: &mut Vec<&'a Component>) {
            for c in components {
                out.push(c);
                collect(&c.components, out);
            }
        }

        let mut out = Vec::new();
        collect(&self.components, &mut out);
        out
    }

    pub fn find_component(&self, bom_ref: &str) -> Option<&Component> {
        self.all_components().into_iter().find(|c| c.bom_ref == bom_ref)
    }

    pub fn dependencies_of(&self, bom_ref: &str) -> Option<&[String]> {
        self.dependencies
            .iter()
            .find(|d| d.bom_ref == bom_ref)
            .map(|d| d.depends_on.as_slice())
    }
}
