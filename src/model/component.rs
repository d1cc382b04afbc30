use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Property names from the CycloneDX npm taxonomy.
pub mod property_names {
    pub const PACKAGE_INSTALL_PATH: &str = "cdx:npm:package:path";
    pub const PACKAGE_DEVELOPMENT: &str = "cdx:npm:package:development";
    pub const PACKAGE_EXTRANEOUS: &str = "cdx:npm:package:extraneous";
    pub const PACKAGE_PRIVATE: &str = "cdx:npm:package:private";
    pub const PACKAGE_BUNDLED: &str = "cdx:npm:package:bundled";
}

pub const PROPERTY_VALUE_TRUE: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    #[default]
    Application,
    Library,
    Framework,
    Firmware,
    Container,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Application => "application",
            ComponentType::Library => "library",
            ComponentType::Framework => "framework",
            ComponentType::Firmware => "firmware",
            ComponentType::Container => "container",
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "application" => Ok(ComponentType::Application),
            "library" => Ok(ComponentType::Library),
            "framework" => Ok(ComponentType::Framework),
            "firmware" => Ok(ComponentType::Firmware),
            "container" => Ok(ComponentType::Container),
            _ => Err(format!(
                "Unknown component type: {}. Use 'application', 'library', 'framework', 'firmware', or 'container'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalReferenceType {
    Distribution,
    Website,
    Vcs,
    IssueTracker,
}

impl ExternalReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalReferenceType::Distribution => "distribution",
            ExternalReferenceType::Website => "website",
            ExternalReferenceType::Vcs => "vcs",
            ExternalReferenceType::IssueTracker => "issue-tracker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    pub url: String,
    #[serde(rename = "type")]
    pub ref_type: ExternalReferenceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ExternalReference {
    pub fn new(url: impl Into<String>, ref_type: ExternalReferenceType) -> Self {
        Self {
            url: url.into(),
            ref_type,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Whether a component was synthesized from npm data or stands in for one
/// that could not be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    #[default]
    Real,
    Placeholder,
}

/// A unit of inventory in the generated SBOM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub bom_ref: String,
    pub component_type: ComponentType,
    pub name: String,
    pub group: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub author: Option<String>,
    pub purl: Option<String>,
    pub properties: BTreeSet<Property>,
    pub hashes: BTreeMap<HashAlgorithm, String>,
    pub external_references: Vec<ExternalReference>,
    pub components: Vec<Component>,
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(component_type: ComponentType, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            bom_ref: name.clone(),
            component_type,
            name,
            group: None,
            version: None,
            description: None,
            license: None,
            author: None,
            purl: None,
            properties: BTreeSet::new(),
            hashes: BTreeMap::new(),
            external_references: Vec::new(),
            components: Vec::new(),
            kind: ComponentKind::Real,
        }
    }

    /// Stand-in for a component whose construction failed, so the document
    /// stays structurally complete.
    pub fn placeholder(component_type: ComponentType, name: &str) -> Self {
        let label = format!("DummyComponent.{}", name);
        let mut component = Self::new(component_type, label.clone());
        component.bom_ref = label;
        component.description = Some(format!(
            "This is a dummy component \"{}\" that fills the gap where the actual built failed.",
            name
        ));
        component.kind = ComponentKind::Placeholder;
        component
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == ComponentKind::Placeholder
    }

    pub fn add_property(&mut self, name: &str, value: impl Into<String>) {
        self.properties.insert(Property::new(name, value));
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Adds an external reference unless an identical one is already present.
    pub fn add_external_reference(&mut self, reference: ExternalReference) {
        if !self.external_references.contains(&reference) {
            self.external_references.push(reference);
        }
    }

    pub fn external_reference(&self, ref_type: ExternalReferenceType) -> Option<&ExternalReference> {
        self.external_references
            .iter()
            .find(|r| r.ref_type == ref_type)
    }

    /// The `group/name@version` identity with `-` for missing parts.
    pub fn identity(&self) -> String {
        format!(
            "{}/{}@{}",
            self.group.as_deref().filter(|g| !g.is_empty()).unwrap_or("-"),
            self.name,
            self.version.as_deref().filter(|v| !v.is_empty()).unwrap_or("-"),
        )
    }
}
