use crate::model::Tool;

use super::ToolBuilder;

/// The package metadata a tool record is made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub authors: String,
}

impl PackageDescriptor {
    /// Describes this very binary, from its own Cargo manifest.
    pub fn this_tool() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            authors: env!("CARGO_PKG_AUTHORS").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorToolBuilder;

impl ToolBuilder for DescriptorToolBuilder {
    fn make_tool(&self, descriptor: &PackageDescriptor) -> Option<Tool> {
        if descriptor.name.is_empty() {
            return None;
        }

        // Cargo joins multiple authors with ':'
        let vendor = descriptor
            .authors
            .split(':')
            .map(str::trim)
            .find(|a| !a.is_empty())
            .map(str::to_string);

        Some(Tool {
            vendor,
            name: descriptor.name.clone(),
            version: Some(descriptor.version.clone()).filter(|v| !v.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_this_tool() {
        let tool = DescriptorToolBuilder
            .make_tool(&PackageDescriptor::this_tool())
            .unwrap();
        assert_eq!(tool.name, "npm-sbom");
        assert_eq!(tool.version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_first_author_is_vendor() {
        let descriptor = PackageDescriptor {
            name: "x".to_string(),
            version: String::new(),
            authors: "Jane Doe <jane@example.com>:John".to_string(),
        };
        let tool = DescriptorToolBuilder.make_tool(&descriptor).unwrap();
        assert_eq!(tool.vendor.as_deref(), Some("Jane Doe <jane@example.com>"));
        assert_eq!(tool.version, None);
    }

    #[test]
    fn test_nameless_descriptor_has_no_tool() {
        let descriptor = PackageDescriptor {
            name: String::new(),
            version: "1.0.0".to_string(),
            authors: String::new(),
        };
        assert!(DescriptorToolBuilder.make_tool(&descriptor).is_none());
    }
}
