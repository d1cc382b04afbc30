//! CycloneDX SBOM (Software Bill of Materials) output format.
//!
//! Generates a CycloneDX 1.5 JSON document.
//! See: https://cyclonedx.org/

use crate::model::{Bom, Component, Tool};
use anyhow::Result;
use serde::Serialize;

/// CycloneDX SBOM root document
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom<'a> {
    bom_format: &'static str,
    spec_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    serial_number: Option<&'a str>,
    version: u32,
    metadata: CycloneDxMetadata<'a>,
    components: Vec<CycloneDxComponent<'a>>,
    dependencies: Vec<CycloneDxDependency<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<&'a Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<CycloneDxComponent<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxComponent<'a> {
    #[serde(rename = "type")]
    component_type: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<CycloneDxLicense<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<CycloneDxHash<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<CycloneDxExternalRef<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<CycloneDxProperty<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<CycloneDxComponent<'a>>,
}

#[derive(Serialize)]
struct CycloneDxLicense<'a> {
    license: CycloneDxLicenseChoice<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CycloneDxLicenseChoice<'a> {
    Id { id: &'a str },
    Name { name: &'a str },
}

#[derive(Serialize)]
struct CycloneDxHash<'a> {
    alg: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CycloneDxExternalRef<'a> {
    #[serde(rename = "type")]
    ref_type: &'static str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Serialize)]
struct CycloneDxProperty<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxDependency<'a> {
    #[serde(rename = "ref")]
    dependency_ref: &'a str,
    depends_on: Vec<&'a str>,
}

fn convert_component(component: &Component) -> CycloneDxComponent<'_> {
    let licenses = component
        .license
        .as_deref()
        .map(|license| {
            // free text such as "SEE LICENSE IN ..." is no SPDX id
            let choice = if license.contains(char::is_whitespace) {
                CycloneDxLicenseChoice::Name { name: license }
            } else {
                CycloneDxLicenseChoice::Id { id: license }
            };
            vec![CycloneDxLicense { license: choice }]
        })
        .unwrap_or_default();

    CycloneDxComponent {
        component_type: component.component_type.as_str(),
        bom_ref: &component.bom_ref,
        group: component.group.as_deref(),
        name: &component.name,
        version: component.version.as_deref(),
        author: component.author.as_deref(),
        description: component.description.as_deref(),
        licenses,
        purl: component.purl.as_deref(),
        hashes: component
            .hashes
            .iter()
            .map(|(alg, content)| CycloneDxHash {
                alg: alg.as_str(),
                content,
            })
            .collect(),
        external_references: component
            .external_references
            .iter()
            .map(|r| CycloneDxExternalRef {
                ref_type: r.ref_type.as_str(),
                url: &r.url,
                comment: r.comment.as_deref(),
            })
            .collect(),
        properties: component
            .properties
            .iter()
            .map(|p| CycloneDxProperty {
                name: &p.name,
                value: &p.value,
            })
            .collect(),
        components: component.components.iter().map(convert_component).collect(),
    }
}

fn convert(bom: &Bom) -> CycloneDxBom<'_> {
    CycloneDxBom {
        bom_format: "CycloneDX",
        spec_version: "1.5",
        serial_number: bom.serial_number.as_deref(),
        version: 1,
        metadata: CycloneDxMetadata {
            timestamp: bom.metadata.timestamp.map(|t| t.to_rfc3339()),
            tools: bom.metadata.tools.iter().collect(),
            component: bom.metadata.component.as_ref().map(convert_component),
        },
        components: bom.components.iter().map(convert_component).collect(),
        dependencies: bom
            .dependencies
            .iter()
            .map(|d| CycloneDxDependency {
                dependency_ref: &d.bom_ref,
                depends_on: d.depends_on.iter().map(String::as_str).collect(),
            })
            .collect(),
    }
}

/// Generate CycloneDX JSON as a string
pub fn generate_cyclonedx_string(bom: &Bom) -> Result<String> {
    Ok(serde_json::to_string_pretty(&convert(bom))?)
}

/// Generate and print CycloneDX JSON output
pub fn print_cyclonedx(bom: &Bom) -> Result<()> {
    println!("{}", generate_cyclonedx_string(bom)?);
    Ok(())
}
