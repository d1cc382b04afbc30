use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;

use crate::builders::{shorten, ComponentBuilder, PurlFactory};
use crate::config::{BomBuilderOptions, OmittableDependencyType};
use crate::model::raw::keys;
use crate::model::{
    property_names, Component, ComponentType, ExternalReference, ExternalReferenceType,
    HashAlgorithm, RawNode, PROPERTY_VALUE_TRUE,
};

/// `resolved` values that do not point at a distribution.
static RESOLVED_IGNORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:file|link):").expect("static regex"));

/// A base64 SHA-512 digest as npm writes it into `integrity`.
static SHA512_BASE64: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sha512-([A-Za-z0-9+/]{86}==)$").expect("static regex")
});

/// Outcome of turning one raw node into a component.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    Built(Component),
    /// Excluded by the configured dependency-type omissions.
    Omitted,
    /// The record lacks the fields needed for a component.
    Unbuildable,
}

/// Turns raw npm-ls records into enriched components.
pub struct Synthesizer<'a> {
    component_builder: &'a dyn ComponentBuilder,
    purl_factory: &'a dyn PurlFactory,
    options: &'a BomBuilderOptions,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        component_builder: &'a dyn ComponentBuilder,
        purl_factory: &'a dyn PurlFactory,
        options: &'a BomBuilderOptions,
    ) -> Self {
        Self {
            component_builder,
            purl_factory,
            options,
        }
    }

    pub fn synthesize(&self, node: &RawNode, component_type: ComponentType) -> Synthesis {
        let is_dev = node.flag(keys::DEV);
        if let Some(omitted) = self.omitted_type(node, is_dev) {
            tracing::debug!(
                name = ?node.name(),
                id = ?node.id(),
                dependency_type = omitted.as_str(),
                "omit component"
            );
            return Synthesis::Omitted;
        }

        let Some(mut component) = self.component_builder.make_component(node, component_type)
        else {
            tracing::debug!(name = ?node.name(), id = ?node.id(), "skip broken component");
            return Synthesis::Unbuildable;
        };

        if let Some(path) = node.path() {
            component.add_property(property_names::PACKAGE_INSTALL_PATH, path);
        }

        let flags = [
            (is_dev, property_names::PACKAGE_DEVELOPMENT),
            (node.flag(keys::EXTRANEOUS), property_names::PACKAGE_EXTRANEOUS),
            (node.flag(keys::PRIVATE), property_names::PACKAGE_PRIVATE),
            (node.flag(keys::BUNDLED), property_names::PACKAGE_BUNDLED),
        ];
        for (set, name) in flags {
            if set {
                component.add_property(name, PROPERTY_VALUE_TRUE);
            }
        }

        if let Some(resolved) = node.text(keys::RESOLVED) {
            if !RESOLVED_IGNORE.is_match(resolved) {
                component.add_external_reference(
                    ExternalReference::new(resolved, ExternalReferenceType::Distribution)
                        .with_comment("as detected from npm-ls property \"resolved\""),
                );
            }
        }

        if let Some(digest) = node.text(keys::INTEGRITY).and_then(sha512_hex) {
            component.hashes.insert(HashAlgorithm::Sha512, digest);
        }

        component.purl = self.make_purl(&component);

        component.bom_ref = node
            .id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| component.identity());

        Synthesis::Built(component)
    }

    fn omitted_type(&self, node: &RawNode, is_dev: bool) -> Option<OmittableDependencyType> {
        let checks = [
            (OmittableDependencyType::Dev, is_dev),
            (OmittableDependencyType::Optional, node.flag(keys::OPTIONAL)),
            (OmittableDependencyType::Peer, node.flag(keys::PEER)),
        ];
        checks
            .into_iter()
            .find(|(ty, set)| *set && self.options.omits(*ty))
            .map(|(ty, _)| ty)
    }

    fn make_purl(&self, component: &Component) -> Option<String> {
        let purl = self
            .purl_factory
            .make_from_component(component, self.options.reproducible)?;
        if self.options.short_purls {
            return shorten(&purl).map(|p| p.to_string());
        }
        Some(purl.to_string())
    }
}

/// Hex SHA-512 from an SRI string; other algorithms yield `None`.
///
/// An integrity value may list several whitespace separated digests.
pub fn sha512_hex(integrity: &str) -> Option<String> {
    integrity.split_whitespace().find_map(|token| {
        let captures = SHA512_BASE64.captures(token)?;
        let bytes = STANDARD.decode(&captures[1]).ok()?;
        Some(hex::encode(bytes))
    })
}
