//! Builders for the parts of a BOM that are not specific to the npm tree
//! walk: core component identity, package URLs and the tool record.
//!
//! Each is a trait so the BOM builder can be driven with alternative
//! implementations.
//!
//! | Trait | Default implementation |
//! |-------|------------------------|
//! | [`ComponentBuilder`] | [`PackageJsonComponentBuilder`] |
//! | [`PurlFactory`] | [`NpmPurlFactory`] |
//! | [`ToolBuilder`] | [`DescriptorToolBuilder`] |

mod component;
mod purl;
mod tool;

pub use component::PackageJsonComponentBuilder;
pub use purl::{qualifier_names, shorten, NpmPurlFactory};
pub use tool::{DescriptorToolBuilder, PackageDescriptor};

use crate::model::{Component, ComponentType, RawNode, Tool};
use packageurl::PackageUrl;

/// Builds the core identity of a component from a raw record.
pub trait ComponentBuilder {
    /// Returns `None` when the record lacks the fields a component needs.
    fn make_component(&self, node: &RawNode, component_type: ComponentType) -> Option<Component>;
}

pub trait PurlFactory {
    /// With `sort`, qualifiers are added in key order.
    fn make_from_component(&self, component: &Component, sort: bool)
        -> Option<PackageUrl<'static>>;
}

pub trait ToolBuilder {
    fn make_tool(&self, descriptor: &PackageDescriptor) -> Option<Tool>;
}
