//! Core data types for npm records, components and assembled BOMs.
//!
//! - [`RawNode`] - One record of the `npm ls` tree
//! - [`Component`] - A synthesized inventory entry
//! - [`Bom`] - The assembled document
//!
//! # Example
//!
//! ```
//! use npm_sbom::model::{Component, ComponentType};
//!
//! let component = Component::new(ComponentType::Library, "core")
//!     .with_group("@babel")
//!     .with_version("7.24.0");
//!
//! assert_eq!(component.identity(), "@babel/core@7.24.0");
//! ```

mod bom;
mod component;
pub mod raw;

pub use bom::*;
pub use component::*;
pub use raw::RawNode;
