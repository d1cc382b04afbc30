//! Turning an npm-ls tree into a BOM.
//!
//! The [`BomBuilder`] drives the pipeline: the [`TreeWalker`] visits every
//! node once per install path and asks the [`Synthesizer`] for a component,
//! then components are nested by install path (see [`PathTree`]) or
//! flattened, and the document metadata is attached.

mod builder;
pub mod nest;
mod synth;
mod walker;

pub use builder::BomBuilder;
pub use nest::PathTree;
pub use synth::{sha512_hex, Synthesis, Synthesizer};
pub use walker::{AllComponents, DependencyEdges, TreeWalker};
