//! # npm-sbom
//!
//! Build CycloneDX SBOMs from the installed dependency tree of an npm
//! project.
//!
//! `npm ls --json --long` is run in the project directory and its output
//! is compiled into a deduplicated component graph: one component per
//! install path, enriched with purls, hashes and external references,
//! nested by install path and connected by a dependency graph.
//!
//! ## Example
//!
//! ```no_run
//! use npm_sbom::{output::generate_cyclonedx_string, BomBuilder, BomBuilderOptions};
//! use std::path::Path;
//!
//! let options = BomBuilderOptions {
//!     reproducible: true,
//!     ..BomBuilderOptions::default()
//! };
//! let bom = BomBuilder::new(options).build_from_project_dir(Path::new("."))?;
//! println!("{}", generate_cyclonedx_string(&bom)?);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bom;
pub mod builders;
pub mod config;
pub mod error;
pub mod model;
pub mod npm;
pub mod output;

pub use bom::BomBuilder;
pub use config::{BomBuilderOptions, Config};
pub use error::BuildError;
pub use model::{Bom, Component};
