//! Invoking `npm ls` and reading its dependency tree.
//!
//! [`NpmRunner`] is the seam around the external process; [`CommandRunner`]
//! runs the real npm, tests substitute scripted runners.

mod fetch;
mod runner;

pub use fetch::{fetch_npm_ls, npm_ls_args};
pub use runner::{CommandRunner, NpmRunner, RunFailure};
