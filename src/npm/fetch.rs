use std::path::Path;

use crate::config::BomBuilderOptions;
use crate::error::{BuildError, Result};
use crate::model::RawNode;

use super::NpmRunner;

/// npm treats this as "no depth limit".
const UNBOUNDED_DEPTH: &str = "9007199254740991";

/// Arguments for a full, long-format JSON listing of the installed tree.
pub fn npm_ls_args(options: &BomBuilderOptions) -> Vec<String> {
    let mut args: Vec<String> = ["ls", "--json", "--long", "--depth", UNBOUNDED_DEPTH]
        .iter()
        .map(|s| s.to_string())
        .collect();

    if options.package_lock_only {
        args.push("--package-lock-only".to_string());
    }

    for omit in &options.omit_dependency_types {
        args.push(format!("--omit={}", omit.as_str()));
    }

    args
}

/// Runs `npm ls` in `project_dir` and parses the resulting tree.
///
/// A failed invocation aborts unless `ignore_npm_errors` is set, in which
/// case whatever npm printed to stdout is parsed instead. Unparsable output
/// is always fatal.
pub fn fetch_npm_ls(
    runner: &dyn NpmRunner,
    project_dir: &Path,
    options: &BomBuilderOptions,
) -> Result<RawNode> {
    let args = npm_ls_args(options);

    tracing::info!("gather dependency tree ...");
    tracing::debug!(?args, project_dir = %project_dir.display(), "npm-ls: run npm");

    let stdout = match runner.run(&args, project_dir) {
        Ok(stdout) => stdout,
        Err(failure) => {
            tracing::warn!(message = %failure.message, "npm-ls: MESSAGE");
            tracing::error!(
                stderr = %String::from_utf8_lossy(&failure.stderr),
                "npm-ls: STDERR"
            );

            if !options.ignore_npm_errors {
                return Err(BuildError::npm_ls(failure));
            }

            tracing::debug!("npm-ls exited with errors that are to be ignored");
            failure.stdout
        }
    };

    RawNode::from_slice(&stdout).map_err(|source| BuildError::Parse { source })
}
