use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// A failed `npm` invocation.
///
/// npm-ls often exits non-zero while still printing a usable tree, so the
/// captured stdout is kept apart from stderr.
#[derive(Error, Debug, Default, Clone)]
#[error("{message}")]
pub struct RunFailure {
    pub message: String,
    pub status: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs npm with the given arguments and returns its raw stdout.
pub trait NpmRunner {
    fn run(&self, args: &[String], cwd: &Path) -> Result<Vec<u8>, RunFailure>;
}

/// Runs the real npm executable, inheriting the process environment.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Picks the npm to run.
    ///
    /// An explicit command wins; otherwise `npm_execpath` (set when running
    /// under an npm script) is used, falling back to `npm` on the `PATH`.
    pub fn detect(explicit: Option<&str>) -> Self {
        if let Some(command) = explicit.filter(|c| !c.is_empty()) {
            return Self::new(command);
        }

        match std::env::var("npm_execpath") {
            Ok(execpath) if !execpath.is_empty() => Self::from_execpath(&execpath)
                .unwrap_or_else(|| {
                    tracing::debug!(%execpath, "npm_execpath is not npm, ignoring it");
                    Self::new(default_npm_command())
                }),
            _ => Self::new(default_npm_command()),
        }
    }

    /// The runner for an `npm_execpath` value, or `None` when it belongs to
    /// another package manager (yarn and pnpm set it too).
    fn from_execpath(execpath: &str) -> Option<Self> {
        if !is_npm_execpath(execpath) {
            return None;
        }

        let is_script = [".js", ".cjs", ".mjs"]
            .iter()
            .any(|ext| execpath.to_lowercase().ends_with(ext));

        if is_script {
            let node = std::env::var("npm_node_execpath")
                .ok()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "node".to_string());
            Some(Self {
                program: PathBuf::from(node),
                leading_args: vec![execpath.to_string()],
            })
        } else {
            Some(Self::new(execpath))
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(default_npm_command())
    }
}

fn is_npm_execpath(execpath: &str) -> bool {
    let file_name = execpath
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    matches!(
        file_name.as_str(),
        "npm-cli.js" | "npm-cli.cjs" | "npm" | "npm.cmd" | "npm.exe"
    )
}

fn default_npm_command() -> &'static str {
    if cfg!(target_os = "windows") {
        "npm.cmd"
    } else {
        "npm"
    }
}

impl NpmRunner for CommandRunner {
    fn run(&self, args: &[String], cwd: &Path) -> Result<Vec<u8>, RunFailure> {
        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| RunFailure {
                message: format!("failed to execute {}: {}", self.program.display(), e),
                ..RunFailure::default()
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        Err(RunFailure {
            message: format!("{} exited with {}", self.program.display(), output.status),
            status: output.status.code(),
            signal: exit_signal(&output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
