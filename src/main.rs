use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use npm_sbom::{
    config::{Config, OmittableDependencyType},
    model::ComponentType,
    npm::CommandRunner,
    output::{format_bom, print_bom, OutputFormat},
    BomBuilder,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "npm-sbom")]
#[command(
    author,
    version,
    about = "Create a CycloneDX SBOM from the installed dependency tree of an npm project"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a BOM for a project
    Build(BuildArgs),

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Project directory containing package.json
    #[arg(default_value = ".")]
    project_dir: PathBuf,

    /// Continue with partial output when npm-ls exits with errors
    #[arg(long)]
    ignore_npm_errors: bool,

    /// Read the dependency tree from the lock file only
    #[arg(long)]
    package_lock_only: bool,

    /// Dependency type to leave out (dev, optional, peer); repeatable
    #[arg(long, value_name = "TYPE")]
    omit: Vec<OmittableDependencyType>,

    /// List all components at the top level instead of nesting them
    #[arg(long)]
    flatten_components: bool,

    /// Drop qualifiers and subpath from purls
    #[arg(long)]
    short_purls: bool,

    /// Component type of the root component
    #[arg(long, value_name = "TYPE")]
    mc_type: Option<ComponentType>,

    /// Leave out timestamp and serial number
    #[arg(long)]
    output_reproducible: bool,

    /// Output format (json, table)
    #[arg(long)]
    output_format: Option<OutputFormat>,

    /// Write output to file, `-` for stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    output_file: Option<String>,

    /// npm executable to run
    #[arg(long, value_name = "COMMAND")]
    npm: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Build(args) => {
            let config = Config::load()?;
            run_build(args, config)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_build(args: BuildArgs, config: Config) -> Result<u8> {
    let mut options = config.to_options();
    options.ignore_npm_errors |= args.ignore_npm_errors;
    options.package_lock_only |= args.package_lock_only;
    options.omit_dependency_types.extend(args.omit);
    options.flatten_components |= args.flatten_components;
    options.short_purls |= args.short_purls;
    options.reproducible |= args.output_reproducible;
    if let Some(mc_type) = args.mc_type {
        options.meta_component_type = mc_type;
    }

    let format = match args.output_format {
        Some(format) => format,
        None => config
            .output_format
            .parse::<OutputFormat>()
            .map_err(anyhow::Error::msg)
            .context("Invalid output_format in config file")?,
    };

    let npm_command = args.npm.or(config.npm_command);
    let runner = CommandRunner::detect(npm_command.as_deref());
    tracing::debug!(npm = %runner.program().display(), "using npm");

    let project_dir = args
        .project_dir
        .canonicalize()
        .with_context(|| format!("Project directory not found: {}", args.project_dir.display()))?;

    let builder = BomBuilder::new(options).with_runner(runner);
    let bom = builder
        .build_from_project_dir(&project_dir)
        .context("Failed to build BOM")?;

    match args.output_file.as_deref() {
        None | Some("-") => print_bom(&bom, format)?,
        Some(path) => {
            let content = format_bom(&bom, format)?;
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output file {}", path))?;
            tracing::info!(path = %path, "wrote BOM");
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'npm-sbom config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
