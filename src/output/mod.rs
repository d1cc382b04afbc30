mod cyclonedx;
mod table;

pub use cyclonedx::{generate_cyclonedx_string, print_cyclonedx};
pub use table::{generate_table_string, print_table};

use crate::model::Bom;
use anyhow::Result;

/// Output format for a built BOM
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// CycloneDX 1.5 JSON document
    #[default]
    Json,
    /// Human-readable component table
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "cyclonedx" | "cdx" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!("Unknown format: {}. Use 'json' or 'table'", s)),
        }
    }
}

pub fn print_bom(bom: &Bom, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_cyclonedx(bom),
        OutputFormat::Table => print_table(bom),
    }
}

/// Format a BOM to string for file output
pub fn format_bom(bom: &Bom, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => generate_cyclonedx_string(bom),
        OutputFormat::Table => Ok(generate_table_string(bom)),
    }
}
