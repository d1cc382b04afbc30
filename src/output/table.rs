use crate::model::{property_names, Bom, Component};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Purl")]
    purl: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// Render the component tree as a table, nested components indented.
pub fn generate_table_string(bom: &Bom) -> String {
    let mut out = String::new();

    if let Some(root) = &bom.metadata.component {
        out.push_str(&format!("Project: {}\n\n", display_name(root)));
    }

    let mut rows = Vec::new();
    collect_rows(&bom.components, 0, &mut rows);

    if rows.is_empty() {
        out.push_str("No components found.\n");
        return out;
    }

    out.push_str(&format!("Found {} components:\n\n", rows.len()));
    out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    out.push('\n');
    out
}

pub fn print_table(bom: &Bom) -> Result<()> {
    print!("{}", generate_table_string(bom));
    Ok(())
}

fn collect_rows(components: &[Component], depth: usize, rows: &mut Vec<ComponentRow>) {
    for component in components {
        rows.push(ComponentRow {
            name: format!("{}{}", "  ".repeat(depth), display_name(component)),
            version: component.version.clone().unwrap_or_else(|| "-".to_string()),
            purl: truncate(component.purl.as_deref().unwrap_or("-"), 60),
            path: component
                .property(property_names::PACKAGE_INSTALL_PATH)
                .unwrap_or("-")
                .to_string(),
        });
        collect_rows(&component.components, depth + 1, rows);
    }
}

fn display_name(component: &Component) -> String {
    match &component.group {
        Some(group) => format!("{}/{}", group, component.name),
        None => component.name.clone(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
