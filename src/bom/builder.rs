use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use crate::builders::{
    ComponentBuilder, DescriptorToolBuilder, NpmPurlFactory, PackageDescriptor,
    PackageJsonComponentBuilder, PurlFactory, ToolBuilder,
};
use crate::config::BomBuilderOptions;
use crate::error::Result;
use crate::model::{property_names, Bom, Component, Dependency, Metadata, RawNode};
use crate::npm::{fetch_npm_ls, CommandRunner, NpmRunner};

use super::nest::{depth, detect_separator, relative_path, PathTree};
use super::synth::{Synthesis, Synthesizer};
use super::walker::{AllComponents, DependencyEdges, TreeWalker};

const ROOT_PLACEHOLDER: &str = "RootComponent";

/// Builds a BOM from the installed dependency tree of an npm project.
///
/// # Example
///
/// ```no_run
/// use npm_sbom::{BomBuilder, BomBuilderOptions};
/// use std::path::Path;
///
/// let builder = BomBuilder::new(BomBuilderOptions::default());
/// let bom = builder.build_from_project_dir(Path::new("."))?;
/// println!("{} components", bom.all_components().len());
/// # Ok::<(), npm_sbom::BuildError>(())
/// ```
pub struct BomBuilder {
    runner: Box<dyn NpmRunner>,
    component_builder: Box<dyn ComponentBuilder>,
    purl_factory: Box<dyn PurlFactory>,
    tool_builder: Box<dyn ToolBuilder>,
    options: BomBuilderOptions,
}

impl BomBuilder {
    pub fn new(options: BomBuilderOptions) -> Self {
        Self {
            runner: Box::new(CommandRunner::default()),
            component_builder: Box::new(PackageJsonComponentBuilder),
            purl_factory: Box::new(NpmPurlFactory),
            tool_builder: Box::new(DescriptorToolBuilder),
            options,
        }
    }

    pub fn with_runner(mut self, runner: impl NpmRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_component_builder(mut self, builder: impl ComponentBuilder + 'static) -> Self {
        self.component_builder = Box::new(builder);
        self
    }

    pub fn with_purl_factory(mut self, factory: impl PurlFactory + 'static) -> Self {
        self.purl_factory = Box::new(factory);
        self
    }

    pub fn with_tool_builder(mut self, builder: impl ToolBuilder + 'static) -> Self {
        self.tool_builder = Box::new(builder);
        self
    }

    /// Runs npm-ls in `project_dir` and builds the BOM from its output.
    pub fn build_from_project_dir(&self, project_dir: &Path) -> Result<Bom> {
        let tree = fetch_npm_ls(self.runner.as_ref(), project_dir, &self.options)?;
        Ok(self.build_from_npm_ls(&tree))
    }

    /// Builds the BOM from an already parsed npm-ls tree.
    pub fn build_from_npm_ls(&self, data: &RawNode) -> Bom {
        tracing::info!("build BOM ...");

        let synthesizer = Synthesizer::new(
            self.component_builder.as_ref(),
            self.purl_factory.as_ref(),
            &self.options,
        );

        let root_path = data.path().unwrap_or_default().to_string();
        // a root component is required for a meaningful document
        let root = match synthesizer.synthesize(data, self.options.meta_component_type) {
            Synthesis::Built(component) => component,
            Synthesis::Omitted | Synthesis::Unbuildable => {
                tracing::warn!("root component could not be built, using a placeholder");
                Component::placeholder(self.options.meta_component_type, ROOT_PLACEHOLDER)
            }
        };

        let mut walker = TreeWalker::new(&synthesizer, &root_path, root);
        walker.gather(data, &root_path);
        let (mut root, mut components, edges) = walker.finish();

        let separator = detect_separator(&root_path);
        finalize_path_properties(
            &root_path,
            separator,
            std::iter::once(&mut root).chain(components.values_mut()),
        );
        tracing::debug!(components = components.len(), "gathered components");

        let mut refs = BTreeMap::from([(root_path.clone(), root.bom_ref.clone())]);
        let top_level = if self.options.flatten_components {
            flatten(components, &mut refs)
        } else {
            nest(components, &root_path, separator, &mut refs)
        };
        let dependencies = dependency_graph(&refs, &edges);

        let mut metadata = Metadata {
            component: Some(root),
            ..Metadata::default()
        };
        if let Some(tool) = self.tool_builder.make_tool(&PackageDescriptor::this_tool()) {
            metadata.tools.push(tool);
        }

        let mut serial_number = None;
        if !self.options.reproducible {
            metadata.timestamp = Some(Utc::now());
            serial_number = Some(format!("urn:uuid:{}", uuid::Uuid::new_v4()));
        }

        Bom {
            serial_number,
            metadata,
            components: top_level,
            dependencies,
        }
    }
}

/// Rewrites install-path properties relative to the root, `/` separated.
///
/// The root itself drops the property; paths outside the root keep their
/// original value.
fn finalize_path_properties<'c>(
    root_path: &str,
    separator: char,
    components: impl Iterator<Item = &'c mut Component>,
) {
    if root_path.is_empty() {
        return;
    }

    for component in components {
        let Some(path) = component
            .property(property_names::PACKAGE_INSTALL_PATH)
            .map(str::to_string)
        else {
            continue;
        };

        component
            .properties
            .retain(|p| p.name != property_names::PACKAGE_INSTALL_PATH);
        match relative_path(root_path, &path, separator) {
            Some(relative) if relative.is_empty() => {}
            Some(relative) => component.add_property(property_names::PACKAGE_INSTALL_PATH, relative),
            None => component.add_property(property_names::PACKAGE_INSTALL_PATH, path),
        }
    }
}

/// Nests components below their closest ancestor by install path.
///
/// Children of the root, and components outside of it, stay at the top
/// level. Nested bom-refs are prefixed with their parent's, separated by
/// `|`, which keeps them unique when one package is installed twice.
fn nest(
    mut components: AllComponents,
    root_path: &str,
    separator: char,
    refs: &mut BTreeMap<String, String>,
) -> Vec<Component> {
    let tree = PathTree::from_paths(
        components.keys().map(String::as_str).chain([root_path]),
        separator,
    );
    let parents: BTreeMap<String, String> = tree
        .parents()
        .into_iter()
        .filter_map(|(path, parent)| {
            parent
                .filter(|p| p != root_path && components.contains_key(p))
                .map(|p| (path, p))
        })
        .filter(|(path, _)| components.contains_key(path))
        .collect();

    let mut by_depth: Vec<String> = components.keys().cloned().collect();
    by_depth.sort_by_key(|path| depth(path, separator));

    for path in &by_depth {
        let own_ref = components[path].bom_ref.clone();
        let final_ref = match parents.get(path) {
            Some(parent) => format!("{}|{}", refs[parent], own_ref),
            None => own_ref,
        };
        if let Some(component) = components.get_mut(path) {
            component.bom_ref = final_ref.clone();
        }
        refs.insert(path.clone(), final_ref);
    }

    // deepest first, so every child is in place before its parent moves
    for path in by_depth.iter().rev() {
        let Some(parent) = parents.get(path) else {
            continue;
        };
        if let Some(child) = components.remove(path) {
            if let Some(parent_component) = components.get_mut(parent) {
                parent_component.components.push(child);
            }
        }
    }

    let mut top_level: Vec<Component> = components.into_values().collect();
    sort_components(&mut top_level);
    top_level
}

/// Lists every component at the top level, without nesting.
///
/// A bom-ref that is already taken gets the install path appended.
fn flatten(components: AllComponents, refs: &mut BTreeMap<String, String>) -> Vec<Component> {
    let mut used: HashSet<String> = refs.values().cloned().collect();
    let mut top_level = Vec::with_capacity(components.len());

    for (path, mut component) in components {
        component.components.clear();
        if used.contains(&component.bom_ref) {
            let location = component
                .property(property_names::PACKAGE_INSTALL_PATH)
                .unwrap_or(path.as_str())
                .to_string();
            component.bom_ref = format!("{}|{}", component.bom_ref, location);
        }
        used.insert(component.bom_ref.clone());
        refs.insert(path, component.bom_ref.clone());
        top_level.push(component);
    }

    top_level.sort_by(|a, b| a.bom_ref.cmp(&b.bom_ref));
    top_level
}

fn sort_components(components: &mut [Component]) {
    components.sort_by(|a, b| a.bom_ref.cmp(&b.bom_ref));
    for component in components.iter_mut() {
        sort_components(&mut component.components);
    }
}

/// One entry per component, listing the final bom-refs of its direct
/// dependencies.
fn dependency_graph(refs: &BTreeMap<String, String>, edges: &DependencyEdges) -> Vec<Dependency> {
    let mut graph: BTreeMap<&str, BTreeSet<&str>> = refs
        .values()
        .map(|bom_ref| (bom_ref.as_str(), BTreeSet::new()))
        .collect();

    for (from, tos) in edges {
        let Some(from_ref) = refs.get(from) else {
            continue;
        };
        let depends_on = tos.iter().filter_map(|to| refs.get(to)).map(String::as_str);
        graph.entry(from_ref.as_str()).or_default().extend(depends_on);
    }

    graph
        .into_iter()
        .map(|(bom_ref, depends_on)| Dependency {
            bom_ref: bom_ref.to_string(),
            depends_on: depends_on.into_iter().map(str::to_string).collect(),
        })
        .collect()
}
