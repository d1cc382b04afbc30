use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{Component, ComponentType, RawNode};

use super::synth::{Synthesis, Synthesizer};

/// Every non-root component of one build, keyed by install path.
pub type AllComponents = BTreeMap<String, Component>;

/// Direct dependencies by install path.
pub type DependencyEdges = BTreeMap<String, BTreeSet<String>>;

/// Walks an npm-ls tree, creating one component per install path.
///
/// A package reachable along several edges is synthesized once; later
/// encounters only add an edge. Components are inserted before their
/// children are visited, so a path that shows up again below itself is
/// not descended into twice. Nodes without a component are re-entered on
/// every encounter, except while they are already on the current stack.
pub struct TreeWalker<'s, 'a> {
    synthesizer: &'s Synthesizer<'a>,
    root_path: String,
    root: Component,
    components: AllComponents,
    edges: DependencyEdges,
    skipped_on_stack: HashSet<String>,
}

impl<'s, 'a> TreeWalker<'s, 'a> {
    /// Starts a walk that already knows the root component.
    pub fn new(synthesizer: &'s Synthesizer<'a>, root_path: &str, root: Component) -> Self {
        Self {
            synthesizer,
            root_path: root_path.to_string(),
            root,
            components: AllComponents::new(),
            edges: DependencyEdges::new(),
            skipped_on_stack: HashSet::new(),
        }
    }

    /// Visits the children of `node`, attributing edges to `parent_path`.
    ///
    /// Children that are omitted or cannot be built produce no component,
    /// but their own children are still visited and attached to the
    /// nearest ancestor that does have one.
    pub fn gather(&mut self, node: &RawNode, parent_path: &str) {
        for (name, child) in node.dependencies() {
            let Some(path) = child.path().filter(|p| !p.is_empty()) else {
                tracing::debug!(name = %name, "dependency without install path");
                self.gather(child, parent_path);
                continue;
            };

            if self.is_known(path) {
                self.add_edge(parent_path, path);
                continue;
            }
            if self.skipped_on_stack.contains(path) {
                continue;
            }

            match self.synthesizer.synthesize(child, ComponentType::Library) {
                Synthesis::Built(component) => {
                    self.components.insert(path.to_string(), component);
                    self.add_edge(parent_path, path);
                    self.gather(child, path);
                }
                Synthesis::Omitted | Synthesis::Unbuildable => {
                    self.skipped_on_stack.insert(path.to_string());
                    self.gather(child, parent_path);
                    self.skipped_on_stack.remove(path);
                }
            }
        }
    }

    fn is_known(&self, path: &str) -> bool {
        path == self.root_path || self.components.contains_key(path)
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    /// The root, every other component, and the recorded edges.
    pub fn finish(self) -> (Component, AllComponents, DependencyEdges) {
        (self.root, self.components, self.edges)
    }
}
