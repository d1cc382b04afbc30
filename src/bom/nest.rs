use std::collections::BTreeMap;

/// The directory separator used by an npm-ls tree.
///
/// Derived from the root path so the result depends on the input only,
/// never on the platform running the build.
pub fn detect_separator(root_path: &str) -> char {
    if root_path.starts_with('/') {
        '/'
    } else {
        '\\'
    }
}

fn segments(path: &str, separator: char) -> impl Iterator<Item = &str> {
    path.split(separator).filter(|s| !s.is_empty())
}

/// Number of non-empty segments in `path`.
pub fn depth(path: &str, separator: char) -> usize {
    segments(path, separator).count()
}

/// `path` relative to `root`, joined with `/`.
///
/// Returns an empty string for the root itself and `None` for paths
/// outside of it.
pub fn relative_path(root: &str, path: &str, separator: char) -> Option<String> {
    let mut rest = segments(path, separator);
    for root_segment in segments(root, separator) {
        if rest.next()? != root_segment {
            return None;
        }
    }
    Some(rest.collect::<Vec<_>>().join("/"))
}

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<String, TrieNode>,
    paths: Vec<String>,
}

/// A trie of install paths, split into segments.
#[derive(Debug)]
pub struct PathTree {
    root: TrieNode,
}

impl PathTree {
    pub fn from_paths<'p>(paths: impl IntoIterator<Item = &'p str>, separator: char) -> Self {
        let mut root = TrieNode::default();
        for path in paths {
            let mut node = &mut root;
            for segment in segments(path, separator) {
                node = node.children.entry(segment.to_string()).or_default();
            }
            if !node.paths.iter().any(|p| p == path) {
                node.paths.push(path.to_string());
            }
        }
        Self { root }
    }

    /// For every path, the nearest proper ancestor that is itself in the tree.
    pub fn parents(&self) -> BTreeMap<String, Option<String>> {
        fn collect(node: &TrieNode, ancestor: Option<&str>, out: &mut BTreeMap<String, Option<String>>) {
            for path in &node.paths {
                out.insert(path.clone(), ancestor.map(str::to_string));
            }
            let next = node.paths.first().map(String::as_str).or(ancestor);
            for child in node.children.values() {
                collect(child, next, out);
            }
        }

        let mut out = BTreeMap::new();
        collect(&self.root, None, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_separator() {
        assert_eq!(detect_separator("/home/me/project"), '/');
        assert_eq!(detect_separator("C:\\Users\\me\\project"), '\\');
    }

    #[test]
    fn test_parents_skip_missing_intermediate_directories() {
        let tree = PathTree::from_paths(
            [
                "/p",
                "/p/node_modules/a",
                "/p/node_modules/a/node_modules/b",
                "/p/node_modules/c",
            ],
            '/',
        );
        let parents = tree.parents();

        assert_eq!(parents["/p"], None);
        assert_eq!(parents["/p/node_modules/a"].as_deref(), Some("/p"));
        assert_eq!(
            parents["/p/node_modules/a/node_modules/b"].as_deref(),
            Some("/p/node_modules/a")
        );
        assert_eq!(parents["/p/node_modules/c"].as_deref(), Some("/p"));
    }

    #[test]
    fn test_windows_paths() {
        let tree = PathTree::from_paths(
            ["C:\\p", "C:\\p\\node_modules\\a", "C:\\p\\node_modules\\a\\node_modules\\b"],
            '\\',
        );
        let parents = tree.parents();
        assert_eq!(
            parents["C:\\p\\node_modules\\a\\node_modules\\b"].as_deref(),
            Some("C:\\p\\node_modules\\a")
        );
    }

    #[test]
    fn test_paths_outside_root_have_no_parent() {
        let tree = PathTree::from_paths(["/p", "/elsewhere/linked"], '/');
        assert_eq!(tree.parents()["/elsewhere/linked"], None);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/p", "/p", '/').as_deref(), Some(""));
        assert_eq!(
            relative_path("/p", "/p/node_modules/a", '/').as_deref(),
            Some("node_modules/a")
        );
        assert_eq!(
            relative_path("C:\\p", "C:\\p\\node_modules\\a", '\\').as_deref(),
            Some("node_modules/a")
        );
        assert_eq!(relative_path("/p", "/q/a", '/'), None);
        assert_eq!(relative_path("/p/x", "/p", '/'), None);
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth("/p/node_modules/a", '/'), 3);
        assert_eq!(depth("C:\\p", '\\'), 2);
    }
}
