use npm_sbom::config::OmittableDependencyType;
use npm_sbom::npm::{NpmRunner, RunFailure};
use npm_sbom::output::generate_cyclonedx_string;
use npm_sbom::{BomBuilder, BomBuilderOptions, BuildError};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const INTEGRITY: &str =
    "sha512-9b7nch3+kJKdBxqb8GVWZVMcP9p1Qt4jrbCCguYrD4nahNN9AmZfZhrmXUWvhXFvnJfwwv94/aXgLE3uzBN3jQ==";
const INTEGRITY_HEX: &str = "f5bee7721dfe90929d071a9bf0655665531c3fda7542de23adb08282e62b0f89da84d37d02665f661ae65d45af85716f9c97f0c2ff78fda5e02c4deecc13778d";

/// Replays a canned npm-ls response and records what it was asked to run.
struct FakeNpm {
    response: Result<Vec<u8>, RunFailure>,
    calls: Rc<RefCell<Vec<(Vec<String>, PathBuf)>>>,
}

impl FakeNpm {
    fn ok(tree: Value) -> Self {
        Self {
            response: Ok(serde_json::to_vec(&tree).unwrap()),
            calls: Rc::default(),
        }
    }

    fn failing(stdout: &[u8]) -> Self {
        Self {
            response: Err(RunFailure {
                message: "npm ls exited with status 1".to_string(),
                status: Some(1),
                signal: None,
                stdout: stdout.to_vec(),
                stderr: b"npm ERR! missing: left-pad@1.3.0".to_vec(),
            }),
            calls: Rc::default(),
        }
    }
}

impl NpmRunner for FakeNpm {
    fn run(&self, args: &[String], cwd: &Path) -> Result<Vec<u8>, RunFailure> {
        self.calls
            .borrow_mut()
            .push((args.to_vec(), cwd.to_path_buf()));
        self.response.clone()
    }
}

fn project_tree() -> Value {
    json!({
        "name": "app", "version": "1.0.0", "_id": "app@1.0.0", "path": "/p",
        "dependencies": {
            "a": {
                "name": "a", "version": "1.0.0", "_id": "a@1.0.0",
                "path": "/p/node_modules/a",
                "resolved": "https://registry.npmjs.org/a/-/a-1.0.0.tgz",
                "integrity": INTEGRITY
            },
            "b": {
                "name": "b", "version": "1.0.0", "_id": "b@1.0.0",
                "path": "/p/node_modules/b",
                "dependencies": {
                    "a": {
                        "name": "a", "version": "1.0.0", "_id": "a@1.0.0",
                        "path": "/p/node_modules/a"
                    }
                }
            },
            "jest": {
                "name": "jest", "version": "29.0.0", "_id": "jest@29.0.0",
                "path": "/p/node_modules/jest", "dev": true
            }
        }
    })
}

fn build(tree: Value, options: BomBuilderOptions) -> npm_sbom::Bom {
    BomBuilder::new(options)
        .with_runner(FakeNpm::ok(tree))
        .build_from_project_dir(Path::new("/p"))
        .unwrap()
}

#[test]
fn test_shared_dependency_appears_once() {
    let bom = build(project_tree(), BomBuilderOptions::default());

    let components = bom.all_components();
    assert_eq!(components.len(), 3);
    assert_eq!(components.iter().filter(|c| c.name == "a").count(), 1);

    assert_eq!(
        bom.dependencies_of("app@1.0.0").unwrap(),
        ["a@1.0.0", "b@1.0.0", "jest@29.0.0"]
    );
    assert_eq!(bom.dependencies_of("b@1.0.0").unwrap(), ["a@1.0.0"]);
}

#[test]
fn test_components_are_enriched() {
    let bom = build(project_tree(), BomBuilderOptions::default());
    let a = bom.find_component("a@1.0.0").unwrap();

    assert_eq!(a.purl.as_deref(), Some("pkg:npm/a@1.0.0"));
    assert_eq!(
        a.hashes.values().next().map(String::as_str),
        Some(INTEGRITY_HEX)
    );
    assert_eq!(a.property("cdx:npm:package:path"), Some("node_modules/a"));

    let jest = bom.find_component("jest@29.0.0").unwrap();
    assert_eq!(jest.property("cdx:npm:package:development"), Some("true"));
}

#[test]
fn test_omit_dev_drops_dev_packages() {
    let options = BomBuilderOptions {
        omit_dependency_types: [OmittableDependencyType::Dev].into_iter().collect(),
        ..BomBuilderOptions::default()
    };
    let bom = build(project_tree(), options);

    assert!(bom.find_component("jest@29.0.0").is_none());
    assert_eq!(bom.all_components().len(), 2);
}

#[test]
fn test_npm_ls_arguments_and_working_directory() {
    let runner = FakeNpm::ok(project_tree());
    let calls = Rc::clone(&runner.calls);
    let options = BomBuilderOptions {
        package_lock_only: true,
        omit_dependency_types: [OmittableDependencyType::Peer].into_iter().collect(),
        ..BomBuilderOptions::default()
    };

    BomBuilder::new(options)
        .with_runner(runner)
        .build_from_project_dir(Path::new("/p"))
        .unwrap();

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    let (args, cwd) = &calls[0];
    assert_eq!(cwd, Path::new("/p"));
    assert_eq!(&args[..3], ["ls", "--json", "--long"]);
    assert!(args.iter().any(|a| a == "--package-lock-only"));
    assert!(args.iter().any(|a| a == "--omit=peer"));
}

#[test]
fn test_nameless_root_gets_placeholder() {
    let bom = build(
        json!({
            "path": "/p",
            "dependencies": {
                "a": { "name": "a", "version": "1.0.0", "path": "/p/node_modules/a" }
            }
        }),
        BomBuilderOptions::default(),
    );

    let root = bom.metadata.component.as_ref().unwrap();
    assert!(root.is_placeholder());
    assert_eq!(bom.all_components().len(), 1);
}

#[test]
fn test_reproducible_output_is_byte_identical() {
    let options = BomBuilderOptions {
        reproducible: true,
        ..BomBuilderOptions::default()
    };
    let first = generate_cyclonedx_string(&build(project_tree(), options.clone())).unwrap();
    let second = generate_cyclonedx_string(&build(project_tree(), options)).unwrap();

    assert_eq!(first, second);
    assert!(!first.contains("serialNumber"));
    assert!(!first.contains("timestamp"));
}

#[test]
fn test_flattened_output_has_no_nesting() {
    let tree = json!({
        "name": "app", "path": "/p",
        "dependencies": {
            "a": {
                "name": "a", "_id": "a@1", "path": "/p/node_modules/a",
                "dependencies": {
                    "b": { "name": "b", "_id": "b@1", "path": "/p/node_modules/a/node_modules/b" }
                }
            }
        }
    });

    let nested = build(tree.clone(), BomBuilderOptions::default());
    assert_eq!(nested.components.len(), 1);
    assert_eq!(nested.components[0].components[0].bom_ref, "a@1|b@1");

    let flat = build(
        tree,
        BomBuilderOptions {
            flatten_components: true,
            ..BomBuilderOptions::default()
        },
    );
    assert_eq!(flat.components.len(), 2);
    assert_eq!(flat.dependencies_of("a@1").unwrap(), ["b@1"]);
}

#[test]
fn test_npm_failure_is_fatal_by_default() {
    let err = BomBuilder::new(BomBuilderOptions::default())
        .with_runner(FakeNpm::failing(b"{}"))
        .build_from_project_dir(Path::new("/p"))
        .unwrap_err();

    assert!(matches!(err, BuildError::NpmLs { .. }));
    assert_eq!(err.to_string(), "npm-ls exited with errors: 1 noSignal");
}

#[test]
fn test_npm_failure_ignored_uses_partial_output() {
    let stdout = serde_json::to_vec(&project_tree()).unwrap();
    let options = BomBuilderOptions {
        ignore_npm_errors: true,
        ..BomBuilderOptions::default()
    };
    let bom = BomBuilder::new(options)
        .with_runner(FakeNpm::failing(&stdout))
        .build_from_project_dir(Path::new("/p"))
        .unwrap();

    assert_eq!(bom.all_components().len(), 3);
}

#[test]
fn test_unparseable_output_is_an_error() {
    let runner = FakeNpm {
        response: Ok(b"npm WARN something went wrong".to_vec()),
        calls: Rc::default(),
    };
    let err = BomBuilder::new(BomBuilderOptions::default())
        .with_runner(runner)
        .build_from_project_dir(Path::new("/p"))
        .unwrap_err();

    assert!(matches!(err, BuildError::Parse { .. }));
}

#[test]
fn test_deep_dependency_chain_is_accepted() {
    const DEPTH: usize = 150;

    let mut tree = json!({});
    for level in (0..DEPTH).rev() {
        let mut node = json!({
            "name": format!("d{level}"),
            "version": "1.0.0",
            "_id": format!("d{level}@1"),
            "path": format!("/p/node_modules/d{level}"),
        });
        if level + 1 < DEPTH {
            let mut dependencies = serde_json::Map::new();
            dependencies.insert(format!("d{}", level + 1), tree);
            node["dependencies"] = Value::Object(dependencies);
        }
        tree = node;
    }
    let root = json!({
        "name": "app", "_id": "app@1", "path": "/p",
        "dependencies": { "d0": tree }
    });

    let bom = build(root, BomBuilderOptions::default());

    assert_eq!(bom.all_components().len(), DEPTH);
    assert_eq!(bom.dependencies_of("d0@1").unwrap(), ["d1@1"]);
    assert_eq!(bom.dependencies_of("d148@1").unwrap(), ["d149@1"]);
    assert!(bom.dependencies_of("d149@1").unwrap().is_empty());
}
