use pycallmap::core::{AnalyzerOptions, CallEdge, CodebaseAnalyzer};
use pycallmap::AnalysisError;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

fn write(root: &Path, relative: &str, code: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, code).unwrap();
}

fn util_main_project() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        dir.path(),
        "util.py",
        "def helper():\n    \"\"\"Shared helper.\"\"\"\n    return 1\n",
    );
    write(
        dir.path(),
        "main.py",
        r#"
class Worker:
    def run(self):
        helper()
        self.util.helper()
"#,
    );
    dir
}

#[test]
fn analyzer_merges_modules_and_keeps_unresolved_callees() {
    let dir = util_main_project();

    let report = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
    let model = &report.model;

    assert_eq!(model.standalone_functions, vec!["util.helper"]);
    assert_eq!(model.classes.len(), 1);
    assert_eq!(model.classes["main.Worker"], vec!["main.Worker.run"]);
    assert_eq!(model.inheritance["main.Worker"], None);
    assert_eq!(model.module_of["main.Worker"], "main");
    assert_eq!(
        model.edges,
        vec![
            CallEdge::new("main.Worker.run", "helper"),
            CallEdge::new("main.Worker.run", "self.util.helper"),
        ]
    );
    assert_eq!(
        model.declaration_summaries["util.helper"],
        "helper()\nShared helper."
    );
    assert_eq!(model.dangling_callees(), vec!["helper", "self.util.helper"]);

    assert_eq!(report.diagnostics.files_discovered, 2);
    assert_eq!(report.diagnostics.files_analyzed, 2);
    assert!(report.diagnostics.is_clean());
}

#[test]
fn qualified_names_are_unique_and_methods_belong_to_their_class() {
    let dir = tempfile::TempDir::new().unwrap();
    let shared = r#"
class Repo(Base):
    def save(self):
        self.flush()

    def flush(self):
        pass

def connect():
    return Repo()
"#;
    write(dir.path(), "a/store.py", shared);
    write(dir.path(), "b/store.py", shared);

    let report = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
    let model = &report.model;

    let mut seen = HashSet::new();
    for (class, methods) in &model.classes {
        assert!(seen.insert(class.clone()), "duplicate {class}");
        for method in methods {
            assert!(seen.insert(method.clone()), "duplicate {method}");
            let (owner, _) = method.rsplit_once('.').unwrap();
            assert_eq!(owner, class);
        }
    }
    for function in &model.standalone_functions {
        assert!(seen.insert(function.clone()), "duplicate {function}");
    }

    assert_eq!(seen.len(), model.declaration_count());
    assert!(model.classes.contains_key("a.store.Repo"));
    assert!(model.classes.contains_key("b.store.Repo"));
    assert_eq!(model.inheritance["a.store.Repo"].as_deref(), Some("Base"));
    assert_eq!(model.inheritance.len(), model.classes.len());
}

#[test]
fn edge_order_is_stable_between_sequential_and_parallel_runs() {
    let dir = tempfile::TempDir::new().unwrap();
    for i in 0..12 {
        write(
            dir.path(),
            &format!("pkg/mod_{i:02}.py"),
            &format!("def f{i}():\n    g{i}()\n    g{i}()\n"),
        );
    }

    let parallel = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
    let sequential =
        CodebaseAnalyzer::with_options(AnalyzerOptions::default().with_parallel(false))
            .analyze(dir.path())
            .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.model.edges.len(), 24);
    assert_eq!(parallel.model.edges[0], CallEdge::new("pkg.mod_00.f0", "g0"));
    assert_eq!(parallel.model.edges[1], CallEdge::new("pkg.mod_00.f0", "g0"));
}

#[test]
fn unparseable_files_are_skipped_and_counted() {
    let dir = util_main_project();
    write(dir.path(), "broken.py", "def broken(:\n    pass\n");

    let report = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();

    assert_eq!(report.diagnostics.files_discovered, 3);
    assert_eq!(report.diagnostics.files_analyzed, 2);
    assert_eq!(report.diagnostics.files_skipped(), 1);
    assert!(report.diagnostics.skipped_files[0]
        .path
        .ends_with("broken.py"));
    assert!(!report
        .model
        .standalone_functions
        .iter()
        .any(|f| f.starts_with("broken")));
}

#[test]
fn non_utf8_files_are_skipped() {
    let dir = util_main_project();
    fs::write(dir.path().join("latin1.py"), b"# caf\xe9\ndef f():\n    pass\n").unwrap();

    let report = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
    assert_eq!(report.diagnostics.files_skipped(), 1);
    assert_eq!(report.model.standalone_functions, vec!["util.helper"]);
}

#[test]
fn tolerant_mode_keeps_partial_declarations() {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        dir.path(),
        "svc.py",
        r#"
def fine():
    work()

def damaged():
    value = (1 +
    report(value)
"#,
    );

    let strict = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();
    assert_eq!(strict.diagnostics.files_skipped(), 1);
    assert!(strict.model.standalone_functions.is_empty());

    let tolerant = CodebaseAnalyzer::with_options(AnalyzerOptions::default().with_tolerance(true))
        .analyze(dir.path())
        .unwrap();
    assert_eq!(tolerant.diagnostics.files_skipped(), 0);
    assert!(tolerant
        .model
        .standalone_functions
        .contains(&"svc.fine".to_string()));
    assert!(tolerant.diagnostics.partial_declarations >= 1);
}

#[test]
fn single_file_root_uses_unprefixed_names() {
    let dir = util_main_project();
    let report = CodebaseAnalyzer::new()
        .analyze(&dir.path().join("main.py"))
        .unwrap();

    assert_eq!(report.model.classes["Worker"], vec!["Worker.run"]);
    assert_eq!(report.model.module_of["Worker"], "");
}

#[test]
fn missing_root_aborts_the_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = CodebaseAnalyzer::new()
        .analyze(&dir.path().join("absent"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::RootNotFound { .. }));
}

#[test]
fn analyze_selected_narrows_to_named_classes() {
    let dir = util_main_project();
    write(
        dir.path(),
        "other.py",
        "class Idle:\n    def wait(self):\n        sleep()\n",
    );

    let report = CodebaseAnalyzer::new()
        .analyze_selected(dir.path(), &["Worker"])
        .unwrap();

    assert_eq!(report.model.classes.len(), 1);
    assert!(report.model.classes.contains_key("main.Worker"));
    assert!(report.model.standalone_functions.is_empty());
    assert_eq!(report.model.edges.len(), 2);
    assert_eq!(report.diagnostics.files_analyzed, 3);
}
