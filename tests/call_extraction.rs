use pycallmap::core::{CallEdge, SourceUnit};
use pycallmap::parsers::python::PythonParser;
use std::path::PathBuf;

fn edges_of(code: &str) -> Vec<CallEdge> {
    let unit = SourceUnit {
        path: PathBuf::from("mod.py"),
        module: "mod".to_string(),
    };
    PythonParser::new().parse_source(&unit, code).unwrap().edges
}

fn callees_of(code: &str, caller: &str) -> Vec<String> {
    edges_of(code)
        .into_iter()
        .filter(|edge| edge.caller == caller)
        .map(|edge| edge.callee)
        .collect()
}

#[test]
fn callee_names_follow_receiver_shape() {
    let code = r#"
class Service:
    def handle(self, items):
        plain()
        self.save()
        self.repo.session.commit()
        Service.build()
        get_client().send()
        items[0].close()
        handlers["x"]()
        make_factory()()
        (lambda: None)()
        super().__init__()
"#;

    assert_eq!(
        callees_of(code, "mod.Service.handle"),
        vec![
            "plain",
            "self.save",
            "self.repo.session.commit",
            "Service.build",
            "send",
            "get_client",
            "close",
            "make_factory",
            "__init__",
            "super",
        ]
    );
}

#[test]
fn chained_self_attribute_call_keeps_full_path() {
    let code = r#"
class Worker:
    def run(self):
        self.a.b.method(1, 2)
"#;
    assert_eq!(
        edges_of(code),
        vec![CallEdge::new("mod.Worker.run", "self.a.b.method")]
    );
}

#[test]
fn repeated_calls_are_not_deduplicated() {
    let code = r#"
def loop():
    tick()
    for _ in range(3):
        tick()
"#;
    let calls = callees_of(code, "mod.loop");
    assert_eq!(calls.iter().filter(|c| *c == "tick").count(), 2);
    assert_eq!(calls, vec!["tick", "range", "tick"]);
}

#[test]
fn nested_scopes_are_attributed_to_enclosing_declaration() {
    let code = r#"
def outer(rows):
    def inner():
        return deep()
    total = [convert(r) for r in rows if keep(r)]
    callback = lambda x: transform(x)
    try:
        risky()
    except ValueError:
        recover()
    finally:
        cleanup()
    return inner()
"#;
    assert_eq!(
        callees_of(code, "mod.outer"),
        vec![
            "deep",
            "convert",
            "keep",
            "transform",
            "risky",
            "recover",
            "cleanup",
            "inner",
        ]
    );
}

#[test]
fn arguments_are_visited_after_the_outer_call() {
    let code = r#"
def compose():
    outer(middle(inner()), key=other())
"#;
    assert_eq!(
        callees_of(code, "mod.compose"),
        vec!["outer", "middle", "inner", "other"]
    );
}

#[test]
fn decorator_calls_belong_to_the_decorated_function() {
    let code = r#"
@app.route("/")
def index():
    render()
"#;
    assert_eq!(callees_of(code, "mod.index"), vec!["app.route", "render"]);
}

#[test]
fn module_level_and_class_body_calls_have_no_caller() {
    let code = r#"
setup()

class Config:
    value = compute()

    def method(self):
        pass
"#;
    assert!(edges_of(code).is_empty());
}

#[test]
fn parenthesized_targets_read_as_the_inner_expression() {
    let code = r#"
def f(self):
    (self.a).b()
    (helper)()
    ((self.repo.session)).commit()
    (lambda: None)()
"#;

    assert_eq!(
        callees_of(code, "mod.f"),
        vec!["self.a.b", "helper", "self.repo.session.commit"]
    );
}
