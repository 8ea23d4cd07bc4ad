use pycallmap::core::{
    build_graph,
    graph::{Edge, EdgeType, GraphBuilder, Node, NodeType},
    CallEdge, CodeModel, DependencyGraph,
};

#[test]
fn graph_builder_adds_nodes_and_edges() {
    let mut gb = GraphBuilder::new();

    let class = Node::new("m.Repo".to_string(), NodeType::Class);
    let method = Node::new("m.Repo.save".to_string(), NodeType::Method);
    assert_eq!(method.name, "save");

    gb.add_node(class);
    gb.add_node(method);

    let contains = Edge::new(
        EdgeType::Contains,
        "m.Repo".to_string(),
        "m.Repo.save".to_string(),
    );
    assert!(gb.add_edge(contains).is_some());

    let graph: DependencyGraph = gb.build();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn add_edge_returns_none_when_missing_nodes() {
    let mut gb = GraphBuilder::new();
    gb.add_node(Node::new("m.f".to_string(), NodeType::Function));

    let e = Edge::new(EdgeType::Call, "m.f".to_string(), "missing".to_string());
    assert!(gb.add_edge(e).is_none());

    let e = Edge::new(EdgeType::Call, "m.f".to_string(), "missing".to_string());
    gb.connect(e);
    let index = gb.get_node_index("missing").unwrap();
    let graph = gb.build();
    assert_eq!(graph[index].node_type, NodeType::External);
}

#[test]
fn build_graph_projects_model_with_external_nodes() {
    let mut model = CodeModel::default();
    model
        .classes
        .insert("m.Dog".into(), vec!["m.Dog.bark".into()]);
    model.inheritance.insert("m.Dog".into(), Some("Animal".into()));
    model.module_of.insert("m.Dog".into(), "m".into());
    model.standalone_functions.push("m.main".into());
    model.edges = vec![
        CallEdge::new("m.main", "m.Dog.bark"),
        CallEdge::new("m.Dog.bark", "print"),
        CallEdge::new("m.Dog.bark", "print"),
    ];

    let graph = build_graph(&model);

    // m.Dog, m.Dog.bark, m.main, Animal, print
    assert_eq!(graph.node_count(), 5);
    // contains + inheritance + three calls
    assert_eq!(graph.edge_count(), 5);

    let externals: Vec<&str> = graph
        .raw_nodes()
        .iter()
        .map(|n| &n.weight)
        .filter(|n| n.node_type == NodeType::External)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(externals, vec!["Animal", "print"]);

    let calls = graph
        .raw_edges()
        .iter()
        .filter(|e| e.weight.edge_type == EdgeType::Call)
        .count();
    assert_eq!(calls, 3);
}
