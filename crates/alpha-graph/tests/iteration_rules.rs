use alpha_graph::{
    AlphaGraph, DeiterationScope, ExistentialGraph, GraphConfig, NodeId, NodeKind,
};

fn sheet_with(config: GraphConfig) -> (AlphaGraph, NodeId) {
    let graph = AlphaGraph::with_sheet(config).unwrap();
    let root = graph.root().unwrap();
    (graph, root)
}

#[test]
fn iteration_is_local_to_the_content_area() {
    let (mut graph, root) = sheet_with(GraphConfig::default());
    let c1 = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
    let p1 = graph.create_node(Some(c1), NodeKind::Prop, Some("a")).unwrap();
    let c2 = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();

    assert!(graph.can_iterate(c1, p1));
    assert!(!graph.can_iterate(c2, p1));
    assert!(!graph.can_iterate(p1, p1));
    assert!(!graph.can_iterate(root, p1));

    let err = graph.check_iterate(c2, p1).unwrap_err();
    assert_eq!(err.info().code, "not-ancestor");
    assert!(err.info().hint.as_deref().is_some_and(|hint| hint.contains("nested")));
    assert_eq!(
        graph.check_iterate(p1, p1).unwrap_err().info().code,
        "self-iteration"
    );
    assert_eq!(
        graph.check_iterate(c1, root).unwrap_err().info().code,
        "no-parent"
    );
}

#[test]
fn iteration_reaches_nested_areas() {
    let (mut graph, root) = sheet_with(GraphConfig::default());
    let c1 = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
    let p1 = graph.create_node(Some(c1), NodeKind::Prop, Some("a")).unwrap();
    let c3 = graph.create_node(Some(c1), NodeKind::Cut, None).unwrap();
    let c4 = graph.create_node(Some(c3), NodeKind::Cut, None).unwrap();

    assert!(graph.can_iterate(c4, p1));
    let pasted = graph.iterate(c4, p1).unwrap();
    assert_eq!(pasted.len(), 1);
    assert_eq!(graph.depth(pasted[0]).unwrap(), 3);
    assert!(graph.nodes_equal(Some(pasted[0]), Some(p1)).unwrap());
    graph.verify_invariants().unwrap();

    let err = graph.iterate(root, p1).unwrap_err();
    assert_eq!(err.info().code, "not-ancestor");
}

#[test]
fn iterating_a_cut_into_its_own_interior_copies_a_snapshot() {
    let (mut graph, root) = sheet_with(GraphConfig::default());
    let c1 = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
    graph.create_node(Some(c1), NodeKind::Prop, Some("a")).unwrap();
    let c3 = graph.create_node(Some(c1), NodeKind::Cut, None).unwrap();
    let before = graph.node_count();

    let pasted = graph.iterate(c3, c1).unwrap();
    assert_eq!(pasted.len(), 1);
    assert_eq!(graph.node_count(), before + 3);
    assert_eq!(graph.parent(pasted[0]).unwrap(), Some(c3));
    assert_eq!(graph.depth(pasted[0]).unwrap(), 3);
    assert_eq!(graph.children(pasted[0]).unwrap().len(), 2);
    graph.verify_invariants().unwrap();
}

#[test]
fn deiteration_finds_outer_duplicate() {
    let (mut graph, root) = sheet_with(GraphConfig::default());
    let cut = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
    let inner = graph.create_node(Some(cut), NodeKind::Prop, Some("a")).unwrap();
    let outer = graph.create_node(Some(root), NodeKind::Prop, Some("a")).unwrap();

    assert!(graph.can_deiterate(inner));
    graph.erase(outer).unwrap();
    assert!(!graph.can_deiterate(inner));
    assert_eq!(
        graph.check_deiterate(inner).unwrap_err().info().code,
        "no-duplicate"
    );
    assert_eq!(
        graph.check_deiterate(root).unwrap_err().info().code,
        "no-parent"
    );
}

#[test]
fn deiteration_removes_one_of_two_siblings() {
    let (mut graph, root) = sheet_with(GraphConfig::default());
    let cut = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
    let first = graph.create_node(Some(cut), NodeKind::Cut, None).unwrap();
    graph.create_node(Some(first), NodeKind::Prop, Some("b")).unwrap();
    let second = graph.create_node(Some(cut), NodeKind::Cut, None).unwrap();
    graph.create_node(Some(second), NodeKind::Prop, Some("b")).unwrap();

    assert!(graph.can_deiterate(second));
    graph.deiterate(second).unwrap();
    assert_eq!(graph.children(cut).unwrap(), &[first]);
    assert!(!graph.can_deiterate(first));
    graph.verify_invariants().unwrap();
}

#[test]
fn duplicates_in_sibling_cuts_do_not_authorize_deiteration() {
    let enclosing = GraphConfig {
        deiteration_scope: DeiterationScope::Enclosing,
        ..GraphConfig::default()
    };
    for config in [GraphConfig::default(), enclosing] {
        let (mut graph, root) = sheet_with(config);
        let c1 = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        let a1 = graph.create_node(Some(c1), NodeKind::Prop, Some("a")).unwrap();
        let c2 = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        let a2 = graph.create_node(Some(c2), NodeKind::Prop, Some("a")).unwrap();

        assert!(!graph.can_deiterate(a1));
        assert!(!graph.can_deiterate(a2));
        assert_eq!(
            graph.check_deiterate(a1).unwrap_err().info().code,
            "no-duplicate"
        );
    }
}

#[test]
fn area_scope_searches_nested_cuts_of_the_parent() {
    let enclosing = GraphConfig {
        deiteration_scope: DeiterationScope::Enclosing,
        ..GraphConfig::default()
    };
    for (config, expected) in [(GraphConfig::default(), true), (enclosing, false)] {
        let (mut graph, root) = sheet_with(config);
        let c = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        let shallow = graph.create_node(Some(c), NodeKind::Prop, Some("a")).unwrap();
        let e = graph.create_node(Some(c), NodeKind::Cut, None).unwrap();
        graph.create_node(Some(e), NodeKind::Prop, Some("a")).unwrap();
        assert_eq!(graph.can_deiterate(shallow), expected);
    }
}

#[test]
fn area_scope_ignores_branches_beside_the_lineage() {
    let (mut graph, root) = sheet_with(GraphConfig::default());
    let c = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
    let nested = graph.create_node(Some(c), NodeKind::Cut, None).unwrap();
    let candidate = graph.create_node(Some(nested), NodeKind::Prop, Some("a")).unwrap();
    let side = graph.create_node(Some(c), NodeKind::Cut, None).unwrap();
    graph.create_node(Some(side), NodeKind::Prop, Some("a")).unwrap();

    assert!(!graph.can_deiterate(candidate));
    graph.create_node(Some(c), NodeKind::Prop, Some("a")).unwrap();
    assert!(graph.can_deiterate(candidate));
}

#[test]
fn enclosing_scope_accepts_outer_duplicate() {
    let config = GraphConfig {
        deiteration_scope: DeiterationScope::Enclosing,
        ..GraphConfig::default()
    };
    let (mut graph, root) = sheet_with(config);
    let cut = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
    let nested = graph.create_node(Some(cut), NodeKind::Cut, None).unwrap();
    let inner = graph.create_node(Some(nested), NodeKind::Prop, Some("a")).unwrap();
    graph.create_node(Some(root), NodeKind::Prop, Some("a")).unwrap();

    assert!(graph.can_deiterate(inner));
    graph.deiterate(inner).unwrap();
    assert!(graph.children(nested).unwrap().is_empty());
    graph.verify_invariants().unwrap();
}

#[test]
fn subtree_search_terminates_on_misses() {
    let (mut graph, root) = sheet_with(GraphConfig::default());
    let mut area = root;
    for _ in 0..6 {
        area = graph.create_node(Some(area), NodeKind::Cut, None).unwrap();
        graph.create_node(Some(area), NodeKind::Prop, Some("p")).unwrap();
    }
    let deepest = area;
    let target = graph.create_node(Some(deepest), NodeKind::Prop, Some("q")).unwrap();

    assert!(graph.find_equal_in_subtree(root, target).unwrap());
    assert!(graph.find_equal_in_subtree(deepest, target).unwrap());
    graph.delete_node(target).unwrap();
    let missing = graph.create_node(Some(root), NodeKind::Prop, Some("q")).unwrap();
    assert!(!graph.find_equal_in_subtree(deepest, missing).unwrap());
    assert!(graph.find_equal_in_subtree(root, missing).unwrap());
}
