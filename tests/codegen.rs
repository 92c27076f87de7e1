//! Tests for the tree builder, the code generator and compiled programs.
mod common;
use common::*;
use hassou::condition::EvalContext;
use hassou::error::{ArtifactError, TreeIntegrityError};
use hassou::prelude::*;

fn lists(entries: &[(&str, Vec<&str>)]) -> ItemLists {
    entries
        .iter()
        .map(|(name, ids)| (name.to_string(), ids.iter().map(|id| id.to_string()).collect()))
        .collect()
}

/// `start -> split(list "summer")`, YES: pickup, NO: ship.
fn list_split_flow(list_name: &str) -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("1", "start", "Start"),
            node("2", "split", list_name),
            node("3", "fulfill", "store|pickup|{}"),
            node("4", "fulfill", "warehouse|ship|{}"),
        ],
        edges: vec![
            edge("1", "2", None),
            edge("2", "3", Some("YES")),
            edge("2", "4", Some("NO")),
        ],
    }
}

#[test]
fn test_tree_assigns_yes_left_and_no_right() {
    let tree = BinaryTree::from_flow(&vip_flow()).unwrap();

    let root = tree.root();
    assert_eq!(root.id, "1");
    let condition = tree.left(root).unwrap();
    assert_eq!(condition.id, "2");
    assert!(tree.right(root).is_none());
    assert_eq!(tree.left(condition).unwrap().id, "3");
    assert_eq!(tree.right(condition).unwrap().id, "4");
}

#[test]
fn test_tree_slot_rules_do_not_depend_on_edge_order() {
    let mut flow = vip_flow();
    flow.edges.swap(1, 2); // NO edge first

    let tree = BinaryTree::from_flow(&flow).unwrap();
    let condition = tree.node_by_id("2").unwrap();
    assert_eq!(tree.left(condition).unwrap().id, "3");
    assert_eq!(tree.right(condition).unwrap().id, "4");
}

#[test]
fn test_tree_unlabeled_edges_fill_left_then_right() {
    let flow = FlowDefinition {
        nodes: vec![
            node("1", "start", "Start"),
            node("2", "condition", r#"tag|contains|{"name":"vip"}"#),
            node("3", "fulfill", "a|s|"),
            node("4", "fulfill", "b|s|"),
        ],
        edges: vec![edge("1", "2", None), edge("2", "4", None), edge("2", "3", Some("True"))],
    };

    let tree = BinaryTree::from_flow(&flow).unwrap();
    let condition = tree.node_by_id("2").unwrap();
    assert_eq!(tree.left(condition).unwrap().id, "3");
    assert_eq!(tree.right(condition).unwrap().id, "4");
}

#[test]
fn test_tree_rejects_too_many_children() {
    let mut flow = vip_flow();
    flow.nodes.push(node("5", "fulfill", "c|s|"));
    flow.edges.push(edge("2", "5", None));

    assert_eq!(
        BinaryTree::from_flow(&flow),
        Err(TreeIntegrityError::TooManyChildren {
            node_id: "2".to_string()
        })
    );
}

#[test]
fn test_tree_rejects_conflicting_branches() {
    let mut flow = vip_flow();
    flow.edges[2].label = flow.edges[1].label.clone(); // two YES edges

    assert_eq!(
        BinaryTree::from_flow(&flow),
        Err(TreeIntegrityError::ConflictingBranch {
            node_id: "2".to_string(),
            branch: "true",
        })
    );
}

#[test]
fn test_tree_rejects_cycles() {
    let flow = FlowDefinition {
        nodes: vec![
            node("1", "start", "Start"),
            node("2", "condition", r#"tag|contains|{"name":"vip"}"#),
            node("3", "fulfill", "a|s|"),
        ],
        edges: vec![
            edge("1", "2", None),
            edge("2", "1", Some("YES")),
            edge("2", "3", Some("NO")),
        ],
    };

    assert_eq!(
        BinaryTree::from_flow(&flow),
        Err(TreeIntegrityError::Cycle("1".to_string()))
    );
}

#[test]
fn test_tree_requires_single_start_child() {
    let mut two_children = vip_flow();
    two_children.edges.push(edge("1", "3", None));
    assert_eq!(
        BinaryTree::from_flow(&two_children),
        Err(TreeIntegrityError::InvalidStartEdges {
            node_id: "1".to_string(),
            found: 2,
        })
    );

    let mut no_children = vip_flow();
    no_children.edges.remove(0);
    assert!(matches!(
        BinaryTree::from_flow(&no_children),
        Err(TreeIntegrityError::InvalidStartEdges { found: 0, .. })
    ));
}

#[test]
fn test_tree_allows_shared_subtrees() {
    let mut flow = vip_flow();
    flow.edges[2].target = "3".to_string(); // both branches to the same node

    let tree = BinaryTree::from_flow(&flow).expect("a shared child is not a cycle");
    let condition = tree.node_by_id("2").unwrap();
    assert_eq!(tree.left(condition), tree.right(condition));
}

#[test]
fn test_tree_propagates_graph_errors() {
    let mut flow = vip_flow();
    flow.edges.push(edge("2", "ghost", None));

    assert!(matches!(
        BinaryTree::from_flow(&flow),
        Err(TreeIntegrityError::Graph(GraphIntegrityError::NodeNotFound { .. }))
    ));
}

#[test]
fn test_tree_render() {
    let tree = BinaryTree::from_flow(&vip_flow()).unwrap();
    let expected = concat!(
        "root: Start (1)\n",
        "    left: tag|contains|{\"name\":\"vip\"} (2)\n",
        "        left: loc1|standard|{} (3)\n",
        "        right: loc2|standard|{} (4)\n",
    );
    assert_eq!(tree.render(), expected);
}

#[test]
fn test_generate_condition_program() {
    let tree = BinaryTree::from_flow(&vip_flow()).unwrap();
    let program = generate(&tree, &ItemLists::default());

    let expected = concat!(
        "if tag|contains|{\"name\":\"vip\"}:\n",
        "    fulfill(\"loc1|standard|{}\")\n",
        "else:\n",
        "    fulfill(\"loc2|standard|{}\")\n",
    );
    assert_eq!(program.text, expected);
    assert!(program.diagnostics.is_empty());
}

#[test]
fn test_generate_nested_program() {
    let tree = BinaryTree::from_flow(&price_tier_flow()).unwrap();
    let program = generate(&tree, &ItemLists::default());

    let expected = concat!(
        "if price|>|{\"name\":100}:\n",
        "    if tag|contains|{\"name\":\"vip\"}:\n",
        "        fulfill(\"{\\\"id\\\":\\\"wh-1\\\"}|express|{\\\"carrier\\\":\\\"dhl\\\"}\")\n",
        "    else:\n",
        "        fulfill(\"{\\\"id\\\":\\\"wh-1\\\"}|standard|\")\n",
        "else:\n",
        "    fulfill(\"wh-2|economy|{}\")\n",
    );
    assert_eq!(program.text, expected);
}

#[test]
fn test_generate_split_program() {
    let tree = BinaryTree::from_flow(&list_split_flow("summer")).unwrap();
    let program = generate(&tree, &lists(&[("summer", vec!["5", "6"])]));

    let expected = concat!(
        "if any(item in [\"5\", \"6\"] for item in order.items):\n",
        "    fulfill(\"store|pickup|{}\")\n",
        "else:\n",
        "    fulfill(\"warehouse|ship|{}\")\n",
    );
    assert_eq!(program.text, expected);
    assert!(program.diagnostics.is_empty());
}

#[test]
fn test_generate_omits_split_with_unknown_list() {
    let tree = BinaryTree::from_flow(&list_split_flow("winter")).unwrap();
    let program = generate(&tree, &lists(&[("summer", vec!["5"])]));

    assert_eq!(program.text, "pass\n");
    assert_eq!(program.diagnostics.len(), 1);
    assert_eq!(program.diagnostics[0].node_id, "2");
    assert!(program.diagnostics[0].message.contains("winter"));
}

#[test]
fn test_generate_omits_split_without_list_name() {
    let tree = BinaryTree::from_flow(&list_split_flow("")).unwrap();
    let program = generate(&tree, &ItemLists::default());

    assert_eq!(program.text, "pass\n");
    assert_eq!(program.diagnostics.len(), 1);
    assert!(program.diagnostics[0].message.contains("no list name"));
}

#[test]
fn test_generate_fills_empty_branches_with_pass() {
    let mut flow = vip_flow();
    flow.edges.pop(); // drop the NO edge

    let tree = BinaryTree::from_flow(&flow).unwrap();
    let program = generate(&tree, &ItemLists::default());

    assert!(program.text.ends_with("else:\n    pass\n"));
}

#[test]
fn test_program_matches_interpreter_without_splits() {
    let flow = price_tier_flow();
    let interpreter = FlowInterpreter::new(FlowGraph::load(&flow).unwrap()).unwrap();
    let program = CompiledProgram::new(BinaryTree::from_flow(&flow).unwrap(), ItemLists::default())
        .unwrap();

    let orders = [
        Order::new(items(&["1"])).with_tags(["vip"]).with_price(150.0),
        Order::new(items(&["1"])).with_price(150.0),
        Order::new(items(&["1", "2"])).with_tags(["vip"]).with_price(20.0),
        Order::new(items(&["1"])), // no price: both strategies treat the condition as false
    ];
    for order in &orders {
        let routed = interpreter.run(order).unwrap();
        let run = program.execute(order, &EvalContext::default());

        assert_eq!(routed.results.len(), 1);
        let terminal = run.terminal.expect("program should reach a fulfill node");
        assert_eq!(terminal.node_id, routed.results[0].node_id);
        assert_eq!(run.suppressed, routed.suppressed);
    }
}

#[test]
fn test_program_split_tests_the_whole_order() {
    let lists = lists(&[("summer", vec!["5"])]);
    let program = CompiledProgram::new(
        BinaryTree::from_flow(&list_split_flow("summer")).unwrap(),
        lists,
    )
    .unwrap();
    let ctx = EvalContext::default();

    // One matching item sends the whole order left.
    let mixed = Order::new(items(&["5", "9"]));
    assert_eq!(program.execute(&mixed, &ctx).terminal.unwrap().node_id, "3");

    let none = Order::new(items(&["9"]));
    assert_eq!(program.execute(&none, &ctx).terminal.unwrap().node_id, "4");

    // Skus and variants count too.
    let by_sku = Order::new(vec![LineItem::for_product("9").with_sku("5")]);
    assert_eq!(program.execute(&by_sku, &ctx).terminal.unwrap().node_id, "3");
}

#[test]
fn test_program_with_omitted_split_reaches_nothing() {
    let program = CompiledProgram::new(
        BinaryTree::from_flow(&list_split_flow("winter")).unwrap(),
        ItemLists::default(),
    )
    .unwrap();

    let run = program.execute(&Order::new(items(&["5"])), &EvalContext::default());
    assert!(run.terminal.is_none());
}

#[test]
fn test_program_rejects_malformed_condition() {
    let mut flow = vip_flow();
    flow.nodes[1].label = "tag contains vip".to_string();
    let tree = BinaryTree::from_flow(&flow).unwrap();

    assert!(matches!(
        CompiledProgram::new(tree, ItemLists::default()),
        Err(ArtifactError::Condition(_))
    ));
}

#[test]
fn test_program_artifact_roundtrip() {
    let tree = BinaryTree::from_flow(&list_split_flow("summer")).unwrap();
    let program = CompiledProgram::new(tree, lists(&[("summer", vec!["5", "6"])])).unwrap();

    let bytes = program.to_bytes().unwrap();
    let restored = CompiledProgram::from_bytes(&bytes).unwrap();
    assert_eq!(restored.tree(), program.tree());
    assert_eq!(restored.lists(), program.lists());

    let path = std::env::temp_dir().join("hassou_program_roundtrip.bin");
    let path = path.to_str().unwrap();
    program.save(path).unwrap();
    let loaded = CompiledProgram::from_file(path).unwrap();
    let order = Order::new(items(&["6"]));
    assert_eq!(
        loaded.execute(&order, &EvalContext::default()),
        program.execute(&order, &EvalContext::default())
    );
    std::fs::remove_file(path).ok();
}

#[test]
fn test_program_artifact_errors() {
    assert!(matches!(
        CompiledProgram::from_bytes(&[0xff, 0x01]),
        Err(ArtifactError::Serialization(_))
    ));
    assert!(matches!(
        CompiledProgram::from_file("/nonexistent/dir/program.bin"),
        Err(ArtifactError::Io(_))
    ));
}

#[test]
fn test_deserialized_tree_rejects_dangling_children() {
    let json = r#"{"nodes":[{"id":"1","kind":"start","label":"Start","left":7,"right":null}],"root":0}"#;
    let err = serde_json::from_str::<BinaryTree>(json).unwrap_err();
    assert!(err.to_string().contains("#7"));

    let json = r#"{"nodes":[{"id":"1","kind":"start","label":"Start","left":null,"right":null}],"root":3}"#;
    assert!(serde_json::from_str::<BinaryTree>(json).is_err());
}

#[test]
fn test_corrupted_artifact_is_rejected() {
    #[derive(serde::Serialize)]
    struct RawNode {
        id: String,
        kind: NodeKind,
        label: String,
        left: Option<usize>,
        right: Option<usize>,
    }
    #[derive(serde::Serialize)]
    struct RawTree {
        nodes: Vec<RawNode>,
        root: usize,
    }
    #[derive(serde::Serialize)]
    struct RawArtifact {
        tree: RawTree,
        lists: std::collections::BTreeMap<String, Vec<String>>,
    }

    let artifact = RawArtifact {
        tree: RawTree {
            nodes: vec![RawNode {
                id: "1".to_string(),
                kind: NodeKind::Start,
                label: "Start".to_string(),
                left: Some(7),
                right: None,
            }],
            root: 0,
        },
        lists: Default::default(),
    };
    let bytes = bincode::serde::encode_to_vec(&artifact, bincode::config::standard()).unwrap();

    assert!(matches!(
        CompiledProgram::from_bytes(&bytes),
        Err(ArtifactError::Serialization(_))
    ));
}
