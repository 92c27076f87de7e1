//! Common test utilities for building flows and orders.
use hassou::flow::{BranchLabel, FlowEdgeDefinition, FlowNodeDefinition};
use hassou::prelude::*;

#[allow(dead_code)]
pub fn node(id: &str, node_type: &str, label: &str) -> FlowNodeDefinition {
    FlowNodeDefinition {
        id: id.to_string(),
        node_type: node_type.to_string(),
        label: label.to_string(),
        data: serde_json::Value::Null,
    }
}

#[allow(dead_code)]
pub fn edge(source: &str, target: &str, label: Option<&str>) -> FlowEdgeDefinition {
    FlowEdgeDefinition {
        source: source.to_string(),
        target: target.to_string(),
        label: label.map(BranchLabel::from),
    }
}

/// `start -> condition(tag contains "vip")`, YES: loc1, NO: loc2.
#[allow(dead_code)]
pub fn vip_flow() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("1", "start", "Start"),
            node("2", "condition", r#"tag|contains|{"name":"vip"}"#),
            node("3", "fulfill", "loc1|standard|{}"),
            node("4", "fulfill", "loc2|standard|{}"),
        ],
        edges: vec![
            edge("1", "2", None),
            edge("2", "3", Some("YES")),
            edge("2", "4", Some("NO")),
        ],
    }
}

/// `start -> split(product 42)`, YES: locA, NO: locB.
#[allow(dead_code)]
pub fn product_split_flow() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("1", "start", "Start"),
            node("2", "split", r#"|contains|{"type":"product","id":42}"#),
            node("3", "fulfill", "locA|x|{}"),
            node("4", "fulfill", "locB|y|{}"),
        ],
        edges: vec![
            edge("1", "2", None),
            edge("2", "3", Some("YES")),
            edge("2", "4", Some("NO")),
        ],
    }
}

/// Two chained conditions, no splits:
///
/// ```text
/// start -> price > 100 ? (tag vip ? express : standard) : economy
/// ```
#[allow(dead_code)]
pub fn price_tier_flow() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("1", "start", "Start"),
            node("2", "condition", r#"price|>|{"name":100}"#),
            node("3", "condition", r#"tag|contains|{"name":"vip"}"#),
            node("4", "fulfill", r#"{"id":"wh-1"}|express|{"carrier":"dhl"}"#),
            node("5", "fulfill", r#"{"id":"wh-1"}|standard|"#),
            node("6", "fulfill", "wh-2|economy|{}"),
        ],
        edges: vec![
            edge("1", "2", None),
            edge("2", "3", Some("YES")),
            edge("2", "6", Some("NO")),
            edge("3", "4", Some("YES")),
            edge("3", "5", Some("NO")),
        ],
    }
}

#[allow(dead_code)]
pub fn items(product_ids: &[&str]) -> Vec<LineItem> {
    product_ids.iter().map(|id| LineItem::for_product(id)).collect()
}

/// The flow editor's own JSON format.
#[allow(dead_code)]
pub const EDITOR_FLOW_JSON: &str = r#"{
    "nodes": [
        { "id": "1", "type": "start", "data": { "label": "Start" }, "position": { "x": 0, "y": 0 } },
        { "id": "2", "type": "condition", "data": { "label": "line_items-length|>=|{\"value\":3}" } },
        { "id": "3", "type": "fullfill", "data": { "label": "bulk-hub|freight|{\"pallets\":1}" } },
        { "id": "4", "type": "fulfill", "data": { "label": "store-7|parcel|" } }
    ],
    "edges": [
        { "source": "1", "target": "2" },
        { "source": "2", "target": "3", "label": "YES" },
        { "source": "2", "target": "4", "label": "NO" }
    ]
}"#;
