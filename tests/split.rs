//! Tests for partitioning line items at split nodes.
mod common;
use common::*;
use hassou::condition::{Condition, EvalContext};
use hassou::error::EvaluationError;
use hassou::prelude::*;
use hassou::split::split;

fn product_condition(id: u64) -> Condition {
    Condition::parse_split(&format!(r#"|contains|{{"type":"product","id":{}}}"#, id)).unwrap()
}

#[test]
fn test_split_partitions_items_in_order() {
    let order = Order::new(items(&["42", "7", "42", "8"]));
    let outcome = split("s1", &order, &product_condition(42), &EvalContext::default());

    let ids = |items: &[LineItem]| -> Vec<String> {
        items.iter().filter_map(|i| i.product_id.clone()).collect()
    };
    assert_eq!(ids(&outcome.matching), vec!["42", "42"]);
    assert_eq!(ids(&outcome.non_matching), vec!["7", "8"]);
    assert!(outcome.suppressed.is_empty());
}

#[test]
fn test_split_conserves_items() {
    let order = Order::new(vec![
        LineItem::for_product("42").with_quantity(3),
        LineItem::for_product("1").with_sku("A-1"),
        LineItem::for_product("42").with_variant("4201"),
    ]);
    let outcome = split("s1", &order, &product_condition(42), &EvalContext::default());

    let mut rejoined = outcome.matching.clone();
    rejoined.extend(outcome.non_matching.clone());
    assert_eq!(rejoined.len(), order.line_items.len());
    for item in &order.line_items {
        let in_matching = outcome.matching.contains(item);
        let in_non_matching = outcome.non_matching.contains(item);
        assert!(in_matching ^ in_non_matching, "item must land in exactly one half");
    }
}

#[test]
fn test_split_of_empty_order() {
    let outcome = split(
        "s1",
        &Order::default(),
        &product_condition(42),
        &EvalContext::default(),
    );
    assert!(outcome.matching.is_empty());
    assert!(outcome.non_matching.is_empty());
}

#[test]
fn test_split_evaluates_each_item_on_its_own() {
    // Full match over a singleton is a per-item test.
    let condition = Condition::parse_split(r#"|full match|{"type":"product","id":42}"#).unwrap();
    let order = Order::new(items(&["42", "7"]));
    let outcome = split("s1", &order, &condition, &EvalContext::default());

    assert_eq!(outcome.matching.len(), 1);
    assert_eq!(outcome.non_matching.len(), 1);
}

#[test]
fn test_split_failures_count_as_non_matching() {
    let condition = Condition::parse_split(r#"|contains|{"type":"collection","id":"summer"}"#).unwrap();
    let order = Order::new(items(&["1", "2"]));
    let outcome = split("s9", &order, &condition, &EvalContext::default());

    assert!(outcome.matching.is_empty());
    assert_eq!(outcome.non_matching.len(), 2);
    assert_eq!(outcome.suppressed.len(), 2);
    assert!(outcome.suppressed.iter().all(|s| s.node_id == "s9"
        && s.error == EvaluationError::MissingCollaborator("catalog")));
}

#[test]
fn test_split_items_keep_order_attributes() {
    // A tag condition on a split sees the parent's tags through every singleton.
    let condition = Condition::parse(r#"tag|contains|{"name":"vip"}"#).unwrap();
    let order = Order::new(items(&["1", "2"])).with_tags(["vip"]);
    let outcome = split("s1", &order, &condition, &EvalContext::default());

    assert_eq!(outcome.matching.len(), 2);
}
