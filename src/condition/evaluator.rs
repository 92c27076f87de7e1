use super::Condition;
use super::lookup::{CatalogLookup, InventoryLookup};
use super::operators::comparison;
use crate::error::EvaluationError;
use crate::order::{LineItem, Order, id_from_value, normalize_id};
use ahash::AHashSet;
use serde_json::Value;

/// The collaborators a condition may consult while it is evaluated.
#[derive(Clone, Copy, Default)]
pub struct EvalContext<'a> {
    pub inventory: Option<&'a dyn InventoryLookup>,
    pub catalog: Option<&'a dyn CatalogLookup>,
}

/// A condition whose evaluation failed and was treated as false.
#[derive(Debug, Clone, PartialEq)]
pub struct SuppressedEvaluation {
    pub node_id: String,
    pub condition: String,
    pub error: EvaluationError,
}

type FieldEvaluator = fn(&Condition, &Order, &EvalContext<'_>) -> Result<bool, EvaluationError>;

fn field_evaluator(field: &str) -> Option<FieldEvaluator> {
    match field {
        "tag" => Some(eval_tag),
        "price" => Some(eval_price),
        "stock" => Some(eval_stock),
        "line_items" => Some(eval_line_items),
        "line_items-length" => Some(eval_length),
        _ => None,
    }
}

/// Evaluates a condition against an order or a partial order.
pub fn evaluate(
    condition: &Condition,
    order: &Order,
    ctx: &EvalContext<'_>,
) -> Result<bool, EvaluationError> {
    let evaluator = field_evaluator(&condition.field)
        .ok_or_else(|| EvaluationError::UnknownField(condition.field.clone()))?;
    evaluator(condition, order, ctx)
}

/// Evaluates a condition, turning any error into `false`.
///
/// The error is logged and pushed onto `suppressed` so the caller can report it.
pub fn evaluate_or_false(
    node_id: &str,
    condition: &Condition,
    order: &Order,
    ctx: &EvalContext<'_>,
    suppressed: &mut Vec<SuppressedEvaluation>,
) -> bool {
    match evaluate(condition, order, ctx) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::warn!(
                node_id,
                condition = %condition,
                %error,
                "condition evaluation failed, treating it as false"
            );
            suppressed.push(SuppressedEvaluation {
                node_id: node_id.to_string(),
                condition: condition.encoded().to_string(),
                error,
            });
            false
        }
    }
}

// --- Field evaluators ---

fn eval_tag(c: &Condition, order: &Order, _: &EvalContext<'_>) -> Result<bool, EvaluationError> {
    let name = match c.value.get("name") {
        Some(Value::String(name)) => name,
        Some(other) => return Err(type_mismatch(c, "string", other)),
        None => return Err(missing_key(c, "name")),
    };
    match membership(c)? {
        Membership::Contains => Ok(order.tags.contains(name)),
        Membership::NotContains => Ok(!order.tags.contains(name)),
        Membership::FullMatch => Err(unknown_operator(c)),
    }
}

fn eval_price(c: &Condition, order: &Order, _: &EvalContext<'_>) -> Result<bool, EvaluationError> {
    let price = order
        .price
        .ok_or(EvaluationError::MissingOrderAttribute("price"))?;
    let expected = c.value.get("name").ok_or_else(|| missing_key(c, "name"))?;
    compare(c, price, number(c, expected)?)
}

fn eval_stock(c: &Condition, _: &Order, ctx: &EvalContext<'_>) -> Result<bool, EvaluationError> {
    let inventory = ctx
        .inventory
        .ok_or(EvaluationError::MissingCollaborator("inventory"))?;
    let variant_id = nested_id(c, &["variant"], "variant.id")?;
    let location_id = nested_id(c, &["location", "pharmacy"], "location.id")?;
    let expected = expected_stock(c)?;
    let current = inventory.stock(&variant_id, &location_id)?;
    compare(c, current as f64, expected as f64)
}

fn eval_line_items(
    c: &Condition,
    order: &Order,
    ctx: &EvalContext<'_>,
) -> Result<bool, EvaluationError> {
    let membership = membership(c)?;
    let match_type = match c.value.get("type") {
        Some(Value::String(t)) => t.as_str(),
        Some(other) => return Err(type_mismatch(c, "string", other)),
        None => return Err(missing_key(c, "type")),
    };

    let (valid_ids, key): (AHashSet<String>, ItemKey) = match match_type {
        "collection" => {
            let catalog = ctx
                .catalog
                .ok_or(EvaluationError::MissingCollaborator("catalog"))?;
            let collection_id = id_at(c, "id")?;
            let products = catalog
                .products_in(&collection_id)?
                .into_iter()
                .map(|id| normalize_id(&id).to_string())
                .collect();
            (products, ItemKey::Product)
        }
        "product_variant" => (single(id_at(c, "variant_id")?), ItemKey::Variant),
        "product" => (single(id_at(c, "id")?), ItemKey::Product),
        other => return Err(EvaluationError::UnknownLineItemType(other.to_string())),
    };

    let matches = |item: &LineItem| {
        key.of(item)
            .map(|id| valid_ids.contains(id))
            .unwrap_or(false)
    };

    let items = &order.line_items;
    Ok(match membership {
        Membership::Contains => items.iter().any(matches),
        Membership::NotContains => !items.iter().any(matches),
        Membership::FullMatch => items.iter().all(matches),
    })
}

fn eval_length(c: &Condition, order: &Order, _: &EvalContext<'_>) -> Result<bool, EvaluationError> {
    let expected = match &c.value {
        Value::Object(map) => map.get("value").ok_or_else(|| missing_key(c, "value"))?,
        bare => bare,
    };
    compare(c, order.line_items.len() as f64, number(c, expected)?)
}

// --- Helpers ---

enum Membership {
    Contains,
    NotContains,
    FullMatch,
}

fn membership(c: &Condition) -> Result<Membership, EvaluationError> {
    match c.operator.as_str() {
        "contains" => Ok(Membership::Contains),
        "not contains" | "not-contains" | "not_contains" => Ok(Membership::NotContains),
        "full match" | "full-match" | "full_match" => Ok(Membership::FullMatch),
        _ => Err(unknown_operator(c)),
    }
}

#[derive(Clone, Copy)]
enum ItemKey {
    Product,
    Variant,
}

impl ItemKey {
    fn of(self, item: &LineItem) -> Option<&String> {
        match self {
            ItemKey::Product => item.product_id.as_ref(),
            ItemKey::Variant => item.variant_id.as_ref(),
        }
    }
}

fn single(id: String) -> AHashSet<String> {
    std::iter::once(id).collect()
}

fn compare(c: &Condition, lhs: f64, rhs: f64) -> Result<bool, EvaluationError> {
    let op = comparison(&c.operator).ok_or_else(|| unknown_operator(c))?;
    Ok(op(lhs, rhs))
}

fn number(c: &Condition, value: &Value) -> Result<f64, EvaluationError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| type_mismatch(c, "number", value)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| type_mismatch(c, "number", value)),
        other => Err(type_mismatch(c, "number", other)),
    }
}

fn integer(c: &Condition, value: &Value) -> Result<i64, EvaluationError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| type_mismatch(c, "integer", value)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| type_mismatch(c, "integer", value)),
        other => Err(type_mismatch(c, "integer", other)),
    }
}

/// The expected stock level. Flows store it as a number, as `{"id": n}`, or as
/// that object encoded into a JSON string.
fn expected_stock(c: &Condition) -> Result<i64, EvaluationError> {
    let raw = c.value.get("value").ok_or_else(|| missing_key(c, "value"))?;
    let decoded;
    let target = match raw {
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s)
                .map_err(|_| type_mismatch(c, "integer", raw))?;
            &decoded
        }
        other => other,
    };
    let target = match target {
        Value::Object(map) => map.get("id").ok_or_else(|| missing_key(c, "value.id"))?,
        other => other,
    };
    integer(c, target)
}

fn id_at(c: &Condition, key: &'static str) -> Result<String, EvaluationError> {
    let value = c.value.get(key).ok_or_else(|| missing_key(c, key))?;
    id_from_value(value).ok_or_else(|| type_mismatch(c, "id", value))
}

/// Reads `<object>.id` from the first of `objects` that carries an id.
fn nested_id(
    c: &Condition,
    objects: &[&str],
    key: &'static str,
) -> Result<String, EvaluationError> {
    let id = objects
        .iter()
        .find_map(|name| c.value.get(*name)?.get("id"))
        .ok_or_else(|| missing_key(c, key))?;
    id_from_value(id).ok_or_else(|| type_mismatch(c, "id", id))
}

fn type_mismatch(c: &Condition, expected: &'static str, found: &Value) -> EvaluationError {
    EvaluationError::TypeMismatch {
        field: c.field.clone(),
        expected,
        found: found.clone(),
    }
}

fn missing_key(c: &Condition, key: &'static str) -> EvaluationError {
    EvaluationError::MissingKey {
        field: c.field.clone(),
        key,
    }
}

fn unknown_operator(c: &Condition) -> EvaluationError {
    EvaluationError::UnknownOperator {
        field: c.field.clone(),
        operator: c.operator.clone(),
    }
}
