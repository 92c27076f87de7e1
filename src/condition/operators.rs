/// A numeric comparison selected by operator symbol.
pub type ComparisonFn = fn(f64, f64) -> bool;

fn eq(a: f64, b: f64) -> bool {
    a == b
}

fn ne(a: f64, b: f64) -> bool {
    a != b
}

fn lt(a: f64, b: f64) -> bool {
    a < b
}

fn gt(a: f64, b: f64) -> bool {
    a > b
}

fn le(a: f64, b: f64) -> bool {
    a <= b
}

fn ge(a: f64, b: f64) -> bool {
    a >= b
}

const COMPARISONS: &[(&str, ComparisonFn)] = &[
    ("=", eq),
    ("==", eq),
    ("!=", ne),
    ("<", lt),
    (">", gt),
    ("<=", le),
    (">=", ge),
];

/// Looks up the comparison for an operator symbol.
pub fn comparison(operator: &str) -> Option<ComparisonFn> {
    COMPARISONS
        .iter()
        .find(|(symbol, _)| *symbol == operator)
        .map(|(_, op)| *op)
}
