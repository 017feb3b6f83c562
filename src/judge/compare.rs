//! Produced-vs-expected comparison
//!
//! Top-level lists compare as multisets, since several problems accept any
//! ordering of a correct answer. Everything else, including list elements,
//! compares structurally. Numbers compare by value so `1` matches `1.0`.

use serde_json::{Number, Value};

/// Whether the candidate's value satisfies the expectation
pub fn outputs_match(produced: &Value, expected: &Value) -> bool {
    match (produced, expected) {
        (Value::Array(got), Value::Array(want)) => same_multiset(got, want),
        _ => values_equal(produced, expected),
    }
}

/// Exact structural equality with numeric normalization
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn same_multiset(got: &[Value], want: &[Value]) -> bool {
    if got.len() != want.len() {
        return false;
    }

    let mut used = vec![false; got.len()];
    for expected in want {
        let slot = got
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && values_equal(candidate, expected));
        match slot {
            Some(i) => used[i] = true,
            None => return false,
        }
    }
    true
}
