//! Entry-point discovery
//!
//! Convention: the function named by the problem's documented entry point, if
//! the submission defines it at top level. Otherwise the submission must define
//! exactly one top-level function, which is taken as the solution. Anything
//! else (no functions, several candidates without the documented name) is
//! reported as "entry point not found".

use std::sync::LazyLock;

use regex::Regex;

static PYTHON_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:async[ \t]+)?def[ \t]+([A-Za-z_][A-Za-z0-9_]*)[ \t]*\(")
        .expect("valid python def pattern")
});

static JS_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:async[ \t]+)?function[ \t]*\*?[ \t]*([A-Za-z_$][A-Za-z0-9_$]*)[ \t]*\(",
    )
    .expect("valid javascript function pattern")
});

static JS_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:const|let|var)[ \t]+([A-Za-z_$][A-Za-z0-9_$]*)[ \t]*=[ \t]*(?:async[ \t]*)?(?:function\b|\([^)]*\)[ \t]*=>|[A-Za-z_$][A-Za-z0-9_$]*[ \t]*=>)",
    )
    .expect("valid javascript binding pattern")
});

/// Apply the convention to a list of discovered names
pub fn select(defined: &[String], documented: &str) -> Option<String> {
    if defined.iter().any(|name| name == documented) {
        return Some(documented.to_string());
    }
    match defined {
        [only] => Some(only.clone()),
        _ => None,
    }
}

/// Top-level `def` statements (column zero) in Python source
pub fn python_functions(code: &str) -> Vec<String> {
    dedup(PYTHON_DEF.captures_iter(code).map(|c| c[1].to_string()))
}

/// Top-level function declarations and function-valued bindings in JavaScript source
pub fn javascript_functions(code: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = JS_FUNCTION
        .captures_iter(code)
        .chain(JS_BINDING.captures_iter(code))
        .filter_map(|c| c.get(1).map(|m| (m.start(), m.as_str().to_string())))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    dedup(found.into_iter().map(|(_, name)| name))
}

fn dedup(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
