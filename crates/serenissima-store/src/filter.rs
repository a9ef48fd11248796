//! Query filters: one AST, two interpretations.
//!
//! The hosted Record Store takes queries as formula strings in a
//! field-comparison DSL (`AND({citizen}='TechnoMedici', {status}='created')`).
//! Building those strings inline invites quoting bugs and ties every query
//! to the wire syntax, so queries here are built as a small [`Filter`] AST:
//!
//! - [`Filter::render`] produces the formula string for the HTTP backend;
//! - [`Filter::matches`] evaluates the same filter against an in-memory
//!   row, for the memory backend.
//!
//! A query exercised in tests against the memory backend therefore has the
//! same semantics on the wire.

use serde_json::Value;

/// A comparison or combination of comparisons over record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every record.
    All,
    /// Field equals a value.
    Eq(String, Value),
    /// Field does not equal a value.
    Ne(String, Value),
    /// Field is strictly greater than a value.
    Gt(String, Value),
    /// Field is less than or equal to a value.
    Lte(String, Value),
    /// Every sub-filter matches.
    And(Vec<Filter>),
    /// At least one sub-filter matches.
    Or(Vec<Filter>),
}

impl Filter {
    /// Field-equals-value comparison.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Field-not-equals-value comparison.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne(field.into(), value.into())
    }

    /// Field-strictly-greater-than comparison.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(field.into(), value.into())
    }

    /// Field-less-than-or-equal comparison. Timestamps compare correctly
    /// because all timestamps are stored as RFC 3339 UTC strings, which
    /// order lexicographically.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte(field.into(), value.into())
    }

    /// Conjunction of filters.
    pub fn and(filters: impl IntoIterator<Item = Self>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Disjunction of filters.
    pub fn or(filters: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Render the filter as a formula string for the hosted store.
    pub fn render(&self) -> String {
        match self {
            Self::All => "TRUE()".to_owned(),
            Self::Eq(field, value) => format!("{{{field}}}={}", render_value(value)),
            Self::Ne(field, value) => format!("{{{field}}}!={}", render_value(value)),
            Self::Gt(field, value) => format!("{{{field}}}>{}", render_value(value)),
            Self::Lte(field, value) => format!("{{{field}}}<={}", render_value(value)),
            Self::And(filters) => render_combinator("AND", filters),
            Self::Or(filters) => render_combinator("OR", filters),
        }
    }

    /// Evaluate the filter against an in-memory record's fields object.
    ///
    /// A missing field never matches a comparison (mirroring the hosted
    /// store, where a blank cell compares unequal to every value).
    pub fn matches(&self, fields: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, value) => {
                fields.get(field).is_some_and(|actual| values_eq(actual, value))
            }
            Self::Ne(field, value) => {
                fields.get(field).is_some_and(|actual| !values_eq(actual, value))
            }
            Self::Gt(field, value) => fields
                .get(field)
                .is_some_and(|actual| compare(actual, value) == Some(core::cmp::Ordering::Greater)),
            Self::Lte(field, value) => fields.get(field).is_some_and(|actual| {
                matches!(
                    compare(actual, value),
                    Some(core::cmp::Ordering::Less | core::cmp::Ordering::Equal)
                )
            }),
            Self::And(filters) => filters.iter().all(|f| f.matches(fields)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(fields)),
        }
    }
}

/// Render one comparison value per the formula DSL's literal syntax.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Bool(true) => "TRUE()".to_owned(),
        Value::Bool(false) => "FALSE()".to_owned(),
        other => other.to_string(),
    }
}

/// Render `AND(...)`/`OR(...)` over sub-filters.
fn render_combinator(name: &str, filters: &[Filter]) -> String {
    let parts: Vec<String> = filters.iter().map(Filter::render).collect();
    format!("{name}({})", parts.join(", "))
}

/// Value equality with numeric coercion (`1` equals `1.0`).
fn values_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
        _ => a == b,
    }
}

/// Three-way comparison over numbers or strings; `None` if incomparable.
fn compare(a: &Value, b: &Value) -> Option<core::cmp::Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Some(x.cmp(y));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_the_formula_dsl() {
        let filter = Filter::and([
            Filter::eq("citizen", "TechnoMedici"),
            Filter::or([Filter::eq("status", "created"), Filter::eq("status", "in_progress")]),
        ]);
        assert_eq!(
            filter.render(),
            "AND({citizen}='TechnoMedici', OR({status}='created', {status}='in_progress'))"
        );
    }

    #[test]
    fn escapes_single_quotes() {
        let filter = Filter::eq("title", "dell'Arsenale");
        assert_eq!(filter.render(), "{title}='dell\\'Arsenale'");
    }

    #[test]
    fn renders_numbers_and_bools() {
        assert_eq!(Filter::gt("count", 5).render(), "{count}>5");
        assert_eq!(Filter::eq("is_ai", true).render(), "{is_ai}=TRUE()");
    }

    #[test]
    fn matches_mirrors_render_semantics() {
        let row = json!({"citizen": "TechnoMedici", "status": "created", "count": 18});
        assert!(Filter::eq("citizen", "TechnoMedici").matches(&row));
        assert!(!Filter::eq("citizen", "Foscari").matches(&row));
        assert!(Filter::gt("count", 10).matches(&row));
        assert!(!Filter::gt("count", 18).matches(&row));
        assert!(Filter::lte("count", 18).matches(&row));
        assert!(Filter::ne("status", "processed").matches(&row));
    }

    #[test]
    fn missing_fields_never_match_comparisons() {
        let row = json!({"citizen": "TechnoMedici"});
        assert!(!Filter::eq("status", "created").matches(&row));
        assert!(!Filter::ne("status", "created").matches(&row));
        assert!(Filter::All.matches(&row));
    }

    #[test]
    fn rfc3339_timestamps_order_lexicographically() {
        let row = json!({"end": "2026-08-30T10:00:00Z"});
        assert!(Filter::lte("end", "2026-08-30T12:00:00Z").matches(&row));
        assert!(!Filter::lte("end", "2026-08-30T09:00:00Z").matches(&row));
    }
}
