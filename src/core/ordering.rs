use crate::core::accessor::Accessor;
use crate::domain::model::{display_value, Record};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    /// `name` sorts ascending, `-name` descending. Blank input means no ordering.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (column, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (raw, false),
        };
        if column.is_empty() {
            return None;
        }
        Some(Self {
            column: column.to_string(),
            descending,
        })
    }

    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: true,
        }
    }

    /// Query string form, `-` prefixed when descending.
    pub fn as_param(&self) -> String {
        if self.descending {
            format!("-{}", self.column)
        } else {
            self.column.clone()
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            column: self.column.clone(),
            descending: !self.descending,
        }
    }
}

/// Natural ordering of two present values.
///
/// Numbers compare numerically, strings lexically, booleans false < true and
/// objects/arrays by their display text. Values of different kinds order by
/// kind: bool < number < string < object/array.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(0.0);
                    let y = y.as_f64().unwrap_or(0.0);
                    x.total_cmp(&y)
                }
            },
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => kind_rank(a)
            .cmp(&kind_rank(b))
            .then_with(|| display_value(a).cmp(&display_value(b))),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) | Value::Object(_) => 4,
    }
}

/// Stable sort of `rows` by `accessor`. Missing values, including values with
/// nothing to display (`{"name": null}`, `[]`), go last when ascending and
/// first when descending.
pub fn sort_records(rows: &mut [Record], accessor: &Accessor, descending: bool) {
    rows.sort_by(|a, b| {
        let ordering = match (sort_key(accessor, a), sort_key(accessor, b)) {
            (Some(x), Some(y)) => compare_values(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn sort_key<'r>(accessor: &Accessor, record: &'r Record) -> Option<&'r Value> {
    accessor
        .resolve(record)
        .filter(|value| display_value(value).is_some())
}
