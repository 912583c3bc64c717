use anyhow::{anyhow, Result};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::query::TableQuery;
use crate::store::RecordSource;

/// In-process tables answering the same query shape as [`crate::RestSource`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Value>>,
}

impl MemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }
}

impl RecordSource for MemorySource {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Value>> {
        let rows = self.tables.get(&query.table).ok_or_else(|| anyhow!("unknown table '{}'", query.table))?;
        let mut out: Vec<&Value> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|(col, expected)| row.get(col).is_some_and(|v| matches_eq(v, expected))))
            .collect();
        out.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|col| compare(a.get(col), b.get(col)))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(out.into_iter().map(|row| project(row, &query.select)).collect())
    }
}

fn matches_eq(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

// Ascending with nulls last, like PostgREST's default.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().unwrap_or(f64::NAN).total_cmp(&y.as_f64().unwrap_or(f64::NAN))
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn project(row: &Value, select: &[String]) -> Value {
    match row {
        Value::Object(fields) if !select.is_empty() => {
            let picked: Map<String, Value> = select
                .iter()
                .filter_map(|col| fields.get(col).map(|v| (col.clone(), v.clone())))
                .collect();
            Value::Object(picked)
        }
        other => other.clone(),
    }
}
