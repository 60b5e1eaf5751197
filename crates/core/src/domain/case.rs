use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SLUG_COLUMN: &str = "slug";
pub const TITLE_COLUMN: &str = "titel";
pub const BODY_COLUMN: &str = "inhalt";

/// A row of the `kfz_vorgaenge` table, kept exactly as the store delivered
/// it. Nulls and non-string values survive so "data" mode echoes the row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseRecord {
    row: Map<String, Value>,
}

impl CaseRecord {
    pub fn from_row(row: Map<String, Value>) -> Self {
        Self { row }
    }

    pub fn row(&self) -> &Map<String, Value> {
        &self.row
    }

    pub fn slug(&self) -> Option<&str> {
        self.row.get(SLUG_COLUMN).and_then(Value::as_str)
    }

    pub fn title_text(&self) -> String {
        self.column_text(TITLE_COLUMN)
    }

    pub fn body_text(&self) -> String {
        self.column_text(BODY_COLUMN)
    }

    /// Renders a column the way string interpolation does: strings verbatim,
    /// `null` and absent columns as `null`/`undefined`, scalars as literals.
    pub fn column_text(&self, column: &str) -> String {
        match self.row.get(column) {
            None => "undefined".to_string(),
            Some(value) => interpolate(value),
        }
    }
}

fn interpolate(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => interpolate(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
