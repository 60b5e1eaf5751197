use std::fmt::Display;

/// Ordered query-string filters for the REST table service.
///
/// Values are passed through verbatim apart from URL encoding, so operator
/// prefixes such as `eq.` are part of the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilters {
    pairs: Vec<(String, String)>,
}

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, columns: &str) -> Self {
        self.raw("select", columns)
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.raw(column, format!("eq.{value}"))
    }

    pub fn limit(self, rows: usize) -> Self {
        self.raw("limit", rows.to_string())
    }

    pub fn raw(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(candidate, _)| candidate == key).map(|(_, value)| value.as_str())
    }
}
