use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::client::{DataStore, StoreError};
use crate::filters::QueryFilters;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedQuery {
    pub table: String,
    pub filters: QueryFilters,
}

/// Table rows held in memory, queried with the same filter syntax as the
/// REST service (`eq.` comparisons, `select` projection, `limit`).
#[derive(Default)]
pub struct InMemoryDataStore {
    tables: HashMap<String, Vec<Value>>,
    failures: HashMap<String, String>,
    queries: RwLock<Vec<RecordedQuery>>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.entry(table.to_string()).or_default().extend(rows);
        self
    }

    /// Every query against `table` fails with the given status description.
    pub fn with_failure(mut self, table: &str, status: &str) -> Self {
        self.failures.insert(table.to_string(), status.to_string());
        self
    }

    pub async fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.read().await.clone()
    }

    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    pub async fn queries_for(&self, table: &str) -> usize {
        self.queries.read().await.iter().filter(|query| query.table == table).count()
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn query(&self, table: &str, filters: &QueryFilters) -> Result<Vec<Value>, StoreError> {
        self.queries
            .write()
            .await
            .push(RecordedQuery { table: table.to_string(), filters: filters.clone() });

        if let Some(status) = self.failures.get(table) {
            return Err(StoreError::Status { table: table.to_string(), status: status.clone() });
        }

        let Some(rows) = self.tables.get(table) else {
            return Err(StoreError::Status {
                table: table.to_string(),
                status: "404 Not Found".to_string(),
            });
        };

        let mut projection: Option<Vec<&str>> = None;
        let mut limit: Option<usize> = None;
        let mut predicates = Vec::new();

        for (key, value) in filters.pairs() {
            match key.as_str() {
                "select" if value.trim() == "*" => projection = None,
                "select" => projection = Some(value.split(',').map(str::trim).collect()),
                "limit" => limit = value.parse().ok(),
                column => {
                    let expected = value.strip_prefix("eq.").ok_or_else(|| StoreError::Status {
                        table: table.to_string(),
                        status: "400 Bad Request".to_string(),
                    })?;
                    predicates.push((column, expected));
                }
            }
        }

        let matched = rows
            .iter()
            .filter(|row| {
                predicates.iter().all(|(column, expected)| {
                    row.get(*column).map(render_scalar).as_deref() == Some(*expected)
                })
            })
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| project(row, projection.as_deref()))
            .collect();

        Ok(matched)
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn project(row: &Value, columns: Option<&[&str]>) -> Value {
    let (Some(columns), Value::Object(fields)) = (columns, row) else {
        return row.clone();
    };

    let projected: Map<String, Value> = columns
        .iter()
        .filter_map(|column| fields.get(*column).map(|value| (column.to_string(), value.clone())))
        .collect();
    Value::Object(projected)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::InMemoryDataStore;
    use crate::client::{DataStore, StoreError};
    use crate::filters::QueryFilters;

    fn store() -> InMemoryDataStore {
        InMemoryDataStore::new().with_rows(
            "intent_index",
            vec![
                json!({"slug": "ummeldung_dauer", "intent_group": "ummeldung", "aktiv": true}),
                json!({"slug": "abmeldung_kosten", "intent_group": "abmeldung", "aktiv": false}),
                json!({"slug": "wunschkennzeichen", "intent_group": "kennzeichen", "aktiv": true}),
            ],
        )
    }

    #[tokio::test]
    async fn eq_filters_and_projection_apply() {
        let store = store();

        let rows = store
            .query(
                "intent_index",
                &QueryFilters::new().select("slug,intent_group").eq("aktiv", true),
            )
            .await
            .expect("query succeeds");

        assert_eq!(
            rows,
            vec![
                json!({"slug": "ummeldung_dauer", "intent_group": "ummeldung"}),
                json!({"slug": "wunschkennzeichen", "intent_group": "kennzeichen"}),
            ]
        );
        assert_eq!(store.query_count().await, 1);
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        let rows = store()
            .query("intent_index", &QueryFilters::new().select("*").limit(1))
            .await
            .expect("query succeeds");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["aktiv"], json!(true));
    }

    #[tokio::test]
    async fn configured_failure_and_unknown_tables_error() {
        let store = store().with_failure("kfz_vorgaenge", "503 Service Unavailable");

        let failing = store.query("kfz_vorgaenge", &QueryFilters::new()).await;
        assert!(matches!(failing, Err(StoreError::Status { ref status, .. }) if status == "503 Service Unavailable"));

        let unknown = store.query("unbekannt", &QueryFilters::new()).await;
        assert!(matches!(unknown, Err(StoreError::Status { ref status, .. }) if status == "404 Not Found"));

        assert_eq!(store.queries_for("kfz_vorgaenge").await, 1);
    }

    #[tokio::test]
    async fn unsupported_operator_is_rejected() {
        let result =
            store().query("intent_index", &QueryFilters::new().raw("slug", "like.*dauer")).await;

        assert!(matches!(result, Err(StoreError::Status { ref status, .. }) if status == "400 Bad Request"));
    }
}
