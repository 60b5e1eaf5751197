use std::sync::Arc;

use kfzroute_core::domain::case::CaseRecord;

use crate::client::{DataStore, StoreError};
use crate::filters::QueryFilters;
use crate::repositories::CASE_TABLE;

/// Looks up the active case record for an intent slug.
#[derive(Clone)]
pub struct CaseResolver {
    store: Arc<dyn DataStore>,
}

impl CaseResolver {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// First active row wins. An unknown slug and a slug without an active
    /// record both resolve to `None`.
    pub async fn resolve(&self, slug: &str) -> Result<Option<CaseRecord>, StoreError> {
        let rows = self
            .store
            .query(CASE_TABLE, &QueryFilters::new().eq("slug", slug).eq("aktiv", true).select("*"))
            .await?;

        let Some(first) = rows.into_iter().next() else {
            return Ok(None);
        };

        serde_json::from_value(first)
            .map(Some)
            .map_err(|error| StoreError::Decode(format!("invalid kfz_vorgaenge row: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::CaseResolver;
    use crate::memory::InMemoryDataStore;

    fn store() -> Arc<InMemoryDataStore> {
        Arc::new(InMemoryDataStore::new().with_rows(
            "kfz_vorgaenge",
            vec![
                json!({"slug": "ummeldung_dauer", "titel": "Alt", "inhalt": "veraltet", "aktiv": false}),
                json!({"slug": "ummeldung_dauer", "titel": "Dauer", "inhalt": "15 Minuten", "aktiv": true}),
                json!({"slug": "ummeldung_dauer", "titel": "Zweit", "inhalt": "doppelt", "aktiv": true}),
                json!({"slug": "abmeldung", "titel": "Abmeldung", "inhalt": "...", "aktiv": false}),
            ],
        ))
    }

    #[tokio::test]
    async fn first_active_record_wins() {
        let store = store();

        let record = CaseResolver::new(store.clone())
            .resolve("ummeldung_dauer")
            .await
            .expect("query succeeds")
            .expect("record exists");

        assert_eq!(record.title_text(), "Dauer");

        let queries = store.queries().await;
        assert_eq!(queries[0].table, "kfz_vorgaenge");
        assert_eq!(queries[0].filters.get("slug"), Some("eq.ummeldung_dauer"));
        assert_eq!(queries[0].filters.get("select"), Some("*"));
    }

    #[tokio::test]
    async fn rows_with_null_or_numeric_columns_are_returned_as_stored() {
        let row = json!({"slug": "kennzeichen", "titel": null, "inhalt": 42, "aktiv": true});
        let store = Arc::new(InMemoryDataStore::new().with_rows("kfz_vorgaenge", vec![row.clone()]));

        let record = CaseResolver::new(store)
            .resolve("kennzeichen")
            .await
            .expect("query succeeds")
            .expect("record exists");

        assert_eq!(serde_json::to_value(&record).expect("encode"), row);
    }

    #[tokio::test]
    async fn inactive_and_unknown_slugs_resolve_to_none() {
        let resolver = CaseResolver::new(store());

        assert_eq!(resolver.resolve("abmeldung").await.expect("query succeeds"), None);
        assert_eq!(resolver.resolve("gibt_es_nicht").await.expect("query succeeds"), None);
    }
}
