use std::sync::Arc;

use kfzroute_core::domain::intent::{IntentCatalog, IntentRecord};

use crate::client::{DataStore, StoreError};
use crate::filters::QueryFilters;
use crate::repositories::INTENT_INDEX_TABLE;

#[derive(Clone)]
pub struct IntentIndexRepository {
    store: Arc<dyn DataStore>,
}

impl IntentIndexRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Loads the active catalog. Called once per classification, never cached.
    pub async fn load_active(&self) -> Result<IntentCatalog, StoreError> {
        let rows = self
            .store
            .query(
                INTENT_INDEX_TABLE,
                &QueryFilters::new().select("slug,intent_group").eq("aktiv", true),
            )
            .await?;

        let records = rows
            .into_iter()
            .map(serde_json::from_value::<IntentRecord>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| StoreError::Decode(format!("invalid intent_index row: {error}")))?;

        Ok(IntentCatalog::new(records))
    }
}
