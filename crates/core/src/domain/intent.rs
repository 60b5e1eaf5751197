use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row of the `intent_index` table. Only `slug` is interpreted; the group
/// is carried as stored, whatever its type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRecord {
    pub slug: String,
    #[serde(rename = "intent_group", default)]
    pub group: Option<Value>,
    // The catalog query filters on `aktiv` without selecting it.
    #[serde(rename = "aktiv", default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

/// The active intents as loaded for a single classification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntentCatalog {
    records: Vec<IntentRecord>,
}

impl IntentCatalog {
    pub fn new(records: Vec<IntentRecord>) -> Self {
        Self { records }
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.slug.as_str())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs().any(|candidate| candidate == slug)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
