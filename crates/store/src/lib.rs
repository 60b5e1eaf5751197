pub mod client;
pub mod filters;
pub mod memory;
pub mod repositories;

pub use client::{DataStore, RestDataStore, StoreError};
pub use filters::QueryFilters;
pub use memory::{InMemoryDataStore, RecordedQuery};
pub use repositories::{CaseResolver, IntentIndexRepository, CASE_TABLE, INTENT_INDEX_TABLE};
