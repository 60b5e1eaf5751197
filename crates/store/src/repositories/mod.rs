pub mod case;
pub mod intent;

pub use case::CaseResolver;
pub use intent::IntentIndexRepository;

pub const INTENT_INDEX_TABLE: &str = "intent_index";
pub const CASE_TABLE: &str = "kfz_vorgaenge";
