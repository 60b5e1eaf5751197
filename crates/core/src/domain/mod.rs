pub mod case;
pub mod chat;
pub mod intent;
