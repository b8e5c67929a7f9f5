//! # lookup-types
//!
//! Shared domain types for roster-lookup.
//!
//! - `Member`: a roster entry, read-only to the search core
//! - `NameField`: the name columns a substring query can target
//! - `Settings`: layered configuration (defaults, file, env, CLI)
//! - `LookupError`: configuration and validation errors

pub mod config;
pub mod error;
pub mod member;

pub use config::{
    ColumnSettings, DocumentSettings, SearchSettings, Settings, StoreBackend, StoreSettings,
    MAX_SUGGESTIONS,
};
pub use error::LookupError;
pub use member::{Member, NameField};
