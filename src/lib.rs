//! In-memory list engine for production entities (episodes, sequences and
//! shots): keyword index, structured filters, multi-key sorting, a growing
//! display window and a selection grid over validation columns.

pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod list;
pub mod model;
pub mod normalize;
pub mod query;
pub mod scope;
pub mod selection;
pub mod sort;
pub mod source;
pub mod stats;
pub mod store;
pub mod window;

pub use config::{load_config, ListConfig};
pub use error::{ConfigError, ListError, ListResult, SourceError};
pub use list::{ColumnFlags, EntityList, ParentGroup, SavedSearch};
pub use model::{Entity, EntityKind, EntityPatch, LookupTables, TaskRef};
pub use scope::{LoadTicket, Scope, ScopeRegistry};
pub use sort::{SortDirection, SortField, SortSpec};
pub use source::{EntitySource, JsonSnapshot, LoadPayload};
pub use stats::ListStats;
