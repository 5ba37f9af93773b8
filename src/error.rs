use thiserror::Error;

use crate::model::{EntityId, TaskId};
use crate::scope::Scope;

/// Failures reported by the data-access collaborator.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("entity not found upstream: {0}")]
    NotFound(EntityId),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("a load is already running for {0}")]
    AlreadyLoading(Scope),
    #[error("discarded stale load (generation {got}, current {expected})")]
    StaleLoad { expected: u64, got: u64 },
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type ListResult<T> = Result<T, ListError>;
