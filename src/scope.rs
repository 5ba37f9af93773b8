use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::ListConfig;
use crate::error::{ListResult, SourceError};
use crate::list::EntityList;
use crate::model::{EntityKind, LookupTables};
use crate::source::{fetch_payload, EntitySource, LoadPayload};

/// The (production, episode) pair bounding one list session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub production_id: String,
    pub episode_id: Option<String>,
}

impl Scope {
    pub fn production(production_id: impl Into<String>) -> Self {
        Self {
            production_id: production_id.into(),
            episode_id: None,
        }
    }

    pub fn episode(production_id: impl Into<String>, episode_id: impl Into<String>) -> Self {
        Self {
            production_id: production_id.into(),
            episode_id: Some(episode_id.into()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.episode_id {
            Some(episode_id) => write!(f, "{}/{}", self.production_id, episode_id),
            None => f.write_str(&self.production_id),
        }
    }
}

/// Issued by `begin_load`; a completion carrying an outdated generation is
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub scope: Scope,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

impl LoadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState {
    pub generation: u64,
    pub phase: LoadPhase,
    pub error: Option<String>,
}

impl Default for LoadState {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: LoadPhase::Idle,
            error: None,
        }
    }
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }
}

/// One list per scope, each behind its own lock. The whole pipeline of a
/// scope is mutated under that lock; fetches run outside it.
pub struct ScopeRegistry {
    kind: EntityKind,
    config: ListConfig,
    lookups: LookupTables,
    lists: Mutex<HashMap<Scope, Arc<Mutex<EntityList>>>>,
}

impl ScopeRegistry {
    pub fn new(kind: EntityKind, config: ListConfig, lookups: LookupTables) -> Self {
        Self {
            kind,
            config,
            lookups,
            lists: Mutex::new(HashMap::new()),
        }
    }

    /// List of `scope`, created empty on first access.
    pub fn list(&self, scope: &Scope) -> Arc<Mutex<EntityList>> {
        let mut lists = self.lists.lock();
        lists
            .entry(scope.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(EntityList::new(
                    self.kind,
                    scope.clone(),
                    self.config.clone(),
                    self.lookups.clone(),
                )))
            })
            .clone()
    }

    pub fn scopes(&self) -> Vec<Scope> {
        self.lists.lock().keys().cloned().collect()
    }

    pub fn begin_load(&self, scope: &Scope) -> ListResult<LoadTicket> {
        self.list(scope).lock().begin_load()
    }

    pub fn finish_load(
        &self,
        ticket: LoadTicket,
        outcome: Result<LoadPayload, SourceError>,
    ) -> ListResult<()> {
        let list = self.list(&ticket.scope);
        let mut list = list.lock();
        list.finish_load(ticket, outcome)
    }

    /// Full load cycle. The scope lock is released while fetching.
    pub fn load(&self, scope: &Scope, source: &dyn EntitySource) -> ListResult<()> {
        let t0 = Instant::now();
        let ticket = self.begin_load(scope)?;
        let outcome = fetch_payload(source, scope, self.kind);
        let result = self.finish_load(ticket, outcome);
        tracing::debug!(
            scope = %scope,
            kind = %self.kind,
            ok = result.is_ok(),
            total_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "scope load finished"
        );
        result
    }
}
