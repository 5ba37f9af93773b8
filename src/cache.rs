use crate::model::EntityId;
use crate::sort::SortSpec;

#[derive(Debug, Clone, PartialEq)]
struct CachedResult {
    query: String,
    sorting: Vec<SortSpec>,
    generation: u64,
    ids: Vec<EntityId>,
}

/// Owned, versioned cache of pipeline outputs.
///
/// Holds the canonical id list in natural order and the last full
/// filtered/sorted result. Every structural mutation of the store must call
/// [`ResultCache::invalidate`], which bumps the generation so that nothing
/// computed before the mutation is served again.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    generation: u64,
    canonical: Option<Vec<EntityId>>,
    result: Option<CachedResult>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.canonical = None;
        self.result = None;
    }

    /// Canonical ids, computed on first use after an invalidation.
    pub fn canonical_or_insert_with(&mut self, f: impl FnOnce() -> Vec<EntityId>) -> &[EntityId] {
        self.canonical.get_or_insert_with(f)
    }

    /// Cached result for this query and sorting, if still current.
    pub fn lookup(&self, query: &str, sorting: &[SortSpec]) -> Option<&[EntityId]> {
        self.result
            .as_ref()
            .filter(|r| r.generation == self.generation && r.query == query && r.sorting == sorting)
            .map(|r| r.ids.as_slice())
    }

    pub fn store(&mut self, query: &str, sorting: &[SortSpec], ids: Vec<EntityId>) {
        self.result = Some(CachedResult {
            query: query.to_string(),
            sorting: sorting.to_vec(),
            generation: self.generation,
            ids,
        });
    }

    /// Last stored result regardless of key, if still current.
    pub fn result(&self) -> Option<&[EntityId]> {
        self.result
            .as_ref()
            .filter(|r| r.generation == self.generation)
            .map(|r| r.ids.as_slice())
    }
}
