use std::collections::HashMap;
use std::sync::Arc;

use super::generator::{Profile, RecordGenerator};
use super::model::RecordSet;
use crate::error::Result;

/// Key of one memoized generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub profile: Profile,
    pub count: usize,
    pub seed: u64,
}

/// Caller-owned memo of generated record sets.
///
/// Only seeded requests are cached; an unseeded request is expected to
/// produce a fresh sample every time.
#[derive(Debug, Default)]
pub struct GenerationCache {
    entries: HashMap<CacheKey, Arc<RecordSet>>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached set for the request, generating it on a miss.
    pub fn get_or_generate(
        &mut self,
        generator: &RecordGenerator,
        count: usize,
        seed: Option<u64>,
    ) -> Result<Arc<RecordSet>> {
        let Some(seed) = seed else {
            return generator.generate(count, None).map(Arc::new);
        };
        let key = CacheKey {
            profile: generator.profile(),
            count,
            seed,
        };
        if let Some(hit) = self.entries.get(&key) {
            log::trace!("generation cache hit for {key:?}");
            return Ok(Arc::clone(hit));
        }
        let records = Arc::new(generator.generate(count, Some(seed))?);
        self.entries.insert(key, Arc::clone(&records));
        Ok(records)
    }

    /// Drop one entry; returns whether it was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
