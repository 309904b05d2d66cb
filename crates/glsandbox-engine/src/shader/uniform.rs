use std::collections::HashMap;

use crate::error::Result;
use crate::gl::UniformLocation;

/// Result of resolving a uniform name against a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformSlot {
    Found(UniformLocation),
    /// The program has no active uniform of that name (driver location -1).
    NotFound,
}

impl UniformSlot {
    pub fn location(self) -> Option<UniformLocation> {
        match self {
            Self::Found(location) => Some(location),
            Self::NotFound => None,
        }
    }

    /// Driver-style location: `-1` when absent.
    pub fn raw(self) -> i32 {
        match self {
            Self::Found(location) => location.0 as i32,
            Self::NotFound => -1,
        }
    }
}

/// Name -> slot cache; each name is resolved at most once per program.
#[derive(Debug, Default)]
pub(crate) struct UniformCache {
    slots: HashMap<String, UniformSlot>,
}

impl UniformCache {
    /// Returns the cached slot, or resolves and caches it with `query`.
    ///
    /// Absent names are cached too and warned about only on first lookup.
    /// A failed query caches nothing.
    pub(crate) fn resolve(
        &mut self,
        name: &str,
        query: impl FnOnce() -> Result<Option<UniformLocation>>,
    ) -> Result<UniformSlot> {
        if let Some(slot) = self.slots.get(name) {
            return Ok(*slot);
        }

        let slot = match query()? {
            Some(location) => UniformSlot::Found(location),
            None => {
                log::warn!("uniform '{name}' doesn't exist");
                UniformSlot::NotFound
            }
        };
        self.slots.insert(name.to_owned(), slot);
        Ok(slot)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
