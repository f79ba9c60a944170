use std::collections::HashSet;

use crate::{
    ACTIVATION_THRESHOLD,
    heuristic::{BoxedHeuristic, Heuristic, all_heuristics},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RegistryError {
    #[display("heuristic registry must not be empty")]
    Empty,
    #[display("heuristic '{id}' has an empty name or id")]
    BlankName { id: String },
    #[display("duplicate heuristic name '{name}'")]
    DuplicateName { name: String },
    #[display("duplicate heuristic id '{id}'")]
    DuplicateId { id: String },
}

/// Whether `heuristic` may be used with a history of `history_size` records.
#[must_use]
pub fn is_activatable(heuristic: &dyn Heuristic, history_size: usize) -> bool {
    !heuristic.is_data_driven() || history_size >= ACTIVATION_THRESHOLD
}

/// Ordered catalog of heuristics keyed by unique name and id.
///
/// Declaration order is significant: it breaks ties in the ranking.
#[derive(Debug, Clone)]
pub struct HeuristicRegistry {
    heuristics: Vec<BoxedHeuristic>,
}

impl HeuristicRegistry {
    /// Builds a registry, rejecting blank or duplicate names and ids.
    pub fn new(heuristics: Vec<BoxedHeuristic>) -> Result<Self, RegistryError> {
        if heuristics.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for heuristic in &heuristics {
            if heuristic.name().trim().is_empty() || heuristic.id().trim().is_empty() {
                return Err(RegistryError::BlankName {
                    id: heuristic.id().to_owned(),
                });
            }
            if !names.insert(heuristic.name().to_owned()) {
                return Err(RegistryError::DuplicateName {
                    name: heuristic.name().to_owned(),
                });
            }
            if !ids.insert(heuristic.id().to_owned()) {
                return Err(RegistryError::DuplicateId {
                    id: heuristic.id().to_owned(),
                });
            }
        }
        Ok(Self { heuristics })
    }

    /// The built-in catalog (see [`all_heuristics`]).
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            heuristics: all_heuristics(),
        }
    }

    /// Finds a heuristic by display name or id.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&dyn Heuristic> {
        self.iter()
            .find(|h| h.name() == key)
            .or_else(|| self.iter().find(|h| h.id() == key))
    }

    /// Heuristics usable with a history of `history_size` records, in
    /// declaration order.
    #[must_use]
    pub fn list_activatable(&self, history_size: usize) -> Vec<&dyn Heuristic> {
        self.iter()
            .filter(|h| is_activatable(*h, history_size))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Heuristic> + '_ {
        self.heuristics.iter().map(|h| &**h)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heuristics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heuristics.is_empty()
    }
}
