use crate::PersistedFilterState;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write the full snapshot to the persistent store (fire-and-forget).
    PersistFilters(PersistedFilterState),
}
