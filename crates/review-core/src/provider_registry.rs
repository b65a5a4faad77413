//! Dispatch to the `VcsOperations`/`VcsAiClient`/`Reporter` registered for a
//! provider tag (spec §4.5). A tagged variant plus a map of trait objects,
//! not a trait-inheritance hierarchy.

use review_types::AnalysisError;
use review_types::model::ProviderTag;
use review_types::ports::ProviderEntry;
use std::collections::HashMap;

#[derive(Default)]
pub struct ProviderRegistry {
  entries: HashMap<ProviderTag, ProviderEntry>,
}

impl ProviderRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, entry: ProviderEntry) {
    self.entries.insert(entry.tag, entry);
  }

  pub fn get(&self, tag: ProviderTag) -> Result<&ProviderEntry, AnalysisError> {
    self.entries.get(&tag).ok_or(AnalysisError::UnsupportedProvider(tag))
  }

  /// Introspection hook for diagnostics/health checks: which providers this
  /// registry can currently dispatch to.
  pub fn registered_providers(&self) -> Vec<ProviderTag> {
    self.entries.keys().copied().collect()
  }
}
