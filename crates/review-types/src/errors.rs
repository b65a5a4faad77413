//! Error taxonomy (spec §7). Plain enum with a manual `Display`/`Error`
//! impl and an `anyhow::Error` escape hatch, matching the teacher's
//! `BranchError`/`CopyCommitError` style rather than a derive-macro crate.

use crate::model::ProviderTag;

#[derive(Debug)]
pub enum AnalysisError {
  /// Project has no effective VCS binding. Fatal, no state mutation.
  NoVcsConfigured,
  /// No `VcsOperations`/`VcsAiClient`/`Reporter` registered for the tag.
  UnsupportedProvider(ProviderTag),
  /// Lock could not be acquired within the configured wait. Surfaced
  /// without side effects.
  AnalysisLocked,
  /// Remote I/O failure that must surface after cleanup (tier-3 diff
  /// fetch, file-existence check, AI call).
  Remote(anyhow::Error),
  /// Persistence or other internal I/O failure.
  Internal(anyhow::Error),
}

impl std::fmt::Display for AnalysisError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AnalysisError::NoVcsConfigured => write!(f, "project has no effective VCS binding"),
      AnalysisError::UnsupportedProvider(tag) => write!(f, "no provider registered for {tag}"),
      AnalysisError::AnalysisLocked => write!(f, "branch analysis lock is held by another caller"),
      AnalysisError::Remote(e) => write!(f, "remote I/O failure: {e}"),
      AnalysisError::Internal(e) => write!(f, "internal failure: {e}"),
    }
  }
}

impl std::error::Error for AnalysisError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      AnalysisError::Remote(e) | AnalysisError::Internal(e) => e.source(),
      _ => None,
    }
  }
}

impl From<anyhow::Error> for AnalysisError {
  fn from(err: anyhow::Error) -> Self {
    AnalysisError::Internal(err)
  }
}

impl AnalysisError {
  /// `true` for failures which, per the failure-cleanup contract (spec
  /// §5/§7), must leave the branch `stale` and the commit hash unchanged.
  /// Configuration/contention errors are excluded: they happen before the
  /// branch is marked `indexing`, so there is nothing to roll back.
  pub fn requires_stale_rollback(&self) -> bool {
    matches!(self, AnalysisError::Remote(_) | AnalysisError::Internal(_) | AnalysisError::UnsupportedProvider(_))
  }
}
