//! Retrieval-index update decision (spec §4.6, §9: "the base-branch vs
//! non-base-branch split is load-bearing for index semantics; keep the two
//! code paths visibly separate"). Failures here are always logged and
//! swallowed; the analysis has already succeeded by the time this runs.

use review_types::model::Project;
use review_types::ports::{ProgressSink, RagOperations};
use tracing::{debug, instrument, warn};

#[instrument(skip(rag, progress), fields(project_id = project.project_id, branch_name))]
pub async fn update_index(rag: &dyn RagOperations, project: &Project, branch_name: &str, commit_hash: &str, raw_diff: &str, progress: &dyn ProgressSink) {
  if !rag.is_rag_enabled(project) {
    debug!("retrieval indexing disabled for project; skipping");
    return;
  }

  match rag.is_rag_index_ready(project).await {
    Ok(true) => {}
    Ok(false) => {
      debug!("retrieval index not yet ready; skipping update");
      return;
    }
    Err(e) => {
      warn!(error = %e, "failed to check retrieval index readiness; skipping update");
      return;
    }
  }

  let base_branch = rag.get_base_branch(project);

  if branch_name == base_branch {
    if let Err(e) = rag.trigger_incremental_update(project, branch_name, commit_hash, raw_diff, progress).await {
      warn!(error = %e, "incremental retrieval-index update failed; analysis still succeeds");
    }
  } else if let Err(e) = rag.update_branch_index(project, branch_name, progress).await {
    warn!(error = %e, "branch retrieval-index refresh failed; analysis still succeeds");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use review_test_support::{FakeRagOperations, RecordingProgressSink};

  fn project(rag_enabled: bool, base_branch: &str) -> Project {
    Project {
      project_id: 1,
      workspace_name: "acme".into(),
      namespace: "acme/widgets".into(),
      vcs: None,
      ai: None,
      base_branch: base_branch.into(),
      rag_enabled,
    }
  }

  #[tokio::test]
  async fn base_branch_uses_incremental_update() {
    let rag = FakeRagOperations::new(true);
    let progress = RecordingProgressSink::new();

    update_index(&rag, &project(true, "main"), "main", "new", "diff", &progress).await;

    assert_eq!(rag.incremental_calls().len(), 1);
    assert!(rag.full_update_calls().is_empty());
  }

  #[tokio::test]
  async fn non_base_branch_uses_full_reindex() {
    let rag = FakeRagOperations::new(true);
    let progress = RecordingProgressSink::new();

    update_index(&rag, &project(true, "main"), "feature/x", "new", "diff", &progress).await;

    assert!(rag.incremental_calls().is_empty());
    assert_eq!(rag.full_update_calls().len(), 1);
  }

  #[tokio::test]
  async fn disabled_project_calls_neither() {
    let rag = FakeRagOperations::new(true);
    let progress = RecordingProgressSink::new();

    update_index(&rag, &project(false, "main"), "main", "new", "diff", &progress).await;

    assert!(rag.incremental_calls().is_empty());
    assert!(rag.full_update_calls().is_empty());
  }

  #[tokio::test]
  async fn index_not_ready_skips_update() {
    let rag = FakeRagOperations::new(false);
    let progress = RecordingProgressSink::new();

    update_index(&rag, &project(true, "main"), "main", "new", "diff", &progress).await;

    assert!(rag.incremental_calls().is_empty());
  }

  #[tokio::test]
  async fn incremental_update_failure_does_not_panic_or_propagate() {
    let rag = FakeRagOperations::new(true).failing_incremental_update();
    let progress = RecordingProgressSink::new();

    update_index(&rag, &project(true, "main"), "main", "new", "diff", &progress).await;
  }
}
