//! Branch Analysis Orchestrator (spec §4.1): the single `process` entry
//! point tying lock acquisition, cache check, diff selection, file-state
//! sync, reconciliation and retrieval-index update into one flow.

use crate::diff_selection::select_diff;
use crate::file_sync::synchronize_files;
use crate::provider_registry::ProviderRegistry;
use crate::rag_updater;
use anyhow::Context;
use issue_reconciler::{gather_candidates, reconcile_candidates};
use review_types::AnalysisError;
use review_types::model::{Branch, BranchHealth, LockType, Project, SeverityCounts, VcsBinding};
use review_types::ports::{AiAnalysisClient, AnalysisLockService, BranchFileRepository, BranchIssueRepository, BranchRepository, CodeAnalysisIssueRepository, ProgressSink, ProjectRepository, RagOperations};
use review_types::requests::{ProcessOutcome, ProcessRequest, ProgressEvent, SkipReason, Stage};
use review_utils::diff_paths::extract_changed_files;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

/// Bounded-wait parameters for lock acquisition; the lock manager itself is
/// external (spec §9), but the caller must pick a wait policy.
#[derive(Debug, Clone, Copy)]
pub struct LockWaitPolicy {
  pub max_wait: Duration,
  pub poll_interval: Duration,
}

impl Default for LockWaitPolicy {
  fn default() -> Self {
    Self {
      max_wait: Duration::from_secs(30),
      poll_interval: Duration::from_millis(200),
    }
  }
}

/// All collaborators `process` needs, gathered in one place for construction
/// convenience. Each is a trait object so a host application can supply
/// whatever persistence/transport backs them.
pub struct Orchestrator {
  pub projects: Arc<dyn ProjectRepository>,
  pub branches: Arc<dyn BranchRepository>,
  pub branch_files: Arc<dyn BranchFileRepository>,
  pub branch_issues: Arc<dyn BranchIssueRepository>,
  pub code_analysis_issues: Arc<dyn CodeAnalysisIssueRepository>,
  pub lock_service: Arc<dyn AnalysisLockService>,
  pub providers: ProviderRegistry,
  pub ai_client: Arc<dyn AiAnalysisClient>,
  pub rag: Arc<dyn RagOperations>,
  pub lock_wait: LockWaitPolicy,
}

impl Orchestrator {
  /// Entry point (spec §4.1). All steps after lock acquisition run inside
  /// the per-branch critical section; any error surfaced from this point
  /// leaves the branch `stale` and its `last_successful_commit_hash`
  /// untouched (§5/§7), and the lock is always released on the way out.
  #[instrument(skip(self, progress), fields(project_id = request.project_id, branch_name = %request.target_branch_name, commit_hash = %request.commit_hash))]
  pub async fn process(&self, request: ProcessRequest, progress: &dyn ProgressSink) -> Result<ProcessOutcome, AnalysisError> {
    let project = self.projects.find(request.project_id).await?.ok_or(AnalysisError::NoVcsConfigured)?;
    let vcs_binding = project.vcs.clone().ok_or(AnalysisError::NoVcsConfigured)?;

    let holder_id = format!("branch-analysis-orchestrator:{:?}", std::thread::current().id());

    let Some(lock_handle) = self
      .lock_service
      .acquire_lock_with_wait(request.project_id, &request.target_branch_name, LockType::BranchAnalysis, &holder_id, self.lock_wait.max_wait, self.lock_wait.poll_interval)
      .await?
    else {
      return Err(AnalysisError::AnalysisLocked);
    };

    progress.send(ProgressEvent::new(Stage::Init, "branch analysis started")).await;

    let outcome = self.run_locked(&project, &vcs_binding, &request, progress).await;

    if let Err(err) = &outcome {
      if err.requires_stale_rollback() {
        if let Err(e) = self.mark_branch_stale(request.project_id, &request.target_branch_name).await {
          warn!(error = %e, "failed to mark branch stale during cleanup");
        }
      }
    }

    if let Err(e) = self.lock_service.release_lock(request.project_id, &request.target_branch_name, LockType::BranchAnalysis, lock_handle).await {
      warn!(error = %e, "failed to release branch analysis lock");
    }

    outcome
  }

  async fn run_locked(&self, project: &Project, vcs_binding: &VcsBinding, request: &ProcessRequest, progress: &dyn ProgressSink) -> Result<ProcessOutcome, AnalysisError> {
    let existing_branch = self.branches.find_by_project_and_name(project.project_id, &request.target_branch_name).await?;

    if let Some(branch) = &existing_branch {
      if branch.last_successful_commit_hash.as_deref() == Some(request.commit_hash.as_str()) {
        return Ok(ProcessOutcome::Skipped { reason: SkipReason::CommitAlreadyAnalyzed });
      }
    }

    let mut branch = existing_branch.clone().unwrap_or_else(|| Branch::new(0, project.project_id, request.target_branch_name.clone()));
    branch.health = BranchHealth::Indexing;
    branch.id = self.branches.upsert(&branch).await?;

    let provider_entry = self.providers.get(vcs_binding.provider)?;

    progress.send(ProgressEvent::new(Stage::Diff, "selecting diff")).await;
    let selected = select_diff(provider_entry.vcs.as_ref(), &vcs_binding.workspace_slug, &vcs_binding.repo_slug, existing_branch.as_ref(), request)
      .await
      .map_err(AnalysisError::Remote)?;

    let changed_files = extract_changed_files(&selected.raw_diff);

    progress
      .send(ProgressEvent::new(Stage::Sync, "synchronizing file state").with_detail("file_count", changed_files.len().to_string()))
      .await;
    synchronize_files(
      self.branch_files.as_ref(),
      self.branch_issues.as_ref(),
      self.code_analysis_issues.as_ref(),
      provider_entry.vcs.as_ref(),
      &vcs_binding.workspace_slug,
      &vcs_binding.repo_slug,
      project.project_id,
      branch.id,
      &request.target_branch_name,
      &changed_files,
    )
    .await
    .map_err(AnalysisError::Remote)?;

    let candidates = gather_candidates(self.branch_issues.as_ref(), self.code_analysis_issues.as_ref(), branch.id, &request.target_branch_name, &changed_files).await?;

    if !candidates.is_empty() {
      let vcs_ai_client = provider_entry.ai_client.clone().ok_or(AnalysisError::UnsupportedProvider(vcs_binding.provider))?;

      reconcile_candidates(self.branch_issues.as_ref(), self.code_analysis_issues.as_ref(), self.ai_client.as_ref(), vcs_ai_client.as_ref(), progress, project, request, candidates)
        .await
        .map_err(AnalysisError::Remote)?;
    }

    let unresolved = self.branch_issues.count_unresolved(branch.id).await?;
    let mut counts = SeverityCounts::default();
    for branch_issue in &unresolved {
      if let Some(issue) = self.code_analysis_issues.find_by_id(branch_issue.code_analysis_issue_id).await? {
        counts.increment(issue.severity);
      }
    }
    branch.severity_counts = counts;
    branch.total_issue_count = counts.total();

    progress.send(ProgressEvent::new(Stage::Rag, "updating retrieval index")).await;
    rag_updater::update_index(self.rag.as_ref(), project, &request.target_branch_name, &request.commit_hash, &selected.raw_diff, progress).await;

    branch.health = BranchHealth::Healthy;
    branch.last_successful_commit_hash = Some(request.commit_hash.clone());
    let branch_id = self.branches.upsert(&branch).await.context("persisting final branch state").map_err(AnalysisError::Internal)?;

    progress.send(ProgressEvent::new(Stage::Complete, "branch analysis complete")).await;

    Ok(ProcessOutcome::Accepted { branch_id, chunk_count: None })
  }

  async fn mark_branch_stale(&self, project_id: i64, branch_name: &str) -> anyhow::Result<()> {
    if let Some(mut branch) = self.branches.find_by_project_and_name(project_id, branch_name).await? {
      branch.health = BranchHealth::Stale;
      self.branches.upsert(&branch).await?;
    }
    Ok(())
  }
}
