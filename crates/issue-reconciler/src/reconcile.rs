//! Ties candidate gathering, the single AI call, and verdict application
//! into the reconciliation step `review-core`'s orchestrator calls once per
//! `process()` run (spec §4.1 step 10, §4.3).

use crate::apply::apply_verdicts;
use crate::gather::{Candidate, gather_candidates, to_candidate_issues};
use indexmap::IndexSet;
use review_types::model::Project;
use review_types::ports::{AiAnalysisClient, BranchIssueRepository, CodeAnalysisIssueRepository, ProgressSink, VcsAiClient};
use review_types::requests::{ProcessRequest, ProgressEvent, Stage};
use review_utils::ai_response::normalize_verdicts;
use tracing::{info, instrument};

/// Outcome of one reconciliation run, surfaced for logging/tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
  pub candidate_count: u32,
  pub resolved_count: u32,
}

impl ReconcileOutcome {
  pub fn no_candidates() -> Self {
    Self { candidate_count: 0, resolved_count: 0 }
  }
}

/// Step B+C: given an already-gathered, non-empty candidate set, invokes the
/// AI once and applies its verdicts. Split out from `reconcile_issues` so a
/// caller can gather first and only require a `VcsAiClient` (which a
/// provider may not register) once it knows candidates actually exist.
#[instrument(skip_all, fields(project_id = project.project_id, candidate_count = candidates.len()))]
pub async fn reconcile_candidates(
  branch_issues: &dyn BranchIssueRepository,
  code_analysis_issues: &dyn CodeAnalysisIssueRepository,
  ai_client: &dyn AiAnalysisClient,
  vcs_ai_client: &dyn VcsAiClient,
  progress: &dyn ProgressSink,
  project: &Project,
  process_request: &ProcessRequest,
  candidates: Vec<Candidate>,
) -> anyhow::Result<ReconcileOutcome> {
  progress
    .send(ProgressEvent::new(Stage::Ai, "reconciling historical issues").with_detail("candidate_count", candidates.len().to_string()))
    .await;

  let candidate_issues = to_candidate_issues(&candidates);
  let request = vcs_ai_client.build_ai_analysis_request(project, process_request, candidate_issues);

  let response = ai_client.perform_analysis(&request, progress).await?;
  let verdicts = normalize_verdicts(&response);

  let resolved_count = apply_verdicts(branch_issues, code_analysis_issues, &candidates, &verdicts, &process_request.commit_hash, process_request.source_pull_request_number).await?;

  info!(candidate_count = candidates.len(), resolved_count, "reconciliation complete");

  Ok(ReconcileOutcome {
    candidate_count: candidates.len() as u32,
    resolved_count,
  })
}

/// Convenience wrapper for standalone use and tests: gathers candidates and,
/// if any exist, reconciles them. Returns a zero outcome without invoking
/// the AI when there are none.
#[instrument(skip_all, fields(project_id = project.project_id, branch_id, branch_name = %process_request.target_branch_name))]
#[allow(clippy::too_many_arguments)]
pub async fn reconcile_issues(
  branch_issues: &dyn BranchIssueRepository,
  code_analysis_issues: &dyn CodeAnalysisIssueRepository,
  ai_client: &dyn AiAnalysisClient,
  vcs_ai_client: &dyn VcsAiClient,
  progress: &dyn ProgressSink,
  project: &Project,
  process_request: &ProcessRequest,
  branch_id: i64,
  changed_files: &IndexSet<String>,
) -> anyhow::Result<ReconcileOutcome> {
  let candidates = gather_candidates(branch_issues, code_analysis_issues, branch_id, &process_request.target_branch_name, changed_files).await?;

  if candidates.is_empty() {
    info!("no historical issues touched by this diff; skipping AI reconciliation call");
    return Ok(ReconcileOutcome::no_candidates());
  }

  reconcile_candidates(branch_issues, code_analysis_issues, ai_client, vcs_ai_client, progress, project, process_request, candidates).await
}
