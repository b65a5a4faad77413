//! Step C of spec §4.3: applying AI verdicts to open `BranchIssue`s.

use crate::gather::Candidate;
use indexmap::IndexMap;
use review_types::ports::{BranchIssueRepository, CodeAnalysisIssueRepository};
use review_types::requests::Verdict;
use tracing::{debug, instrument, warn};

/// Applies verdicts to their matching candidates, skipping anything the
/// verdict can't be matched to or that's already resolved (P4: a resolved
/// `BranchIssue` is never un-resolved, and this function never writes when
/// `is_resolved` is false).
#[instrument(skip(branch_issues, code_analysis_issues, candidates, verdicts), fields(commit_hash, verdict_count = verdicts.len()))]
pub async fn apply_verdicts(branch_issues: &dyn BranchIssueRepository, code_analysis_issues: &dyn CodeAnalysisIssueRepository, candidates: &[Candidate], verdicts: &[Verdict], commit_hash: &str, pr_number: Option<i64>) -> anyhow::Result<u32> {
  let by_id: IndexMap<i64, &Candidate> = candidates.iter().map(|c| (c.code_analysis_issue.id, c)).collect();

  let mut resolved_count = 0;

  for verdict in verdicts {
    if !verdict.is_resolved {
      continue;
    }

    let Some(candidate) = by_id.get(&verdict.issue_id) else {
      warn!(issue_id = verdict.issue_id, "AI verdict referenced an issue outside the gathered candidate set; ignoring");
      continue;
    };

    if candidate.branch_issue.resolved {
      debug!(issue_id = verdict.issue_id, "issue already resolved; skipping to avoid un-resolving");
      continue;
    }

    let mut updated = candidate.branch_issue.clone();
    updated.resolved = true;
    updated.resolved_in_commit_hash = Some(commit_hash.to_string());
    updated.resolved_in_pr_number = pr_number;
    updated.resolved_description = verdict.reason.clone();

    branch_issues.save(&updated).await?;
    code_analysis_issues.mark_resolved(verdict.issue_id, commit_hash, pr_number, verdict.reason.as_deref()).await?;

    resolved_count += 1;
  }

  debug!(resolved_count, "applied AI verdicts");

  Ok(resolved_count)
}
