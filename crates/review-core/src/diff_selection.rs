//! Three-tier diff fallback (spec §4.2, P7): delta, then pull-request, then
//! commit diff. Tiers 1 and 2 swallow I/O failures and fall through; tier 3
//! surfaces its failure to the caller.

use review_types::model::Branch;
use review_types::ports::VcsOperations;
use review_types::requests::{DiffTier, ProcessRequest, SelectedDiff};
use tracing::{debug, instrument, warn};

#[instrument(skip(vcs, existing_branch, process_request), fields(workspace, repo_slug, commit_hash = %process_request.commit_hash))]
pub async fn select_diff(vcs: &dyn VcsOperations, workspace: &str, repo_slug: &str, existing_branch: Option<&Branch>, process_request: &ProcessRequest) -> anyhow::Result<SelectedDiff> {
  if let Some(base_sha) = existing_branch.and_then(|b| b.last_successful_commit_hash.as_deref()) {
    match vcs.get_commit_range_diff(workspace, repo_slug, base_sha, &process_request.commit_hash).await {
      Ok(raw_diff) => {
        debug!(base_sha, "using delta diff");
        return Ok(SelectedDiff { raw_diff, tier: DiffTier::Delta });
      }
      Err(e) => warn!(error = %e, "delta diff fetch failed; falling back to pull-request diff"),
    }
  }

  match pull_request_diff(vcs, workspace, repo_slug, process_request).await {
    Ok(Some(raw_diff)) => {
      debug!("using pull-request diff");
      return Ok(SelectedDiff { raw_diff, tier: DiffTier::PullRequest });
    }
    Ok(None) => debug!("no pull request associated with this commit; falling back to commit diff"),
    Err(e) => warn!(error = %e, "pull-request diff fetch failed; falling back to commit diff"),
  }

  let raw_diff = vcs.get_commit_diff(workspace, repo_slug, &process_request.commit_hash).await?;
  debug!("using commit diff");
  Ok(SelectedDiff { raw_diff, tier: DiffTier::Commit })
}

/// Resolves the PR diff, returning `Ok(None)` (not an error) when there is
/// simply no PR number to use — that's a legitimate fall-through, not a
/// failure.
async fn pull_request_diff(vcs: &dyn VcsOperations, workspace: &str, repo_slug: &str, process_request: &ProcessRequest) -> anyhow::Result<Option<String>> {
  let pr_number = match process_request.source_pull_request_number {
    Some(n) => Some(n),
    None => vcs.find_pull_request_for_commit(workspace, repo_slug, &process_request.commit_hash).await?,
  };

  let Some(pr_number) = pr_number else {
    return Ok(None);
  };

  Ok(Some(vcs.get_pull_request_diff(workspace, repo_slug, pr_number).await?))
}
