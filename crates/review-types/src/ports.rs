//! Collaborator interfaces (spec §6). These are the core's sole view of the
//! outside world: VCS wire formats, AI invocation, retrieval-index
//! construction, report posting, and persistence are all implemented by a
//! host application (or, for one illustrative case, by `vcs-providers`) and
//! injected here as trait objects.

use crate::model::{Branch, BranchFile, BranchIssue, CodeAnalysisIssue, Project, ProviderTag};
use crate::requests::{AiAnalysisRequest, ProcessRequest, ProgressEvent};
use async_trait::async_trait;
use std::time::Duration;

/// A single-threaded, ordered, possibly-discarded progress callback. The
/// core never synchronizes on it and never lets a slow consumer apply
/// back-pressure beyond whatever bounded buffering the sink itself chooses
/// to do (see `review-core::progress::BufferedProgressSink`).
#[async_trait]
pub trait ProgressSink: Send + Sync {
  async fn send(&self, event: ProgressEvent);
}

/// No-op sink for callers that don't care about progress.
pub struct NullProgressSink;

#[async_trait]
impl ProgressSink for NullProgressSink {
  async fn send(&self, _event: ProgressEvent) {}
}

/// Diff/file-existence primitives against one hosted VCS provider.
#[async_trait]
pub trait VcsOperations: Send + Sync {
  async fn get_commit_range_diff(&self, workspace: &str, repo_slug: &str, base_sha: &str, head_sha: &str) -> anyhow::Result<String>;

  async fn get_pull_request_diff(&self, workspace: &str, repo_slug: &str, pr_number: i64) -> anyhow::Result<String>;

  async fn get_commit_diff(&self, workspace: &str, repo_slug: &str, sha: &str) -> anyhow::Result<String>;

  async fn find_pull_request_for_commit(&self, workspace: &str, repo_slug: &str, sha: &str) -> anyhow::Result<Option<i64>>;

  async fn check_file_exists_in_branch(&self, workspace: &str, repo_slug: &str, branch: &str, path: &str) -> anyhow::Result<bool>;
}

/// AI model invocation. The response shape is intentionally opaque
/// (`serde_json::Value`) because the `issues` field is either an array or a
/// string-keyed map (spec §4.3/§6); normalization lives in `review-utils`.
#[async_trait]
pub trait AiAnalysisClient: Send + Sync {
  async fn perform_analysis(&self, request: &AiAnalysisRequest, progress: &dyn ProgressSink) -> anyhow::Result<serde_json::Value>;
}

/// Builds a provider-shaped `AiAnalysisRequest` from project/process context.
/// Only needed when there is at least one candidate issue to re-evaluate.
pub trait VcsAiClient: Send + Sync {
  fn build_ai_analysis_request(&self, project: &Project, process_request: &ProcessRequest, candidates: Vec<crate::requests::CandidateIssue>) -> AiAnalysisRequest;
}

/// Retrieval-index operations. Failures here are always logged and
/// swallowed by the orchestrator; they never fail an analysis.
#[async_trait]
pub trait RagOperations: Send + Sync {
  fn is_rag_enabled(&self, project: &Project) -> bool;

  async fn is_rag_index_ready(&self, project: &Project) -> anyhow::Result<bool>;

  fn get_base_branch(&self, project: &Project) -> String;

  async fn trigger_incremental_update(&self, project: &Project, branch_name: &str, commit_hash: &str, raw_diff: &str, progress: &dyn ProgressSink) -> anyhow::Result<()>;

  async fn update_branch_index(&self, project: &Project, branch_name: &str, progress: &dyn ProgressSink) -> anyhow::Result<()>;
}

/// Report rendering, comment posting and annotation upload. Out of scope
/// for wire-format purposes, but the core needs the contract shape to hand
/// off reconciliation results.
#[async_trait]
pub trait Reporter: Send + Sync {
  async fn post_summary_comment(&self, project: &Project, process_request: &ProcessRequest, summary: &str) -> anyhow::Result<()>;

  async fn post_inline_annotations(&self, project: &Project, process_request: &ProcessRequest, issues: &[CodeAnalysisIssue]) -> anyhow::Result<()>;
}

/// A held `AnalysisLock`. Dropping it without releasing is a programming
/// error in callers; `review-core` always releases via a guard.
pub struct LockHandle {
  pub holder_id: String,
  pub acquired_at: std::time::Instant,
}

/// Distributed advisory lock keyed by `(projectId, branchName, lockType)`.
/// At most one `BranchAnalysis` holder exists per key at any instant; the
/// core must tolerate spurious denials and never hold a handle across its
/// own process boundary.
#[async_trait]
pub trait AnalysisLockService: Send + Sync {
  async fn acquire_lock_with_wait(&self, project_id: i64, branch_name: &str, lock_type: crate::model::LockType, holder_id: &str, max_wait: Duration, poll_interval: Duration) -> anyhow::Result<Option<LockHandle>>;

  async fn release_lock(&self, project_id: i64, branch_name: &str, lock_type: crate::model::LockType, handle: LockHandle) -> anyhow::Result<()>;
}

/// Typed read/write access to `Branch` records.
#[async_trait]
pub trait BranchRepository: Send + Sync {
  async fn find_by_project_and_name(&self, project_id: i64, branch_name: &str) -> anyhow::Result<Option<Branch>>;

  async fn upsert(&self, branch: &Branch) -> anyhow::Result<i64>;
}

/// Typed read/write access to `BranchFile` records.
#[async_trait]
pub trait BranchFileRepository: Send + Sync {
  async fn find(&self, project_id: i64, branch_name: &str, file_path: &str) -> anyhow::Result<Option<BranchFile>>;

  async fn upsert(&self, file: &BranchFile) -> anyhow::Result<()>;

  async fn delete(&self, project_id: i64, branch_name: &str, file_path: &str) -> anyhow::Result<()>;
}

/// Typed read/write access to `BranchIssue` records.
#[async_trait]
pub trait BranchIssueRepository: Send + Sync {
  async fn find(&self, branch_id: i64, code_analysis_issue_id: i64) -> anyhow::Result<Option<BranchIssue>>;

  async fn open_for_file(&self, branch_id: i64, file_path: &str) -> anyhow::Result<Vec<BranchIssue>>;

  async fn insert_if_absent(&self, issue: &BranchIssue) -> anyhow::Result<()>;

  async fn save(&self, issue: &BranchIssue) -> anyhow::Result<()>;

  async fn count_unresolved(&self, branch_id: i64) -> anyhow::Result<Vec<BranchIssue>>;
}

/// Read access (and the narrow `resolved`-flip write) to `CodeAnalysisIssue`.
#[async_trait]
pub trait CodeAnalysisIssueRepository: Send + Sync {
  async fn find_by_project_and_path(&self, project_id: i64, file_path: &str) -> anyhow::Result<Vec<CodeAnalysisIssue>>;

  async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<CodeAnalysisIssue>>;

  async fn mark_resolved(&self, id: i64, commit_hash: &str, pr_number: Option<i64>, description: Option<&str>) -> anyhow::Result<()>;
}

/// Read access to `Project` configuration.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
  async fn find(&self, project_id: i64) -> anyhow::Result<Option<Project>>;
}

/// Groups the provider-tagged collaborators the registry dispatches to.
pub struct ProviderEntry {
  pub tag: ProviderTag,
  pub vcs: std::sync::Arc<dyn VcsOperations>,
  pub ai_client: Option<std::sync::Arc<dyn VcsAiClient>>,
  pub reporter: Option<std::sync::Arc<dyn Reporter>>,
}
