//! Inbound request/outcome types for `Orchestrator::process`.

use crate::model::ProviderTag;

/// One `(project, branch, commit)` event to analyze.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
  pub project_id: i64,
  pub target_branch_name: String,
  pub commit_hash: String,
  pub source_pull_request_number: Option<i64>,
}

/// Why `process` short-circuited without running analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  CommitAlreadyAnalyzed,
}

/// Successful result of `process`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
  Accepted { branch_id: i64, chunk_count: Option<u32> },
  Skipped { reason: SkipReason },
}

/// A stage tag attached to `ProgressEvent`s, matching spec's stage list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Init,
  Diff,
  Sync,
  Ai,
  Rag,
  Complete,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::Init => "init",
      Stage::Diff => "diff",
      Stage::Sync => "sync",
      Stage::Ai => "ai",
      Stage::Rag => "rag",
      Stage::Complete => "complete",
    }
  }
}

/// One progress update emitted during `process`. `message` is a short
/// human-readable note; `detail` carries any stage-specific key/value pairs
/// a caller may want (kept as a flat string map to stay transport-agnostic).
#[derive(Debug, Clone)]
pub struct ProgressEvent {
  pub stage: Stage,
  pub message: String,
  pub detail: Vec<(String, String)>,
}

impl ProgressEvent {
  pub fn new(stage: Stage, message: impl Into<String>) -> Self {
    Self {
      stage,
      message: message.into(),
      detail: Vec::new(),
    }
  }

  pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.detail.push((key.into(), value.into()));
    self
  }
}

/// A raw unified diff plus the VCS context it was fetched under, carried
/// alongside the selection tier that produced it (useful for logging/tests).
#[derive(Debug, Clone)]
pub struct SelectedDiff {
  pub raw_diff: String,
  pub tier: DiffTier,
}

/// Which of the three fallback tiers produced the diff (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTier {
  Delta,
  PullRequest,
  Commit,
}

/// One AI-returned verdict about whether a historical issue is now fixed.
#[derive(Debug, Clone)]
pub struct Verdict {
  pub issue_id: i64,
  pub is_resolved: bool,
  pub reason: Option<String>,
}

/// A candidate issue handed to the AI for re-evaluation.
#[derive(Debug, Clone)]
pub struct CandidateIssue {
  pub issue_id: i64,
  pub file_path: String,
  pub line_number: u32,
  pub severity: crate::model::Severity,
  pub category: String,
}

/// Request built for a single `AiAnalysisClient::perform_analysis` call.
/// Carries the project metadata and credentials the outbound call needs
/// alongside the diff/candidates, so an `AiAnalysisClient` implementation
/// never has to reach back into a `Project` or a connection store mid-call.
#[derive(Debug, Clone)]
pub struct AiAnalysisRequest {
  pub raw_diff: String,
  pub candidates: Vec<CandidateIssue>,
  pub project_id: i64,
  pub workspace_name: String,
  pub namespace: String,
  pub token_ceiling: u32,
  pub provider: ProviderTag,
  pub provider_model_id: String,
  pub api_key: String,
}
