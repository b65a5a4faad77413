//! Domain model for the branch analysis orchestrator.
//!
//! These types are read by the orchestrator from `Repositories` and, where
//! noted, written back by it. Field shapes follow the persisted records
//! described by the analysis pipeline; the orchestrator is the only writer
//! of `Branch.health` / `Branch.last_successful_commit_hash`.

use serde::{Deserialize, Serialize};

/// Tag identifying which hosted VCS a project's repository lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTag {
  BitbucketCloud,
  GitHub,
  GitLab,
  BitbucketServer,
}

impl std::fmt::Display for ProviderTag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      ProviderTag::BitbucketCloud => "bitbucket_cloud",
      ProviderTag::GitHub => "github",
      ProviderTag::GitLab => "gitlab",
      ProviderTag::BitbucketServer => "bitbucket_server",
    };
    f.write_str(name)
  }
}

/// Connection details needed to reach a project's VCS. Token material is
/// deliberately opaque here (encryption/storage is out of scope); the core
/// only ever forwards this value to the `VcsOperations`/`Reporter` impl
/// registered for the provider.
#[derive(Debug, Clone)]
pub struct VcsConnection {
  pub base_api_url: String,
  pub auth_token: String,
}

/// The effective VCS repository reference for a project.
#[derive(Debug, Clone)]
pub struct VcsBinding {
  pub provider: ProviderTag,
  pub workspace_slug: String,
  pub repo_slug: String,
  pub connection: VcsConnection,
}

/// AI model connection used for a project's analyses.
#[derive(Debug, Clone)]
pub struct AiConnection {
  pub provider_model_id: String,
  pub api_key: String,
  pub token_limitation: u32,
}

/// Read-only project configuration as seen by the core.
#[derive(Debug, Clone)]
pub struct Project {
  pub project_id: i64,
  pub workspace_name: String,
  pub namespace: String,
  pub vcs: Option<VcsBinding>,
  pub ai: Option<AiConnection>,
  pub base_branch: String,
  pub rag_enabled: bool,
}

/// Health of a branch's most recent analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchHealth {
  Healthy,
  Stale,
  Indexing,
}

/// Per-severity issue counters carried on a `Branch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
  pub high: u32,
  pub medium: u32,
  pub low: u32,
  pub info: u32,
}

impl SeverityCounts {
  pub fn total(&self) -> u32 {
    self.high + self.medium + self.low + self.info
  }

  pub fn increment(&mut self, severity: Severity) {
    match severity {
      Severity::High => self.high += 1,
      Severity::Medium => self.medium += 1,
      Severity::Low => self.low += 1,
      Severity::Info => self.info += 1,
    }
  }
}

/// One `(projectId, branchName)` record. The orchestrator is the sole
/// writer of `last_successful_commit_hash` and `health`.
#[derive(Debug, Clone)]
pub struct Branch {
  pub id: i64,
  pub project_id: i64,
  pub branch_name: String,
  pub last_successful_commit_hash: Option<String>,
  pub health: BranchHealth,
  pub total_issue_count: u32,
  pub severity_counts: SeverityCounts,
}

impl Branch {
  pub fn new(id: i64, project_id: i64, branch_name: impl Into<String>) -> Self {
    Self {
      id,
      project_id,
      branch_name: branch_name.into(),
      last_successful_commit_hash: None,
      health: BranchHealth::Indexing,
      total_issue_count: 0,
      severity_counts: SeverityCounts::default(),
    }
  }
}

/// A file currently present in a branch, with a cached issue count.
#[derive(Debug, Clone)]
pub struct BranchFile {
  pub project_id: i64,
  pub branch_name: String,
  pub file_path: String,
  pub issue_count: u32,
}

/// Severity of a `CodeAnalysisIssue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
  High,
  Medium,
  Low,
  Info,
}

/// A persisted, immutable-except-for-resolution analysis finding. Created
/// by PR analyses outside this core; the orchestrator only reads these and
/// may flip `resolved` to `true`.
#[derive(Debug, Clone)]
pub struct CodeAnalysisIssue {
  pub id: i64,
  pub project_id: i64,
  pub file_path: String,
  pub line_number: u32,
  pub severity: Severity,
  pub category: String,
  pub resolved: bool,
  /// The branch this issue was first reported on. Used by the
  /// branch-specific filter (P6): only re-evaluated when the current
  /// request's branch matches this field.
  pub branch_name: String,
  pub commit_hash: String,
  pub resolved_in_commit_hash: Option<String>,
  pub resolved_in_pr_number: Option<i64>,
  pub resolved_description: Option<String>,
}

/// Association between a `Branch` and a `CodeAnalysisIssue` that is
/// considered still-open on that branch.
#[derive(Debug, Clone)]
pub struct BranchIssue {
  pub branch_id: i64,
  pub code_analysis_issue_id: i64,
  pub resolved: bool,
  pub resolved_in_commit_hash: Option<String>,
  pub resolved_in_pr_number: Option<i64>,
  pub resolved_description: Option<String>,
}

impl BranchIssue {
  pub fn new_open(branch_id: i64, code_analysis_issue_id: i64) -> Self {
    Self {
      branch_id,
      code_analysis_issue_id,
      resolved: false,
      resolved_in_commit_hash: None,
      resolved_in_pr_number: None,
      resolved_description: None,
    }
  }
}

/// The only lock type the core ever acquires. Kept as an enum (not a unit
/// struct) because the lock key is logically an extensible tag in the
/// source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockType {
  BranchAnalysis,
}

/// Key identifying one logical `AnalysisLock`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisLockKey {
  pub project_id: i64,
  pub branch_name: String,
  pub lock_type: LockType,
}

impl AnalysisLockKey {
  pub fn branch_analysis(project_id: i64, branch_name: impl Into<String>) -> Self {
    Self {
      project_id,
      branch_name: branch_name.into(),
      lock_type: LockType::BranchAnalysis,
    }
  }
}
