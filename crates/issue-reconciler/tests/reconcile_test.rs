use indexmap::IndexSet;
use issue_reconciler::reconcile_issues;
use review_test_support::{FakeAiAnalysisClient, FakeBranchIssueRepository, FakeCodeAnalysisIssueRepository, FakeVcsAiClient, RecordingProgressSink};
use std::sync::Arc;
use review_types::model::{CodeAnalysisIssue, Project, Severity};
use review_types::requests::ProcessRequest;
use serde_json::json;

fn project(project_id: i64) -> Project {
  Project {
    project_id,
    workspace_name: "acme".into(),
    namespace: "acme/widgets".into(),
    vcs: None,
    ai: None,
    base_branch: "main".into(),
    rag_enabled: false,
  }
}

fn open_issue(id: i64, branch_name: &str, file_path: &str) -> CodeAnalysisIssue {
  CodeAnalysisIssue {
    id,
    project_id: 1,
    file_path: file_path.into(),
    line_number: 10,
    severity: Severity::Medium,
    category: "style".into(),
    resolved: false,
    branch_name: branch_name.into(),
    commit_hash: "deadbeef".into(),
    resolved_in_commit_hash: None,
    resolved_in_pr_number: None,
    resolved_description: None,
  }
}

fn process_request(branch_name: &str, commit_hash: &str) -> ProcessRequest {
  ProcessRequest {
    project_id: 1,
    target_branch_name: branch_name.into(),
    commit_hash: commit_hash.into(),
    source_pull_request_number: None,
  }
}

#[tokio::test]
async fn resolves_an_issue_the_ai_marks_fixed() {
  let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
  let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());

  code_analysis_issues.seed(open_issue(42, "feature/x", "src/lib.rs"));
  branch_issues.seed(review_types::model::BranchIssue::new_open(1, 42));

  let ai_client = FakeAiAnalysisClient::with_response(json!({"issues": [{"issueId": 42, "isResolved": true, "reason": "guarded now"}]}));
  let vcs_ai_client = FakeVcsAiClient::new("diff --git a/src/lib.rs b/src/lib.rs");
  let progress = RecordingProgressSink::new();

  let mut changed_files = IndexSet::new();
  changed_files.insert("src/lib.rs".to_string());

  let outcome = reconcile_issues(&branch_issues, &code_analysis_issues, &ai_client, &vcs_ai_client, &progress, &project(1), &process_request("feature/x", "cafebabe"), 1, &changed_files)
    .await
    .unwrap();

  assert_eq!(outcome.candidate_count, 1);
  assert_eq!(outcome.resolved_count, 1);
  assert_eq!(ai_client.call_count(), 1);

  let stored = branch_issues.find(1, 42).await.unwrap().unwrap();
  assert!(stored.resolved);
  assert_eq!(stored.resolved_in_commit_hash.as_deref(), Some("cafebabe"));

  let updated_issue = code_analysis_issues.get(42).unwrap();
  assert!(updated_issue.resolved);
}

#[tokio::test]
async fn skips_ai_call_when_there_are_no_candidates() {
  let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
  let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());
  let ai_client = FakeAiAnalysisClient::failing();
  let vcs_ai_client = FakeVcsAiClient::new("");
  let progress = RecordingProgressSink::new();

  let mut changed_files = IndexSet::new();
  changed_files.insert("src/untouched.rs".to_string());

  let outcome = reconcile_issues(&branch_issues, &code_analysis_issues, &ai_client, &vcs_ai_client, &progress, &project(1), &process_request("feature/x", "cafebabe"), 1, &changed_files)
    .await
    .unwrap();

  assert_eq!(outcome.candidate_count, 0);
  assert_eq!(outcome.resolved_count, 0);
  assert_eq!(ai_client.call_count(), 0);
}

#[tokio::test]
async fn drops_candidates_recorded_on_a_different_branch() {
  let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
  let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());

  code_analysis_issues.seed(open_issue(7, "other-branch", "src/lib.rs"));
  branch_issues.seed(review_types::model::BranchIssue::new_open(1, 7));

  let ai_client = FakeAiAnalysisClient::with_response(json!({"issues": []}));
  let vcs_ai_client = FakeVcsAiClient::new("diff --git a/src/lib.rs b/src/lib.rs");
  let progress = RecordingProgressSink::new();

  let mut changed_files = IndexSet::new();
  changed_files.insert("src/lib.rs".to_string());

  let outcome = reconcile_issues(&branch_issues, &code_analysis_issues, &ai_client, &vcs_ai_client, &progress, &project(1), &process_request("feature/x", "cafebabe"), 1, &changed_files)
    .await
    .unwrap();

  assert_eq!(outcome.candidate_count, 0);
  assert_eq!(ai_client.call_count(), 0);
}

#[tokio::test]
async fn already_resolved_issues_are_never_regathered_as_candidates() {
  let code_analysis_issues = Arc::new(FakeCodeAnalysisIssueRepository::new());
  let branch_issues = FakeBranchIssueRepository::new(code_analysis_issues.clone());

  code_analysis_issues.seed(open_issue(9, "feature/x", "src/lib.rs"));
  let mut resolved = review_types::model::BranchIssue::new_open(1, 9);
  resolved.resolved = true;
  resolved.resolved_in_commit_hash = Some("earliercommit".into());
  resolved.resolved_description = Some("fixed previously".into());
  branch_issues.seed(resolved);

  let ai_client = FakeAiAnalysisClient::with_response(json!({"issues": [{"issueId": 9, "isResolved": true, "reason": "different reasoning this time"}]}));
  let vcs_ai_client = FakeVcsAiClient::new("diff --git a/src/lib.rs b/src/lib.rs");
  let progress = RecordingProgressSink::new();

  let mut changed_files = IndexSet::new();
  changed_files.insert("src/lib.rs".to_string());

  let outcome = reconcile_issues(&branch_issues, &code_analysis_issues, &ai_client, &vcs_ai_client, &progress, &project(1), &process_request("feature/x", "newcommit"), 1, &changed_files)
    .await
    .unwrap();

  // Already-resolved BranchIssues never surface as candidates, so the AI is
  // not even consulted about them (P4: nothing left to un-resolve).
  assert_eq!(outcome.candidate_count, 0);
  assert_eq!(outcome.resolved_count, 0);
  assert_eq!(ai_client.call_count(), 0);

  let stored = branch_issues.find(1, 9).await.unwrap().unwrap();
  assert_eq!(stored.resolved_in_commit_hash.as_deref(), Some("earliercommit"));
  assert_eq!(stored.resolved_description.as_deref(), Some("fixed previously"));
}
