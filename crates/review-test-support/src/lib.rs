//! In-memory fakes for every port trait in `review-types::ports`, used as a
//! dev-dependency by the other crates' test suites.

mod ai_client;
mod branch_file_repo;
mod branch_issue_repo;
mod branch_repo;
mod code_analysis_issue_repo;
mod progress;
mod project_repo;
mod rag_operations;
mod reporter;
mod vcs_ai_client;
mod vcs_operations;

pub use ai_client::FakeAiAnalysisClient;
pub use branch_file_repo::FakeBranchFileRepository;
pub use branch_issue_repo::FakeBranchIssueRepository;
pub use branch_repo::FakeBranchRepository;
pub use code_analysis_issue_repo::FakeCodeAnalysisIssueRepository;
pub use progress::RecordingProgressSink;
pub use project_repo::FakeProjectRepository;
pub use rag_operations::FakeRagOperations;
pub use reporter::FakeReporter;
pub use vcs_ai_client::FakeVcsAiClient;
pub use vcs_operations::FakeVcsOperations;
