//! Bitbucket Cloud provider (REST v2): diff retrieval, commit-to-PR lookup,
//! file existence checks and comment posting.
//!
//! Endpoints used:
//!   * GET  /2.0/repositories/{workspace}/{repo_slug}/diff/{spec}
//!   * GET  /2.0/repositories/{workspace}/{repo_slug}/pullrequests/{id}/diff
//!   * GET  /2.0/repositories/{workspace}/{repo_slug}/commit/{sha}/pullrequests
//!   * GET  /2.0/repositories/{workspace}/{repo_slug}/src/{branch}/{path}
//!   * POST /2.0/repositories/{workspace}/{repo_slug}/pullrequests/{id}/comments

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use review_types::model::{CodeAnalysisIssue, Project};
use review_types::ports::{Reporter, VcsOperations};
use review_types::requests::ProcessRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// One Bitbucket Cloud REST client, bound to a single workspace/repo's
/// connection details (base API URL and auth header value).
#[derive(Debug, Clone)]
pub struct BitbucketCloudClient {
  http: reqwest::Client,
  base_api_url: String,
  auth_header: String,
}

impl BitbucketCloudClient {
  pub fn new(base_api_url: impl Into<String>, auth_header: impl Into<String>) -> anyhow::Result<Self> {
    let http = reqwest::Client::builder().user_agent("review-core/0.1").timeout(Duration::from_secs(30)).build().context("failed to build Bitbucket Cloud HTTP client")?;

    Ok(Self {
      http,
      base_api_url: base_api_url.into(),
      auth_header: auth_header.into(),
    })
  }

  fn repo_url(&self, workspace: &str, repo_slug: &str, tail: &str) -> String {
    format!("{}/repositories/{workspace}/{repo_slug}{tail}", self.base_api_url)
  }

  async fn get_text(&self, url: &str) -> anyhow::Result<String> {
    let text = self.http.get(url).header("Authorization", &self.auth_header).send().await?.error_for_status()?.text().await?;
    Ok(text)
  }
}

#[async_trait]
impl VcsOperations for BitbucketCloudClient {
  #[instrument(skip(self), fields(workspace, repo_slug, base_sha, head_sha))]
  async fn get_commit_range_diff(&self, workspace: &str, repo_slug: &str, base_sha: &str, head_sha: &str) -> anyhow::Result<String> {
    let url = self.repo_url(workspace, repo_slug, &format!("/diff/{base_sha}..{head_sha}"));
    debug!(url, "fetching range diff");
    self.get_text(&url).await
  }

  #[instrument(skip(self), fields(workspace, repo_slug, pr_number))]
  async fn get_pull_request_diff(&self, workspace: &str, repo_slug: &str, pr_number: i64) -> anyhow::Result<String> {
    let url = self.repo_url(workspace, repo_slug, &format!("/pullrequests/{pr_number}/diff"));
    debug!(url, "fetching pull request diff");
    self.get_text(&url).await
  }

  #[instrument(skip(self), fields(workspace, repo_slug, sha))]
  async fn get_commit_diff(&self, workspace: &str, repo_slug: &str, sha: &str) -> anyhow::Result<String> {
    let url = self.repo_url(workspace, repo_slug, &format!("/diff/{sha}"));
    debug!(url, "fetching commit diff");
    self.get_text(&url).await
  }

  #[instrument(skip(self), fields(workspace, repo_slug, sha))]
  async fn find_pull_request_for_commit(&self, workspace: &str, repo_slug: &str, sha: &str) -> anyhow::Result<Option<i64>> {
    let url = self.repo_url(workspace, repo_slug, &format!("/commit/{sha}/pullrequests"));
    debug!(url, "looking up pull request for commit");

    let response = self.http.get(&url).header("Authorization", &self.auth_header).send().await?;

    if response.status().as_u16() == 404 {
      return Ok(None);
    }

    let page: PullRequestPage = response.error_for_status()?.json().await?;
    Ok(page.values.first().map(|pr| pr.id))
  }

  #[instrument(skip(self), fields(workspace, repo_slug, branch, path))]
  async fn check_file_exists_in_branch(&self, workspace: &str, repo_slug: &str, branch: &str, path: &str) -> anyhow::Result<bool> {
    let url = self.repo_url(workspace, repo_slug, &format!("/src/{branch}/{path}"));
    debug!(url, "checking file existence");

    let response = self.http.head(&url).header("Authorization", &self.auth_header).send().await?;

    match response.status().as_u16() {
      404 => Ok(false),
      _ => {
        response.error_for_status()?;
        Ok(true)
      }
    }
  }
}

#[async_trait]
impl Reporter for BitbucketCloudClient {
  #[instrument(skip(self, project, summary), fields(project_id = project.project_id))]
  async fn post_summary_comment(&self, project: &Project, process_request: &ProcessRequest, summary: &str) -> anyhow::Result<()> {
    let Some(pr_number) = process_request.source_pull_request_number else {
      debug!("no pull request associated with this analysis; skipping summary comment");
      return Ok(());
    };

    let binding = project.vcs.as_ref().ok_or_else(|| anyhow!("project has no VCS binding"))?;
    let url = self.repo_url(&binding.workspace_slug, &binding.repo_slug, &format!("/pullrequests/{pr_number}/comments"));

    let payload = CommentCreate { content: Content { raw: summary }, inline: None };

    self.http.post(&url).header("Authorization", &self.auth_header).json(&payload).send().await?.error_for_status()?;

    Ok(())
  }

  #[instrument(skip(self, project, issues), fields(project_id = project.project_id, issue_count = issues.len()))]
  async fn post_inline_annotations(&self, project: &Project, process_request: &ProcessRequest, issues: &[CodeAnalysisIssue]) -> anyhow::Result<()> {
    let Some(pr_number) = process_request.source_pull_request_number else {
      debug!("no pull request associated with this analysis; skipping inline annotations");
      return Ok(());
    };

    let binding = project.vcs.as_ref().ok_or_else(|| anyhow!("project has no VCS binding"))?;
    let url = self.repo_url(&binding.workspace_slug, &binding.repo_slug, &format!("/pullrequests/{pr_number}/comments"));

    for issue in issues {
      let payload = CommentCreate {
        content: Content { raw: &format!("[{:?}] {}", issue.severity, issue.category) },
        inline: Some(Inline { path: &issue.file_path, to: issue.line_number as i64 }),
      };

      let response = self.http.post(&url).header("Authorization", &self.auth_header).json(&payload).send().await?;

      if let Err(e) = response.error_for_status_ref() {
        warn!(error = %e, file_path = %issue.file_path, "failed to post inline annotation");
      }
    }

    Ok(())
  }
}

#[derive(Debug, Deserialize)]
struct PullRequestPage {
  values: Vec<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
  id: i64,
}

#[derive(Debug, Serialize)]
struct CommentCreate<'a> {
  content: Content<'a>,
  #[serde(skip_serializing_if = "Option::is_none")]
  inline: Option<Inline<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
  raw: &'a str,
}

#[derive(Debug, Serialize)]
struct Inline<'a> {
  path: &'a str,
  to: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn repo_url_joins_base_workspace_repo_and_tail() {
    let client = BitbucketCloudClient::new("https://api.bitbucket.org/2.0", "Bearer token").unwrap();
    assert_eq!(client.repo_url("acme", "widgets", "/diff/abc..def"), "https://api.bitbucket.org/2.0/repositories/acme/widgets/diff/abc..def");
  }
}
