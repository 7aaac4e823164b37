//! GitHub service implementation
//!
//! Pull requests go through octocrab's REST client. Discussions only exist
//! in the GraphQL API, which is called directly with reqwest.

use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::types::{
    Discussion, DiscussionCategories, DiscussionCategory, HostingConfig, MergeMethod, PullRequest,
    RepoTarget,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Description given to repositories created by the tool
const REPOSITORY_DESCRIPTION: &str = "Repository created with git-backfill";

const CATEGORIES_QUERY: &str = r"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
    discussionCategories(first: 25) {
      nodes { id name isAnswerable }
    }
  }
}";

const CREATE_DISCUSSION_MUTATION: &str = r"
mutation($repositoryId: ID!, $categoryId: ID!, $title: String!, $body: String!) {
  createDiscussion(input: {repositoryId: $repositoryId, categoryId: $categoryId, title: $title, body: $body}) {
    discussion { id number url }
  }
}";

const ADD_COMMENT_MUTATION: &str = r"
mutation($discussionId: ID!, $body: String!) {
  addDiscussionComment(input: {discussionId: $discussionId, body: $body}) {
    comment { id }
  }
}";

const MARK_ANSWER_MUTATION: &str = r"
mutation($id: ID!) {
  markDiscussionCommentAsAnswer(input: {id: $id}) {
    discussion { id }
  }
}";

/// REST and GraphQL endpoints for a GitHub host
fn endpoints(host: Option<&str>) -> (String, String) {
    host.map_or_else(
        || {
            (
                "https://api.github.com".to_string(),
                "https://api.github.com/graphql".to_string(),
            )
        },
        |h| (format!("https://{h}/api/v3"), format!("https://{h}/api/graphql")),
    )
}

fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("git-backfill/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?)
}

/// GitHub service using octocrab for REST and reqwest for GraphQL
pub struct GitHubService {
    client: Octocrab,
    http: Client,
    token: String,
    graphql_url: String,
    config: HostingConfig,
}

impl GitHubService {
    /// Create a service for the repository described by `config`
    pub fn new(token: &str, config: HostingConfig) -> Result<Self> {
        let (api_base, graphql_url) = endpoints(config.host.as_deref());
        Self::with_endpoints(token, config, &api_base, &graphql_url)
    }

    /// Create a service against explicit REST and GraphQL endpoints
    pub fn with_endpoints(
        token: &str,
        config: HostingConfig,
        api_base: &str,
        graphql_url: &str,
    ) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base)?
            .build()?;

        Ok(Self {
            client,
            http: http_client()?,
            token: token.to_string(),
            graphql_url: graphql_url.to_string(),
            config,
        })
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&text)
            .map_err(|e| Error::Parse(format!("unexpected GraphQL response: {e}")))?;

        if let Some(first) = envelope.errors.first() {
            return Err(Error::Api {
                status: Some(status.as_u16()),
                message: first.message.clone(),
            });
        }

        envelope
            .data
            .ok_or_else(|| Error::Parse("GraphQL response carried no data".to_string()))
    }
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct RepositoryData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    id: String,
    discussion_categories: Nodes<DiscussionCategory>,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDiscussionData {
    create_discussion: DiscussionPayload,
}

#[derive(Deserialize)]
struct DiscussionPayload {
    discussion: Discussion,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentData {
    add_discussion_comment: CommentPayload,
}

#[derive(Deserialize)]
struct CommentPayload {
    comment: NodeId,
}

#[derive(Deserialize)]
struct NodeId {
    id: String,
}

#[async_trait]
impl HostingService for GitHubService {
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;

        Ok(PullRequest {
            number: pr.number,
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            base_ref: pr.base.ref_field.clone(),
            head_ref: pr.head.ref_field.clone(),
            title: pr.title.as_deref().unwrap_or_default().to_string(),
        })
    }

    async fn merge_pr(&self, number: u64, title: &str, method: MergeMethod) -> Result<()> {
        let method = match method {
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
        };

        self.client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(number)
            .title(title)
            .method(method)
            .send()
            .await?;
        Ok(())
    }

    async fn discussion_categories(&self) -> Result<DiscussionCategories> {
        let data: RepositoryData = self
            .graphql(
                CATEGORIES_QUERY,
                json!({ "owner": self.config.owner, "name": self.config.repo }),
            )
            .await?;

        let repository = data.repository.ok_or_else(|| Error::Api {
            status: None,
            message: format!(
                "repository {}/{} not found",
                self.config.owner, self.config.repo
            ),
        })?;

        Ok(DiscussionCategories {
            repository_id: repository.id,
            categories: repository.discussion_categories.nodes,
        })
    }

    async fn create_discussion(
        &self,
        repository_id: &str,
        category_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Discussion> {
        let data: CreateDiscussionData = self
            .graphql(
                CREATE_DISCUSSION_MUTATION,
                json!({
                    "repositoryId": repository_id,
                    "categoryId": category_id,
                    "title": title,
                    "body": body,
                }),
            )
            .await?;
        Ok(data.create_discussion.discussion)
    }

    async fn add_discussion_comment(&self, discussion_id: &str, body: &str) -> Result<String> {
        let data: AddCommentData = self
            .graphql(
                ADD_COMMENT_MUTATION,
                json!({ "discussionId": discussion_id, "body": body }),
            )
            .await?;
        Ok(data.add_discussion_comment.comment.id)
    }

    async fn mark_discussion_answer(&self, comment_id: &str) -> Result<()> {
        let _: Value = self
            .graphql(MARK_ANSWER_MUTATION, json!({ "id": comment_id }))
            .await?;
        Ok(())
    }
}

/// Result of asking GitHub for a new repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedRepository {
    /// Created, ready to clone
    Created(RepoTarget),
    /// A repository with that name already exists for the user
    AlreadyExists,
}

#[derive(Deserialize)]
struct CreatedRepoResponse {
    name: String,
    clone_url: String,
}

#[derive(Deserialize)]
struct UserResponse {
    login: String,
}

/// The token's owner as seen by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Account login
    pub login: String,
    /// OAuth scopes granted to a classic token; None for fine-grained tokens
    pub scopes: Option<Vec<String>>,
}

/// Operations on the authenticated user's account
pub struct GitHubAccount {
    http: Client,
    token: String,
    api_base: String,
    web_base: String,
}

impl GitHubAccount {
    /// Account on github.com, or on `host` for GitHub Enterprise
    pub fn new(token: &str, host: Option<&str>) -> Result<Self> {
        let (api_base, _) = endpoints(host);
        let web_base = format!("https://{}", host.unwrap_or("github.com"));
        Self::with_endpoints(token, &api_base, &web_base)
    }

    /// Account against an explicit REST endpoint
    pub fn with_endpoints(token: &str, api_base: &str, web_base: &str) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            web_base: web_base.trim_end_matches('/').to_string(),
        })
    }

    /// The token's owner and, for classic tokens, its scopes
    pub async fn current_user(&self) -> Result<AuthenticatedUser> {
        let response = self
            .http
            .get(format!("{}/user", self.api_base))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth("token rejected by GitHub".to_string()));
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: Some(status.as_u16()),
                message: response.text().await?,
            });
        }

        let scopes = response
            .headers()
            .get("x-oauth-scopes")
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect()
            });
        let user: UserResponse = response.json().await?;
        Ok(AuthenticatedUser {
            login: user.login,
            scopes,
        })
    }

    /// Create `name` under the user's account, initialized with a README
    pub async fn create_repository(&self, name: &str, private: bool) -> Result<CreatedRepository> {
        debug!("Creating repository {name} (private: {private})");
        let response = self
            .http
            .post(format!("{}/user/repos", self.api_base))
            .bearer_auth(&self.token)
            .json(&json!({
                "name": name,
                "private": private,
                "auto_init": true,
                "description": REPOSITORY_DESCRIPTION,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                let repo: CreatedRepoResponse = response.json().await?;
                Ok(CreatedRepository::Created(RepoTarget {
                    name: repo.name,
                    clone_url: repo.clone_url,
                }))
            }
            StatusCode::UNPROCESSABLE_ENTITY => Ok(CreatedRepository::AlreadyExists),
            status => Err(Error::Api {
                status: Some(status.as_u16()),
                message: response.text().await?,
            }),
        }
    }

    /// Clone URL of an existing repository owned by `owner`
    pub fn repository_url(&self, owner: &str, name: &str) -> String {
        format!("{}/{owner}/{name}.git", self.web_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_for_enterprise_host() {
        let (api, graphql) = endpoints(Some("github.example.com"));
        assert_eq!(api, "https://github.example.com/api/v3");
        assert_eq!(graphql, "https://github.example.com/api/graphql");

        let (api, graphql) = endpoints(None);
        assert_eq!(api, "https://api.github.com");
        assert_eq!(graphql, "https://api.github.com/graphql");
    }

    #[test]
    fn test_repository_url() {
        let account = GitHubAccount::new("t", None).unwrap();
        assert_eq!(
            account.repository_url("octo", "api-service"),
            "https://github.com/octo/api-service.git"
        );
    }
}
