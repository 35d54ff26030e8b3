//! Thin GitHub REST client.
//!
//! Fetches a user's repositories with their language breakdown and raw README.
//! Authenticated with `GITHUB_TOKEN` when configured, anonymous otherwise.

use std::collections::HashMap;

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;

const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const MAX_REPOS: usize = 30;

/// A repository as returned by the list endpoint. Only the fields we use.
#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    html_url: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    license: Option<ApiLicense>,
    homepage: Option<String>,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
    created_at: Option<String>,
    updated_at: Option<String>,
    owner: ApiOwner,
}

#[derive(Debug, Deserialize)]
struct ApiLicense {
    name: Option<String>,
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

/// A repository with everything needed to build portfolio documents.
#[derive(Debug, Clone, Default)]
pub struct GitHubRepo {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    /// Bytes of code per language.
    pub languages: HashMap<String, u64>,
    pub topics: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub is_fork: bool,
    pub is_archived: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub readme: Option<String>,
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base_url: GITHUB_API_URL.to_string(),
            token,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Up to 30 of the user's most recently updated non-fork repositories.
    /// An unknown user is `NotFound`.
    pub async fn fetch_user_repos(&self, username: &str) -> Result<Vec<GitHubRepo>, AppError> {
        let url = format!(
            "{}/users/{username}/repos?sort=updated&direction=desc&per_page=100&type=owner",
            self.base_url
        );
        let response = self
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("GitHub request failed: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!(
                    "GitHub user '{username}' not found"
                )))
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::Upstream(format!(
                    "GitHub API returned {status}: {body}"
                )));
            }
            _ => {}
        }

        let listed: Vec<ApiRepo> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("unexpected GitHub response: {e}")))?;

        let mut repos = Vec::new();
        for api_repo in select_repos(listed) {
            let languages = self
                .fetch_languages(&api_repo.owner.login, &api_repo.name)
                .await;
            let readme = self.fetch_readme(&api_repo.owner.login, &api_repo.name).await;
            repos.push(into_repo(api_repo, languages, readme));
        }

        info!("Fetched {} repositories for {username}", repos.len());
        Ok(repos)
    }

    /// Language byte counts. Failures degrade to an empty map.
    async fn fetch_languages(&self, owner: &str, repo: &str) -> HashMap<String, u64> {
        let url = format!("{}/repos/{owner}/{repo}/languages", self.base_url);
        let result = async {
            self.get(&url)
                .header(header::ACCEPT, "application/vnd.github+json")
                .send()
                .await?
                .error_for_status()?
                .json::<HashMap<String, u64>>()
                .await
        }
        .await;

        result.unwrap_or_else(|e| {
            warn!("Could not fetch languages for {owner}/{repo}: {e}");
            HashMap::new()
        })
    }

    /// Raw README text, or `None` when the repository has none.
    async fn fetch_readme(&self, owner: &str, repo: &str) -> Option<String> {
        let url = format!("{}/repos/{owner}/{repo}/readme", self.base_url);
        let response = match self
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github.raw")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("README request failed for {owner}/{repo}: {e}");
                return None;
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            return None;
        }
        if !response.status().is_success() {
            warn!(
                "README for {owner}/{repo} returned {}",
                response.status()
            );
            return None;
        }

        response
            .text()
            .await
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Drops forks, orders by `updated_at` descending and keeps the first 30.
fn select_repos(mut listed: Vec<ApiRepo>) -> Vec<ApiRepo> {
    listed.retain(|r| !r.fork);
    // ISO-8601 timestamps order lexicographically.
    listed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    listed.truncate(MAX_REPOS);
    listed
}

fn into_repo(
    api: ApiRepo,
    languages: HashMap<String, u64>,
    readme: Option<String>,
) -> GitHubRepo {
    let license = api
        .license
        .and_then(|l| l.name.or(l.spdx_id))
        .filter(|l| !l.is_empty());

    GitHubRepo {
        name: api.name,
        url: api.html_url,
        description: api.description.filter(|d| !d.trim().is_empty()),
        language: api.language,
        languages,
        topics: api.topics,
        stars: api.stargazers_count,
        forks: api.forks_count,
        license,
        homepage: api.homepage.filter(|h| !h.trim().is_empty()),
        is_fork: api.fork,
        is_archived: api.archived,
        created_at: api.created_at,
        updated_at: api.updated_at,
        readme,
    }
}
