// src/github.rs
//! GitHub profile fetching via the public REST API.

use crate::error::CollectError;
use crate::types::{GithubSnapshot, GithubStats, RepoSummary};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

const GITHUB_API_BASE: &str = "https://api.github.com";
const REPOS_PER_PAGE: u32 = 100;
const TOP_LANGUAGES: usize = 5;

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
    name: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    company: Option<String>,
    blog: Option<String>,
    email: Option<String>,
    #[serde(default)]
    public_repos: u32,
    #[serde(default)]
    followers: u32,
    #[serde(default)]
    following: u32,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    forks_count: u32,
    html_url: String,
    #[serde(default)]
    fork: bool,
}

pub struct GithubFetcher {
    client: Client,
    token: Option<String>,
}

impl GithubFetcher {
    pub fn new(timeout: Duration, token: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("candidate-collector")
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, token }
    }

    /// Fetch public profile, repository list and aggregate stats.
    ///
    /// 404 maps to `NotFound`; a 403 from GitHub means the API rate limit,
    /// reported as a fetch failure so the aggregate request still returns.
    pub async fn fetch_profile(&self, username: &str) -> Result<GithubSnapshot, CollectError> {
        info!("Fetching GitHub profile: {}", username);

        let user: UserResponse = self
            .get_json(&format!("{}/users/{}", GITHUB_API_BASE, username), &[])
            .await?;

        let repositories = self.fetch_repositories(username).await?;
        let stats = aggregate_stats(&repositories);

        Ok(GithubSnapshot {
            username: user.login,
            name: non_empty(user.name),
            bio: non_empty(user.bio),
            location: non_empty(user.location),
            company: non_empty(user.company),
            blog: non_empty(user.blog),
            email: non_empty(user.email),
            public_repos: user.public_repos,
            followers: user.followers,
            following: user.following,
            repositories,
            stats,
            fetched_at: Utc::now(),
        })
    }

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<RepoSummary>, CollectError> {
        let mut repos = Vec::new();
        let mut page = 1u32;

        loop {
            let page_str = page.to_string();
            let per_page_str = REPOS_PER_PAGE.to_string();
            let params = [
                ("page", page_str.as_str()),
                ("per_page", per_page_str.as_str()),
                ("sort", "updated"),
            ];
            let batch: Vec<RepoResponse> = self
                .get_json(
                    &format!("{}/users/{}/repos", GITHUB_API_BASE, username),
                    &params,
                )
                .await?;

            let batch_len = batch.len();
            repos.extend(batch.into_iter().map(|r| RepoSummary {
                name: r.name,
                description: r.description,
                language: r.language,
                stars: r.stargazers_count,
                forks: r.forks_count,
                url: r.html_url,
                is_fork: r.fork,
            }));

            if batch_len < REPOS_PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        info!("Fetched {} repositories for {}", repos.len(), username);
        Ok(repos)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CollectError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .query(params);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CollectError::fetch("github", e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Err(CollectError::NotFound),
            reqwest::StatusCode::FORBIDDEN => {
                warn!("GitHub API rate limit hit for {}", url);
                Err(CollectError::fetch(
                    "github",
                    "Rate limit exceeded. Please try again later",
                ))
            }
            status if !status.is_success() => Err(CollectError::fetch(
                "github",
                format!("HTTP error: {}", status),
            )),
            _ => response
                .json::<T>()
                .await
                .map_err(|e| CollectError::fetch("github", e.to_string())),
        }
    }
}

/// Aggregate repository stats: totals plus languages by repository count,
/// most common first (name breaks ties for determinism).
pub fn aggregate_stats(repos: &[RepoSummary]) -> GithubStats {
    let mut languages: HashMap<&str, usize> = HashMap::new();
    for repo in repos {
        if let Some(lang) = &repo.language {
            *languages.entry(lang.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = languages.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    GithubStats {
        total_repos: repos.len(),
        total_stars: repos.iter().map(|r| r.stars).sum(),
        total_forks: repos.iter().map(|r| r.forks).sum(),
        top_languages: ranked
            .into_iter()
            .take(TOP_LANGUAGES)
            .map(|(lang, _)| lang.to_string())
            .collect(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, language: Option<&str>, stars: u32, forks: u32) -> RepoSummary {
        RepoSummary {
            name: name.to_string(),
            description: None,
            language: language.map(|l| l.to_string()),
            stars,
            forks,
            url: format!("https://github.com/x/{}", name),
            is_fork: false,
        }
    }

    #[test]
    fn test_aggregate_stats_totals() {
        let repos = vec![
            repo("a", Some("Rust"), 10, 2),
            repo("b", Some("Rust"), 5, 1),
            repo("c", Some("Python"), 7, 0),
            repo("d", None, 1, 0),
        ];
        let stats = aggregate_stats(&repos);
        assert_eq!(stats.total_repos, 4);
        assert_eq!(stats.total_stars, 23);
        assert_eq!(stats.total_forks, 3);
        assert_eq!(stats.top_languages, vec!["Rust", "Python"]);
    }

    #[test]
    fn test_aggregate_stats_empty() {
        let stats = aggregate_stats(&[]);
        assert_eq!(stats.total_repos, 0);
        assert_eq!(stats.total_stars, 0);
        assert!(stats.top_languages.is_empty());
    }

    #[test]
    fn test_top_languages_capped_and_deterministic() {
        let repos: Vec<RepoSummary> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|l| repo(l, Some(l), 0, 0))
            .collect();
        let stats = aggregate_stats(&repos);
        assert_eq!(stats.top_languages.len(), TOP_LANGUAGES);
        // all counts equal, so ranking falls back to name order
        assert_eq!(stats.top_languages, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_non_empty_normalization() {
        assert_eq!(non_empty(Some("".to_string())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }
}
