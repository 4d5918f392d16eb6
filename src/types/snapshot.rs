// src/types/snapshot.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GitHub profile snapshot: public profile, repository list, and aggregate
/// stats. Owned transiently per request, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubSnapshot {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub repositories: Vec<RepoSummary>,
    pub stats: GithubStats,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub url: String,
    pub is_fork: bool,
}

/// Aggregate stats computed over the repository list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubStats {
    pub total_repos: usize,
    pub total_stars: u32,
    pub total_forks: u32,
    /// Languages by repository count, most common first.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_languages: Vec<String>,
}

/// Instagram profile snapshot mined from the public profile page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstagramSnapshot {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_count: Option<u64>,
    pub fetched_at: DateTime<Utc>,
}

impl InstagramSnapshot {
    pub fn has_data(&self) -> bool {
        self.bio.is_some() || self.followers.is_some() || self.posts_count.is_some()
    }
}

/// Per-source outcome reported alongside the merged profile, so callers can
/// distinguish "field absent" from "source failed".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    /// Source was neither requested nor discovered from the resume.
    Skipped,
    NotFound,
    Failed { reason: String },
    RateLimited,
    TimedOut,
}

impl SourceStatus {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Failed { .. } | Self::RateLimited | Self::TimedOut
        )
    }
}

pub type SourceStatusMap = BTreeMap<String, SourceStatus>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_status_wire_shape() {
        let ok = serde_json::to_value(&SourceStatus::Ok).unwrap();
        assert_eq!(ok, serde_json::json!({"state": "ok"}));

        let failed = serde_json::to_value(&SourceStatus::failed("connection refused")).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"state": "failed", "reason": "connection refused"})
        );
    }

    #[test]
    fn test_absent_snapshot_fields_omitted() {
        let snapshot = InstagramSnapshot {
            username: "alice_gram".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("username"));
        assert!(!obj.contains_key("bio"));
        assert!(!obj.contains_key("followers"));
    }
}
