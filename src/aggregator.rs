// src/aggregator.rs
//! Orchestrates one candidate submission: resume text first, then the
//! external sources concurrently, then an ordered merge into a single
//! `CandidateProfile` with a per-source status map.

use crate::error::CollectError;
use crate::extractor::{ExtractedLinks, FieldExtractor};
use crate::github::GithubFetcher;
use crate::instagram::InstagramFetcher;
use crate::portfolio::PortfolioScraper;
use crate::types::{
    CandidateProfile, GithubSnapshot, InstagramSnapshot, ProjectEntry, SourceStatus,
    SourceStatusMap,
};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// External sources to contact for one submission, after the resume's
/// extracted links have been applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePlan {
    pub portfolio_url: Option<String>,
    pub github_username: Option<String>,
    pub instagram_username: Option<String>,
}

/// Links found in the resume take precedence over directly supplied
/// values; direct values remain as fallback.
pub fn plan_sources(direct: SourcePlan, resume_links: Option<&ExtractedLinks>) -> SourcePlan {
    match resume_links {
        Some(links) => SourcePlan {
            portfolio_url: links.portfolio_url.clone().or(direct.portfolio_url),
            github_username: links.github_username.clone().or(direct.github_username),
            instagram_username: links
                .instagram_username
                .clone()
                .or(direct.instagram_username),
        },
        None => direct,
    }
}

/// One source's contribution, in merge order.
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    Resume(CandidateProfile),
    Portfolio(CandidateProfile),
    Github(GithubSnapshot),
    Instagram(InstagramSnapshot),
}

/// Ordered reducer over source outcomes. Scalars and entry lists are
/// first-found-wins; skills and links are unioned across sources.
pub fn merge_outcomes(outcomes: Vec<SourceOutcome>) -> CandidateProfile {
    let mut merged = CandidateProfile::default();
    for outcome in outcomes {
        let partial = match outcome {
            SourceOutcome::Resume(p) | SourceOutcome::Portfolio(p) => p,
            SourceOutcome::Github(snapshot) => github_contribution(snapshot),
            SourceOutcome::Instagram(snapshot) => instagram_contribution(snapshot),
        };
        merge_partial(&mut merged, partial);
    }
    merged
}

fn merge_partial(merged: &mut CandidateProfile, partial: CandidateProfile) {
    if merged.name.is_none() {
        merged.name = partial.name;
    }
    if merged.about.is_none() {
        merged.about = partial.about;
    }
    if merged.contact.email.is_none() {
        merged.contact.email = partial.contact.email;
    }
    if merged.contact.phone.is_none() {
        merged.contact.phone = partial.contact.phone;
    }
    merged.skills.extend(partial.skills);
    for (platform, url) in partial.links {
        merged.links.entry(platform).or_insert(url);
    }
    if merged.education.is_empty() {
        merged.education = partial.education;
    }
    if merged.experience.is_empty() {
        merged.experience = partial.experience;
    }
    if merged.projects.is_empty() {
        merged.projects = partial.projects;
    }
    if merged.certifications.is_empty() {
        merged.certifications = partial.certifications;
    }
}

/// A GitHub snapshot viewed as a partial profile: identity fields, the
/// repo languages as skills, and the most starred original repos as
/// projects.
fn github_contribution(snapshot: GithubSnapshot) -> CandidateProfile {
    let mut partial = CandidateProfile {
        name: snapshot.name.clone(),
        about: snapshot.bio.clone(),
        ..Default::default()
    };
    partial.contact.email = snapshot.email.clone();
    partial
        .links
        .insert("github".to_string(), format!("https://github.com/{}", snapshot.username));
    if let Some(blog) = &snapshot.blog {
        partial.links.insert("website".to_string(), blog.clone());
    }
    partial.skills = snapshot.stats.top_languages.iter().cloned().collect();

    let mut originals: Vec<_> = snapshot
        .repositories
        .into_iter()
        .filter(|r| !r.is_fork)
        .collect();
    originals.sort_by(|a, b| b.stars.cmp(&a.stars));
    partial.projects = originals
        .into_iter()
        .take(5)
        .map(|r| ProjectEntry {
            name: Some(r.name),
            description: r.description,
            link: Some(r.url),
        })
        .collect();

    partial
}

fn instagram_contribution(snapshot: InstagramSnapshot) -> CandidateProfile {
    let mut partial = CandidateProfile {
        about: snapshot.bio.clone(),
        ..Default::default()
    };
    partial.links.insert(
        "instagram".to_string(),
        format!("https://www.instagram.com/{}/", snapshot.username),
    );
    partial
}

/// Map a fetch result onto the status map vocabulary.
fn status_for<T>(result: &Result<T, CollectError>) -> SourceStatus {
    match result {
        Ok(_) => SourceStatus::Ok,
        Err(CollectError::NotFound) => SourceStatus::NotFound,
        Err(CollectError::RateLimitExceeded) => SourceStatus::RateLimited,
        Err(CollectError::TimedOut) => SourceStatus::TimedOut,
        Err(e) => SourceStatus::failed(e.to_string()),
    }
}

pub struct CollectOutcome {
    pub profile: CandidateProfile,
    pub sources: SourceStatusMap,
}

impl CollectOutcome {
    pub fn any_source_ok(&self) -> bool {
        self.sources.values().any(|s| *s == SourceStatus::Ok)
    }

    /// True when at least one source was contacted and every contacted
    /// source failed (not-found and skipped do not count as failures).
    pub fn all_contacted_failed(&self) -> bool {
        let contacted: Vec<_> = self
            .sources
            .values()
            .filter(|s| **s != SourceStatus::Skipped)
            .collect();
        !contacted.is_empty() && contacted.iter().all(|s| s.is_failure())
    }
}

pub struct Aggregator {
    extractor: FieldExtractor,
    portfolio: PortfolioScraper,
    github: GithubFetcher,
    instagram: InstagramFetcher,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        extractor: FieldExtractor,
        portfolio: PortfolioScraper,
        github: GithubFetcher,
        instagram: InstagramFetcher,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            portfolio,
            github,
            instagram,
            fetch_timeout,
        }
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    pub fn portfolio_scraper(&self) -> &PortfolioScraper {
        &self.portfolio
    }

    /// Collect and merge all sources for one submission. Per-source
    /// failures are recorded in the status map and never abort the
    /// aggregate.
    pub async fn collect(&self, resume_text: Option<&str>, direct: SourcePlan) -> CollectOutcome {
        let mut sources = SourceStatusMap::new();
        let mut outcomes: Vec<SourceOutcome> = Vec::new();

        let resume_links = resume_text.map(|text| {
            let profile = self.extractor.extract_profile(text);
            let links = self.extractor.extract_links(text);
            sources.insert("resume".to_string(), SourceStatus::Ok);
            outcomes.push(SourceOutcome::Resume(profile));
            links
        });
        if resume_links.is_none() {
            sources.insert("resume".to_string(), SourceStatus::Skipped);
        }

        let plan = plan_sources(direct, resume_links.as_ref());
        info!(
            "Source plan: portfolio={:?} github={:?} instagram={:?}",
            plan.portfolio_url, plan.github_username, plan.instagram_username
        );

        let portfolio_fut = async {
            match &plan.portfolio_url {
                Some(url) => Some(self.bounded(self.portfolio.scrape(url)).await),
                None => None,
            }
        };
        let github_fut = async {
            match &plan.github_username {
                Some(username) => Some(self.bounded(self.github.fetch_profile(username)).await),
                None => None,
            }
        };
        let instagram_fut = async {
            match &plan.instagram_username {
                Some(username) => Some(self.bounded(self.instagram.fetch_profile(username)).await),
                None => None,
            }
        };

        let (portfolio_res, github_res, instagram_res) =
            tokio::join!(portfolio_fut, github_fut, instagram_fut);

        record(
            "portfolio",
            portfolio_res,
            &mut sources,
            &mut outcomes,
            SourceOutcome::Portfolio,
        );
        record(
            "github",
            github_res,
            &mut sources,
            &mut outcomes,
            SourceOutcome::Github,
        );
        record(
            "instagram",
            instagram_res,
            &mut sources,
            &mut outcomes,
            SourceOutcome::Instagram,
        );

        let profile = merge_outcomes(outcomes);
        CollectOutcome { profile, sources }
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, CollectError>>,
    ) -> Result<T, CollectError> {
        match timeout(self.fetch_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CollectError::TimedOut),
        }
    }
}

fn record<T>(
    name: &str,
    result: Option<Result<T, CollectError>>,
    sources: &mut SourceStatusMap,
    outcomes: &mut Vec<SourceOutcome>,
    wrap: impl FnOnce(T) -> SourceOutcome,
) {
    match result {
        None => {
            sources.insert(name.to_string(), SourceStatus::Skipped);
        }
        Some(result) => {
            let status = status_for(&result);
            if let Err(e) = &result {
                warn!("Source {} failed: {}", name, e);
            }
            sources.insert(name.to_string(), status);
            if let Ok(value) = result {
                outcomes.push(wrap(value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Contact, GithubStats};

    fn profile_named(name: &str) -> CandidateProfile {
        CandidateProfile {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_found_wins_for_name() {
        let merged = merge_outcomes(vec![
            SourceOutcome::Resume(profile_named("Alice")),
            SourceOutcome::Portfolio(profile_named("Bob")),
        ]);
        assert_eq!(merged.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_skills_are_unioned() {
        let mut a = CandidateProfile::default();
        a.skills.insert("Python".to_string());
        let mut b = CandidateProfile::default();
        b.skills.insert("Go".to_string());

        let merged = merge_outcomes(vec![SourceOutcome::Resume(a), SourceOutcome::Portfolio(b)]);
        assert!(merged.skills.contains("Python"));
        assert!(merged.skills.contains("Go"));
        assert_eq!(merged.skills.len(), 2);
    }

    #[test]
    fn test_links_are_unioned_first_url_kept() {
        let mut a = CandidateProfile::default();
        a.links
            .insert("github".to_string(), "https://github.com/alice".to_string());
        let mut b = CandidateProfile::default();
        b.links
            .insert("github".to_string(), "https://github.com/impostor".to_string());
        b.links
            .insert("linkedin".to_string(), "https://linkedin.com/in/alice".to_string());

        let merged = merge_outcomes(vec![SourceOutcome::Resume(a), SourceOutcome::Portfolio(b)]);
        assert_eq!(
            merged.links.get("github").map(String::as_str),
            Some("https://github.com/alice")
        );
        assert!(merged.links.contains_key("linkedin"));
    }

    #[test]
    fn test_email_not_overwritten() {
        let a = CandidateProfile {
            contact: Contact {
                email: Some("alice@example.com".to_string()),
                phone: None,
            },
            ..Default::default()
        };
        let b = CandidateProfile {
            contact: Contact {
                email: Some("other@example.com".to_string()),
                phone: Some("+1 555 0100".to_string()),
            },
            ..Default::default()
        };
        let merged = merge_outcomes(vec![SourceOutcome::Resume(a), SourceOutcome::Portfolio(b)]);
        assert_eq!(merged.contact.email.as_deref(), Some("alice@example.com"));
        // phone was still absent, so the later source fills it
        assert_eq!(merged.contact.phone.as_deref(), Some("+1 555 0100"));
    }

    #[test]
    fn test_github_snapshot_contribution() {
        let snapshot = GithubSnapshot {
            username: "alice".to_string(),
            name: Some("Alice Doe".to_string()),
            bio: Some("Systems tinkerer".to_string()),
            stats: GithubStats {
                total_repos: 2,
                total_stars: 12,
                total_forks: 1,
                top_languages: vec!["Rust".to_string(), "Python".to_string()],
            },
            ..Default::default()
        };
        let merged = merge_outcomes(vec![SourceOutcome::Github(snapshot)]);
        assert_eq!(merged.name.as_deref(), Some("Alice Doe"));
        assert!(merged.skills.contains("Rust"));
        assert_eq!(
            merged.links.get("github").map(String::as_str),
            Some("https://github.com/alice")
        );
    }

    #[test]
    fn test_resume_links_override_direct_inputs() {
        let direct = SourcePlan {
            portfolio_url: Some("https://old.example.com".to_string()),
            github_username: None,
            instagram_username: Some("direct_gram".to_string()),
        };
        let links = ExtractedLinks {
            github_username: Some("alice".to_string()),
            instagram_username: None,
            portfolio_url: Some("https://alice.dev".to_string()),
            links: Default::default(),
        };

        let plan = plan_sources(direct, Some(&links));
        assert_eq!(plan.portfolio_url.as_deref(), Some("https://alice.dev"));
        assert_eq!(plan.github_username.as_deref(), Some("alice"));
        // no Instagram link in the resume, the direct input survives
        assert_eq!(plan.instagram_username.as_deref(), Some("direct_gram"));
    }

    #[test]
    fn test_unplanned_sources_are_skipped_not_errors() {
        // resume mentions GitHub only: portfolio and Instagram must be
        // skipped, never reported as failures
        let extractor = FieldExtractor::new(crate::extractor::SkillVocabulary::default());
        let links = extractor.extract_links("Find me at https://github.com/alice");
        let plan = plan_sources(SourcePlan::default(), Some(&links));

        assert_eq!(plan.github_username.as_deref(), Some("alice"));
        assert!(plan.portfolio_url.is_none());
        assert!(plan.instagram_username.is_none());
    }

    #[test]
    fn test_outcome_failure_classification() {
        let mut sources = SourceStatusMap::new();
        sources.insert("portfolio".to_string(), SourceStatus::failed("boom"));
        sources.insert("github".to_string(), SourceStatus::Skipped);
        let outcome = CollectOutcome {
            profile: CandidateProfile::default(),
            sources,
        };
        assert!(!outcome.any_source_ok());
        assert!(outcome.all_contacted_failed());

        let mut sources = SourceStatusMap::new();
        sources.insert("portfolio".to_string(), SourceStatus::NotFound);
        let outcome = CollectOutcome {
            profile: CandidateProfile::default(),
            sources,
        };
        // not-found is a clean answer, not an unreachable source
        assert!(!outcome.all_contacted_failed());
    }
}
