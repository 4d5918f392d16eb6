// src/instagram.rs
//! Instagram profile scraping: fetch the public profile page and mine
//! bio/follower/post metrics out of the page source.
//!
//! Calls are gated by the shared rate limiter so the service stays under
//! the platform's tolerance for automated access.

use crate::error::CollectError;
use crate::rate_limit::RateLimiter;
use crate::types::InstagramSnapshot;
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const NOT_FOUND_MARKERS: &[&str] = &[
    "sorry, this page isn't available",
    "the link you followed may be broken",
    "user not found",
    "page not found",
];

pub struct InstagramFetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
    parser: PageParser,
}

impl InstagramFetcher {
    pub fn new(timeout: Duration, limiter: Arc<RateLimiter>) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36")
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            limiter,
            parser: PageParser::new(),
        }
    }

    /// Fetch the profile page once (no retries) and extract metrics.
    pub async fn fetch_profile(&self, username: &str) -> Result<InstagramSnapshot, CollectError> {
        self.limiter.acquire().await?;

        let url = format!("https://www.instagram.com/{}/", username);
        info!("Fetching Instagram profile: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollectError::fetch("instagram", e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CollectError::NotFound);
        }
        if !response.status().is_success() {
            return Err(CollectError::fetch(
                "instagram",
                format!("HTTP error: {}", response.status()),
            ));
        }

        let page = response
            .text()
            .await
            .map_err(|e| CollectError::fetch("instagram", e.to_string()))?;

        self.parser.parse(&page, username)
    }
}

/// Regex mining of the profile page source. The page embeds metrics in
/// several shapes depending on rollout: shared-data JSON counts, an
/// og:description meta tag, or plain "N followers" text.
pub(crate) struct PageParser {
    bio_res: Vec<Regex>,
    followers_res: Vec<Regex>,
    posts_res: Vec<Regex>,
}

impl PageParser {
    pub(crate) fn new() -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("invalid Instagram pattern"))
                .collect()
        };

        Self {
            bio_res: compile(&[
                r#""biography"\s*:\s*"([^"]*)""#,
                r#"<meta property="og:description" content="([^"]*)""#,
                r#"content="([^"]*)" property="og:description""#,
            ]),
            followers_res: compile(&[
                r#""edge_followed_by":\{"count":(\d+)\}"#,
                r#""followers_count":(\d+)"#,
                r#""follower_count":(\d+)"#,
                r"(?i)([\d.,]+[KM]?)\s+followers",
            ]),
            posts_res: compile(&[
                r#""edge_owner_to_timeline_media":\{"count":(\d+)\}"#,
                r#""posts_count":(\d+)"#,
                r#""media_count":(\d+)"#,
                r"(?i)([\d.,]+[KM]?)\s+posts",
            ]),
        }
    }

    pub(crate) fn parse(
        &self,
        page: &str,
        username: &str,
    ) -> Result<InstagramSnapshot, CollectError> {
        let lower = page.to_lowercase();
        if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
            return Err(CollectError::NotFound);
        }

        let snapshot = InstagramSnapshot {
            username: username.to_string(),
            bio: self.first_capture(&self.bio_res, page).filter(|b| !b.is_empty()),
            followers: self
                .first_capture(&self.followers_res, page)
                .and_then(|c| parse_count(&c)),
            posts_count: self
                .first_capture(&self.posts_res, page)
                .and_then(|c| parse_count(&c)),
            fetched_at: Utc::now(),
        };

        if !snapshot.has_data() {
            if lower.contains("this account is private") {
                return Err(CollectError::fetch("instagram", "Profile is private"));
            }
            warn!("No extractable data for Instagram user {}", username);
            return Err(CollectError::fetch(
                "instagram",
                "Could not extract profile data - the platform may be blocking automated access",
            ));
        }

        Ok(snapshot)
    }

    fn first_capture(&self, patterns: &[Regex], page: &str) -> Option<String> {
        for re in patterns {
            if let Some(caps) = re.captures(page) {
                if let Some(m) = caps.get(1) {
                    return Some(m.as_str().to_string());
                }
            }
        }
        None
    }
}

/// Parse "1,234", "12.5K" or "1.2M" style counts.
fn parse_count(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace(',', "");
    let (digits, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000f64),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000f64),
        _ => (cleaned.as_str(), 1f64),
    };
    let value: f64 = digits.parse().ok()?;
    Some((value * multiplier) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_data_page() {
        let parser = PageParser::new();
        let page = r#"{"biography":"Coffee and code","edge_followed_by":{"count":1234},"edge_owner_to_timeline_media":{"count":56}}"#;
        let snapshot = parser.parse(page, "alice_gram").unwrap();
        assert_eq!(snapshot.bio.as_deref(), Some("Coffee and code"));
        assert_eq!(snapshot.followers, Some(1234));
        assert_eq!(snapshot.posts_count, Some(56));
    }

    #[test]
    fn test_parse_og_description_page() {
        let parser = PageParser::new();
        let page = r#"<meta property="og:description" content="1.5M Followers, 10 Following, 2,340 Posts">"#;
        let snapshot = parser.parse(page, "bigaccount").unwrap();
        assert_eq!(snapshot.followers, Some(1_500_000));
        assert_eq!(snapshot.posts_count, Some(2_340));
    }

    #[test]
    fn test_not_found_page() {
        let parser = PageParser::new();
        let page = "<html>Sorry, this page isn't available.</html>";
        assert!(matches!(
            parser.parse(page, "ghost"),
            Err(CollectError::NotFound)
        ));
    }

    #[test]
    fn test_private_profile_with_no_data() {
        let parser = PageParser::new();
        let page = "<html>This account is private</html>";
        assert!(matches!(
            parser.parse(page, "hidden"),
            Err(CollectError::Fetch { .. })
        ));
    }

    #[test]
    fn test_parse_count_suffixes() {
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("12.5K"), Some(12_500));
        assert_eq!(parse_count("1.2M"), Some(1_200_000));
        assert_eq!(parse_count("nope"), None);
    }
}
