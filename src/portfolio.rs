// src/portfolio.rs
//! Portfolio site scraping: fetch a rendered page and mine a partial
//! candidate profile out of it with selector heuristics.

use crate::error::CollectError;
use crate::types::{CandidateProfile, EducationEntry, ExperienceEntry, ProjectEntry};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Selector heuristics for common portfolio layouts. Kept as configuration
/// so deployments can tune them per site generation without code changes.
#[derive(Debug, Clone)]
pub struct PortfolioSelectors {
    pub name: Vec<String>,
    pub about: Vec<String>,
    pub skills_sections: Vec<String>,
    pub skills_items: Vec<String>,
    pub experience_sections: Vec<String>,
    pub experience_entries: Vec<String>,
    pub project_sections: Vec<String>,
    pub project_entries: Vec<String>,
    pub education_sections: Vec<String>,
    pub education_entries: Vec<String>,
    pub contact_sections: Vec<String>,
}

impl Default for PortfolioSelectors {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            name: owned(&[
                "h1.text-5xl",
                "h2.text-4xl",
                ".name",
                ".profile-name",
                ".hero h1",
                "header h1",
                "h1",
            ]),
            about: owned(&[
                "#about p",
                "#hero p.text-lg",
                ".about p",
                ".bio p",
                ".intro p",
                ".max-w-prose",
            ]),
            skills_sections: owned(&["#skills", ".skills", ".technologies"]),
            skills_items: owned(&[
                "#skills .skill-item",
                "#skills span.inline-block",
                ".skills li",
                ".technologies span.text-sm",
                ".flex-wrap span.rounded",
            ]),
            experience_sections: owned(&["#experience", ".experience", ".timeline"]),
            experience_entries: owned(&[
                ".timeline-entry",
                ".experience-item",
                ".job",
                "div.mb-8",
            ]),
            project_sections: owned(&["#projects", ".projects", ".portfolio"]),
            project_entries: owned(&[".project-item", ".portfolio-item", "div.rounded-lg"]),
            education_sections: owned(&["#education", ".education"]),
            education_entries: owned(&[".education-item", "div.mb-6"]),
            contact_sections: owned(&[
                "#contact",
                ".contact",
                ".connect",
                "footer",
                ".social-links",
            ]),
        }
    }
}

/// Boilerplate phrases that disqualify a text block from being a name or
/// about-text.
const EXCLUDED_TEXT: &[&str] = &[
    "copyright",
    "privacy",
    "terms",
    "cookie",
    "all rights",
    "responsibilities",
];

/// Section labels that show up as list items but are never skills.
const EXCLUDED_SKILL_ITEMS: &[&str] = &[
    "projects",
    "skills",
    "experience",
    "education",
    "contact",
    "resume",
    "certificates",
    "terms",
    "conditions",
    "icon",
    "hackathons",
    "internships",
];

pub struct PortfolioScraper {
    client: Client,
    selectors: PortfolioSelectors,
}

impl PortfolioScraper {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            selectors: PortfolioSelectors::default(),
        }
    }

    pub fn with_selectors(mut self, selectors: PortfolioSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Fetch the page and extract a partial profile. Single attempt,
    /// time-boxed by the client timeout.
    pub async fn scrape(&self, url: &str) -> Result<CandidateProfile, CollectError> {
        info!("Scraping portfolio: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CollectError::fetch("portfolio", e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CollectError::NotFound);
        }
        if !response.status().is_success() {
            return Err(CollectError::fetch(
                "portfolio",
                format!("HTTP error: {}", response.status()),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CollectError::fetch("portfolio", e.to_string()))?;

        let profile = self.parse_portfolio(&html, url);
        info!(
            "Portfolio parsed: name={:?}, {} skills, {} projects",
            profile.name,
            profile.skills.len(),
            profile.projects.len()
        );
        Ok(profile)
    }

    /// Heuristic extraction from fetched HTML. Pure; exercised directly by
    /// tests with fixture pages.
    pub fn parse_portfolio(&self, html: &str, base_url: &str) -> CandidateProfile {
        let document = Html::parse_document(html);
        let mut profile = CandidateProfile::default();

        profile.name = self
            .find_text(&document, &self.selectors.name, 100)
            .or_else(|| title_fallback(&document));

        profile.about = self.find_text(&document, &self.selectors.about, 500);

        if select_first(&document, &self.selectors.skills_sections).is_some() {
            profile.skills = self.extract_skill_items(&document);
        }

        if let Some(section) = select_first(&document, &self.selectors.experience_sections) {
            profile.experience = self.extract_experience(section);
        }

        if let Some(section) = select_first(&document, &self.selectors.project_sections) {
            profile.projects = self.extract_projects(section, base_url);
        }

        if let Some(section) = select_first(&document, &self.selectors.education_sections) {
            profile.education = self.extract_education(section);
        }

        profile.links = self.extract_contact_links(&document);
        if let Some(email) = profile.links.remove("email") {
            profile.contact.email = Some(email);
        }

        profile
    }

    fn find_text(&self, document: &Html, selectors: &[String], max_length: usize) -> Option<String> {
        for selector_str in selectors {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            for element in document.select(&selector) {
                let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty()
                    && text.len() <= max_length
                    && !contains_excluded(&text, EXCLUDED_TEXT)
                {
                    return Some(text);
                }
            }
        }
        None
    }

    fn extract_skill_items(&self, document: &Html) -> std::collections::BTreeSet<String> {
        let mut skills = std::collections::BTreeSet::new();
        for selector_str in &self.selectors.skills_items {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            for element in document.select(&selector) {
                let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
                if text.is_empty() || contains_excluded(&text, EXCLUDED_SKILL_ITEMS) {
                    continue;
                }
                // comma-separated clusters split apart, short labels kept whole
                if text.contains(',') {
                    for item in text.split(',') {
                        let item = clean_text(item);
                        if !item.is_empty() && !contains_excluded(&item, EXCLUDED_SKILL_ITEMS) {
                            skills.insert(item);
                        }
                    }
                } else if text.split_whitespace().count() <= 5 {
                    skills.insert(text);
                }
            }
        }
        skills
    }

    fn extract_experience(&self, section: ElementRef<'_>) -> Vec<ExperienceEntry> {
        let mut entries = Vec::new();
        for entry in select_within(section, &self.selectors.experience_entries) {
            let title = find_text_within(entry, &["h3", "h4", ".job-title"], 100);
            let dates = find_text_within(entry, &[".date-range", ".duration", ".text-sm"], 50);
            let responsibilities: Vec<String> = select_within_strs(entry, &["ul li", ".description p"])
                .into_iter()
                .map(|e| clean_text(&e.text().collect::<Vec<_>>().join(" ")))
                .filter(|t| !t.is_empty())
                .collect();

            let exp = ExperienceEntry {
                title,
                organization: None,
                dates,
                responsibilities,
            };
            if !exp.is_empty() {
                entries.push(exp);
            }
        }
        entries
    }

    fn extract_projects(&self, section: ElementRef<'_>, base_url: &str) -> Vec<ProjectEntry> {
        let mut projects = Vec::new();
        for entry in select_within(section, &self.selectors.project_entries) {
            let link = select_within_strs(entry, &["a.project-link", "a[href*='github.com']", "a"])
                .into_iter()
                .find_map(|a| a.value().attr("href"))
                .and_then(|href| resolve_link(base_url, href));

            let project = ProjectEntry {
                name: find_text_within(entry, &["h3", "h4", ".project-name"], 100),
                description: find_text_within(entry, &["p.description", ".summary", "p"], 500),
                link,
            };
            if !project.is_empty() {
                projects.push(project);
            }
        }
        projects
    }

    fn extract_education(&self, section: ElementRef<'_>) -> Vec<EducationEntry> {
        let mut entries = Vec::new();
        for entry in select_within(section, &self.selectors.education_entries) {
            let edu = EducationEntry {
                years: find_text_within(entry, &[".years", ".duration", ".text-sm"], 50),
                institution: find_text_within(entry, &["h3", ".institution"], 100),
                degree: find_text_within(entry, &["p.degree", ".qualification"], 100),
            };
            if !edu.is_empty() {
                entries.push(edu);
            }
        }
        entries
    }

    /// Social/contact links by domain, searched in contact-ish sections
    /// first and falling back to the whole document.
    fn extract_contact_links(&self, document: &Html) -> BTreeMap<String, String> {
        let platform_selectors: [(&str, &str); 5] = [
            ("linkedin", "a[href*='linkedin.com']"),
            ("twitter", "a[href*='twitter.com'], a[href*='x.com']"),
            ("instagram", "a[href*='instagram.com']"),
            ("github", "a[href*='github.com']"),
            ("email", "a[href^='mailto:']"),
        ];

        let mut links = BTreeMap::new();
        let section = select_first(document, &self.selectors.contact_sections);

        for (platform, selector_str) in platform_selectors {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            let href = match section {
                Some(s) => s.select(&selector).next(),
                None => document.select(&selector).next(),
            }
            .and_then(|a| a.value().attr("href"));

            if let Some(href) = href {
                links.insert(
                    platform.to_string(),
                    href.trim_start_matches("mailto:").to_string(),
                );
            }
        }
        links
    }
}

fn title_fallback(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?;
    let text = title.text().collect::<Vec<_>>().join(" ");
    let name = text.split(['|', '-']).next()?;
    let name = clean_text(name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn select_first<'a>(document: &'a Html, selectors: &[String]) -> Option<ElementRef<'a>> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                return Some(element);
            }
        }
    }
    None
}

fn select_within<'a>(root: ElementRef<'a>, selectors: &[String]) -> Vec<ElementRef<'a>> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            let found: Vec<_> = root.select(&selector).collect();
            if !found.is_empty() {
                return found;
            }
        }
    }
    Vec::new()
}

fn select_within_strs<'a>(root: ElementRef<'a>, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    let owned: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
    let mut all = Vec::new();
    for selector_str in &owned {
        if let Ok(selector) = Selector::parse(selector_str) {
            all.extend(root.select(&selector));
        }
        if !all.is_empty() {
            break;
        }
    }
    all
}

fn find_text_within(root: ElementRef<'_>, selectors: &[&str], max_length: usize) -> Option<String> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in root.select(&selector) {
            let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() && text.len() <= max_length {
                return Some(text);
            }
        }
    }
    None
}

fn resolve_link(base_url: &str, href: &str) -> Option<String> {
    if href.starts_with("mailto:") {
        return Some(href.trim_start_matches("mailto:").to_string());
    }
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_excluded(text: &str, excluded: &[&str]) -> bool {
    let lower = text.to_lowercase();
    excluded.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
    <html>
      <head><title>Alice Doe | Portfolio</title></head>
      <body>
        <header class="hero"><h1>Alice Doe</h1></header>
        <section id="about"><p>Passionate developer building web things.</p></section>
        <section id="skills">
          <span class="inline-block">Python</span>
          <span class="inline-block">Rust, Go</span>
          <span class="inline-block">Skills</span>
        </section>
        <section id="projects">
          <div class="project-item">
            <h3>Widget Engine</h3>
            <p class="description">A configurable widget engine.</p>
            <a class="project-link" href="https://github.com/alice/widget">code</a>
          </div>
        </section>
        <section id="education">
          <div class="education-item">
            <h3>University of Somewhere</h3>
            <p class="degree">BSc Computer Science</p>
            <span class="years">2015-2019</span>
          </div>
        </section>
        <footer id="contact">
          <a href="https://github.com/alice">GitHub</a>
          <a href="https://linkedin.com/in/alice">LinkedIn</a>
          <a href="mailto:alice@example.com">Email</a>
        </footer>
      </body>
    </html>
    "#;

    fn scraper() -> PortfolioScraper {
        PortfolioScraper::new(Duration::from_secs(5))
    }

    #[test]
    fn test_parse_fixture_portfolio() {
        let profile = scraper().parse_portfolio(FIXTURE, "https://alice.dev");

        assert_eq!(profile.name.as_deref(), Some("Alice Doe"));
        assert_eq!(
            profile.about.as_deref(),
            Some("Passionate developer building web things.")
        );
        assert!(profile.skills.contains("Python"));
        // comma-separated cluster split into individual skills
        assert!(profile.skills.contains("Rust"));
        assert!(profile.skills.contains("Go"));
        // section label filtered out
        assert!(!profile.skills.contains("Skills"));

        assert_eq!(profile.projects.len(), 1);
        assert_eq!(profile.projects[0].name.as_deref(), Some("Widget Engine"));
        assert_eq!(
            profile.projects[0].link.as_deref(),
            Some("https://github.com/alice/widget")
        );

        assert_eq!(profile.education.len(), 1);
        assert_eq!(
            profile.education[0].institution.as_deref(),
            Some("University of Somewhere")
        );

        assert_eq!(
            profile.links.get("github").map(String::as_str),
            Some("https://github.com/alice")
        );
        assert_eq!(profile.contact.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_name_falls_back_to_title() {
        let html = "<html><head><title>Bob Smith - Home</title></head><body></body></html>";
        let profile = scraper().parse_portfolio(html, "https://bob.dev");
        assert_eq!(profile.name.as_deref(), Some("Bob Smith"));
    }

    #[test]
    fn test_empty_page_yields_empty_profile() {
        let profile = scraper().parse_portfolio("<html><body></body></html>", "https://x.dev");
        assert!(profile.is_empty());
    }

    #[test]
    fn test_relative_project_links_resolved() {
        let html = r#"<section id="projects"><div class="project-item">
            <h4>Demo</h4><a href="/demo">see</a></div></section>"#;
        let profile = scraper().parse_portfolio(html, "https://alice.dev");
        assert_eq!(profile.projects[0].link.as_deref(), Some("https://alice.dev/demo"));
    }
}
