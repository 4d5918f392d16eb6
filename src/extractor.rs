// src/extractor.rs
//! Field extraction from raw text (resume or page text).
//!
//! Pure pattern matching, no I/O. Failing to find a field is never an
//! error: absent fields are simply left out of the partial profile.

use crate::types::{CandidateProfile, EducationEntry, ExperienceEntry, ProjectEntry};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Skill vocabulary matched against free text.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    terms: Vec<String>,
}

impl SkillVocabulary {
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }

    /// Load a newline-separated vocabulary file; blank lines and `#`
    /// comments are ignored.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skills file: {}", path))?;
        let terms: Vec<String> = content
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| l.to_string())
            .collect();
        if terms.is_empty() {
            anyhow::bail!("Skills file {} contains no terms", path);
        }
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect())
    }
}

/// Technology vocabulary used when no override file is configured.
const DEFAULT_SKILLS: &[&str] = &[
    // Languages
    "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Ruby", "PHP", "Go", "Rust",
    "Swift", "Kotlin", "HTML", "CSS", "SQL", "NoSQL", "GraphQL", "R", "MATLAB", "Scala", "Perl",
    "Shell", "Bash", "PowerShell",
    // Web
    "React", "Angular", "Vue", "Node.js", "Express", "Django", "Flask", "Spring", "Laravel",
    "ASP.NET", "jQuery", "Bootstrap", "Tailwind CSS", "SASS", "LESS", "Webpack", "Babel", "npm",
    "Yarn", "REST", "SOAP", "WebSocket",
    // Databases
    "MySQL", "PostgreSQL", "MongoDB", "Redis", "Elasticsearch", "Cassandra", "Oracle",
    "SQL Server", "DynamoDB", "Firebase", "CouchDB", "Neo4j",
    // Cloud
    "AWS", "Azure", "GCP", "Digital Ocean", "Heroku", "Vercel", "Netlify", "Lambda", "EC2", "S3",
    "RDS", "CloudFront", "CloudFormation",
    // DevOps & tools
    "Docker", "Kubernetes", "Jenkins", "Git", "GitHub", "GitLab", "Bitbucket", "CI/CD",
    "Terraform", "Ansible", "Puppet", "Chef", "Prometheus", "Grafana", "Splunk", "Jira",
    // AI & ML
    "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Keras", "Scikit-learn",
    "Pandas", "NumPy", "SciPy", "NLTK", "SpaCy", "OpenCV", "Computer Vision", "NLP",
    "Data Science",
    // Mobile
    "iOS", "Android", "React Native", "Flutter", "Xamarin",
    // Security
    "Cybersecurity", "Penetration Testing", "Cryptography", "OAuth", "JWT", "SAML",
    // Other
    "Blockchain", "Solidity", "Ethereum", "IoT", "Embedded Systems", "Arduino", "Raspberry Pi",
    "Unity", "Unreal Engine",
];

/// Links discovered in free text, classified by platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedLinks {
    pub github_username: Option<String>,
    pub instagram_username: Option<String>,
    pub portfolio_url: Option<String>,
    /// Platform name to URL, for the profile's links map.
    pub links: BTreeMap<String, String>,
}

pub struct FieldExtractor {
    vocabulary: SkillVocabulary,
    email_re: Regex,
    phone_re: Regex,
    url_re: Regex,
    skill_phrase_res: Vec<Regex>,
    degree_institution_re: Regex,
    institution_years_re: Regex,
    degree_re: Regex,
    title_org_re: Regex,
    duration_re: Regex,
    certification_res: Vec<Regex>,
    project_res: Vec<Regex>,
}

impl FieldExtractor {
    pub fn new(vocabulary: SkillVocabulary) -> Self {
        let skill_phrase_res = [
            r"(?i)\b(?:proficient|expert|skilled|experienced|familiar|knowledgeable)\s+(?:in|with|at)\s+([\w\s+#.,/-]+)",
            r"(?i)\b(?:experience|knowledge|skills)\s+(?:in|with)\s+([\w\s+#.,/-]+)",
            r"(?i)\b(?:worked|developed|built|created|implemented)\s+(?:with|using)\s+([\w\s+#.,/-]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invalid skill phrase pattern"))
        .collect();

        let certification_res = [
            r"(?i)\b((?:AWS|Azure|GCP|Cisco|Microsoft|Oracle|IBM|Google|CompTIA|CISSP|PMP|ITIL|Scrum)[^.\n]*?(?:Certified|Certification|Professional|Associate|Expert|Architect|Administrator|Specialist))",
            r"(?i)\bCertified\s+([^.\n]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invalid certification pattern"))
        .collect();

        let project_res = [
            r"(?i)\b((?:Developed|Created|Built|Implemented|Designed)\s+[^.\n]+)",
            r"(?m)^([^.\n]+(?:Project|Application|Platform|Website|Framework|Library))\s*$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invalid project pattern"))
        .collect();

        Self {
            vocabulary,
            email_re: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("invalid email pattern"),
            phone_re: Regex::new(r"\+?[0-9][0-9\s().-]{8,}[0-9]").expect("invalid phone pattern"),
            url_re: Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("invalid url pattern"),
            skill_phrase_res,
            degree_institution_re: Regex::new(
                r"(?i)(?P<degree>(?:Bachelor(?:'s)?|Master(?:'s)?|Ph\.?D\.?|MBA|B\.?\s?Tech|M\.?\s?Tech|B\.?\s?Sc|M\.?\s?Sc|B\.?A\.?|M\.?A\.?|B\.?S\.?|M\.?S\.?)(?:(?: of| in)? [A-Za-z][\w\s&-]*)?)[\s,]+(?:from|at)\s+(?P<institution>[^.\n,]+)",
            )
            .expect("invalid degree-institution pattern"),
            institution_years_re: Regex::new(
                r"(?P<institution>[^\n.;]+(?:University|College|Institute|Polytechnic|School|Academy))[\s,]*\(?(?P<years>\d{4}\s*[-–]\s*(?:\d{4}|Present|Current|present))\)?",
            )
            .expect("invalid institution-years pattern"),
            degree_re: Regex::new(
                r"(?i)\b(?P<degree>(?:Bachelor|Master|PhD|B\.?\s?Tech|M\.?\s?Tech|B\.?\s?Sc|M\.?\s?Sc)(?: of| in)? [A-Za-z][\w\s&-]*)",
            )
            .expect("invalid degree pattern"),
            title_org_re: Regex::new(
                r"(?i)(?P<title>(?:Senior |Junior |Lead |Staff |Principal )?[\w -]*?(?:Software|Web|Mobile|Full[- ]Stack|Frontend|Backend|DevOps|Data|ML|AI|Project|Technical)\s*(?:Engineer|Developer|Architect|Scientist|Manager|Consultant|Analyst|Specialist|Intern))(?:\s+(?:at|with|for)\s+(?P<organization>[^.\n,(]+))?",
            )
            .expect("invalid title pattern"),
            duration_re: Regex::new(r"\d{4}\s*[-–]\s*(?:\d{4}|Present|Current|present)")
                .expect("invalid duration pattern"),
            certification_res,
            project_res,
        }
    }

    /// First email-shaped match wins.
    pub fn extract_email(&self, text: &str) -> Option<String> {
        self.email_re.find(text).map(|m| m.as_str().to_string())
    }

    /// Locale-agnostic, best-effort digit grouping.
    pub fn extract_phone(&self, text: &str) -> Option<String> {
        self.phone_re
            .find(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|p| p.chars().filter(|c| c.is_ascii_digit()).count() >= 10)
    }

    /// Vocabulary terms found as whole tokens, case-insensitive, plus terms
    /// appearing in "proficient in ..."-style phrases.
    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut found: Vec<String> = Vec::new();

        for term in self.vocabulary.terms() {
            if token_present(&lower, &term.to_lowercase()) && !found.contains(term) {
                found.push(term.clone());
            }
        }

        for re in &self.skill_phrase_res {
            for caps in re.captures_iter(text) {
                if let Some(phrase) = caps.get(1) {
                    let phrase_lower = phrase.as_str().to_lowercase();
                    for term in self.vocabulary.terms() {
                        if phrase_lower.contains(&term.to_lowercase()) && !found.contains(term) {
                            found.push(term.clone());
                        }
                    }
                }
            }
        }

        found.sort();
        found
    }

    /// Classify URLs found in the text by known domain substrings.
    pub fn extract_links(&self, text: &str) -> ExtractedLinks {
        let mut out = ExtractedLinks::default();

        for m in self.url_re.find_iter(text) {
            let url = m.as_str().trim_end_matches(['.', ',', ';']).to_string();

            if url.contains("github.com") {
                if out.github_username.is_none() {
                    out.github_username = username_from_url(&url);
                    out.links.insert("github".to_string(), url);
                }
            } else if url.contains("instagram.com") {
                if out.instagram_username.is_none() {
                    out.instagram_username = username_from_url(&url);
                    out.links.insert("instagram".to_string(), url);
                }
            } else if url.contains("linkedin.com") {
                out.links.entry("linkedin".to_string()).or_insert(url);
            } else if url.contains("twitter.com") || url.contains("x.com") {
                out.links.entry("twitter".to_string()).or_insert(url);
            } else if out.portfolio_url.is_none() {
                out.portfolio_url = Some(url.clone());
                out.links.insert("website".to_string(), url);
            }
        }

        out
    }

    pub fn extract_education(&self, text: &str) -> Vec<EducationEntry> {
        let mut entries: Vec<EducationEntry> = Vec::new();

        for caps in self.degree_institution_re.captures_iter(text) {
            push_education(
                &mut entries,
                EducationEntry {
                    degree: named_trim(&caps, "degree"),
                    institution: named_trim(&caps, "institution"),
                    years: None,
                },
            );
        }

        for caps in self.institution_years_re.captures_iter(text) {
            push_education(
                &mut entries,
                EducationEntry {
                    degree: None,
                    institution: named_trim(&caps, "institution"),
                    years: named_trim(&caps, "years"),
                },
            );
        }

        for caps in self.degree_re.captures_iter(text) {
            push_education(
                &mut entries,
                EducationEntry {
                    degree: named_trim(&caps, "degree"),
                    institution: None,
                    years: None,
                },
            );
        }

        entries
    }

    pub fn extract_experience(&self, text: &str) -> Vec<ExperienceEntry> {
        let mut entries: Vec<ExperienceEntry> = Vec::new();

        for caps in self.title_org_re.captures_iter(text) {
            let entry = ExperienceEntry {
                title: named_trim(&caps, "title"),
                organization: named_trim(&caps, "organization"),
                dates: caps.get(0).and_then(|m| {
                    let rest = &text[m.end()..];
                    self.duration_re
                        .find(rest)
                        .filter(|d| d.start() < 60)
                        .map(|d| d.as_str().to_string())
                }),
                responsibilities: Vec::new(),
            };
            if entry.is_empty() {
                continue;
            }
            let duplicate = entries
                .iter()
                .any(|e| e.title == entry.title && e.organization == entry.organization);
            if !duplicate {
                entries.push(entry);
            }
        }

        entries
    }

    pub fn extract_certifications(&self, text: &str) -> Vec<String> {
        let mut certs: Vec<String> = Vec::new();
        for re in &self.certification_res {
            for caps in re.captures_iter(text) {
                if let Some(name) = caps.get(1) {
                    let name = name.as_str().trim().to_string();
                    if !name.is_empty() && !certs.contains(&name) {
                        certs.push(name);
                    }
                }
            }
        }
        certs
    }

    pub fn extract_projects(&self, text: &str) -> Vec<ProjectEntry> {
        let mut projects: Vec<ProjectEntry> = Vec::new();
        for re in &self.project_res {
            for caps in re.captures_iter(text) {
                if let Some(name) = caps.get(1) {
                    let name = name.as_str().trim().to_string();
                    if name.is_empty() || projects.iter().any(|p| p.name.as_deref() == Some(&name))
                    {
                        continue;
                    }
                    projects.push(ProjectEntry {
                        name: Some(name),
                        description: None,
                        link: None,
                    });
                }
            }
        }
        projects
    }

    /// Run every extractor over the text and assemble a partial profile.
    pub fn extract_profile(&self, text: &str) -> CandidateProfile {
        let links = self.extract_links(text);
        CandidateProfile {
            name: None,
            about: None,
            contact: crate::types::Contact {
                email: self.extract_email(text),
                phone: self.extract_phone(text),
            },
            skills: self.extract_skills(text).into_iter().collect(),
            education: self.extract_education(text),
            experience: self.extract_experience(text),
            projects: self.extract_projects(text),
            certifications: self.extract_certifications(text),
            links: links.links,
        }
    }
}

fn named_trim(caps: &regex::Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn push_education(entries: &mut Vec<EducationEntry>, entry: EducationEntry) {
    if entry.is_empty() {
        return;
    }
    let duplicate = entries
        .iter()
        .any(|e| e.degree == entry.degree && e.institution == entry.institution);
    if !duplicate {
        entries.push(entry);
    }
}

/// Whole-token containment check. A boundary is only required on sides where
/// the term itself starts or ends with an alphanumeric character, so terms
/// like "C++" and "C#" still match.
fn token_present(haystack_lower: &str, term_lower: &str) -> bool {
    let first_alnum = term_lower.chars().next().is_some_and(|c| c.is_alphanumeric());
    let last_alnum = term_lower.chars().last().is_some_and(|c| c.is_alphanumeric());

    for (idx, _) in haystack_lower.match_indices(term_lower) {
        let before_ok = !first_alnum
            || haystack_lower[..idx]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = !last_alnum
            || haystack_lower[idx + term_lower.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

/// First path segment of a profile URL, e.g. `github.com/alice/repo` → `alice`.
fn username_from_url(url: &str) -> Option<String> {
    let after_host = url.splitn(4, '/').nth(3)?;
    let segment = after_host.split(['/', '?', '#']).next()?;
    let segment = segment.trim();
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(SkillVocabulary::default())
    }

    #[test]
    fn test_extract_email_first_match_wins() {
        let ex = extractor();
        let text = "Contact: alice@example.com or backup bob@example.org";
        assert_eq!(ex.extract_email(text), Some("alice@example.com".to_string()));
        assert_eq!(ex.extract_email("no email here"), None);
    }

    #[test]
    fn test_extract_phone() {
        let ex = extractor();
        assert_eq!(
            ex.extract_phone("Call me at +1 415-555-0123 anytime"),
            Some("+1 415-555-0123".to_string())
        );
        assert_eq!(ex.extract_phone("only 12345 digits"), None);
    }

    #[test]
    fn test_extract_skills_token_boundaries() {
        let ex = extractor();
        let skills = ex.extract_skills("Strong JavaScript and C++ background, some rust too.");
        assert!(skills.contains(&"JavaScript".to_string()));
        assert!(skills.contains(&"C++".to_string()));
        assert!(skills.contains(&"Rust".to_string()));
        // "JavaScript" must not also count as "Java"
        assert!(!skills.contains(&"Java".to_string()));
    }

    #[test]
    fn test_extract_skills_from_phrases() {
        let ex = extractor();
        let skills = ex.extract_skills("I am proficient in Docker and Kubernetes deployments.");
        assert!(skills.contains(&"Docker".to_string()));
        assert!(skills.contains(&"Kubernetes".to_string()));
    }

    #[test]
    fn test_extract_links_classification() {
        let ex = extractor();
        let text = "See https://github.com/alice/widget and https://alice.dev plus \
                    https://www.instagram.com/alice_gram/ and https://linkedin.com/in/alice";
        let links = ex.extract_links(text);
        assert_eq!(links.github_username, Some("alice".to_string()));
        assert_eq!(links.instagram_username, Some("alice_gram".to_string()));
        assert_eq!(links.portfolio_url, Some("https://alice.dev".to_string()));
        assert!(links.links.contains_key("linkedin"));
    }

    #[test]
    fn test_extract_education() {
        let ex = extractor();
        let entries =
            ex.extract_education("Bachelor of Science in Physics from Stanford University\n");
        assert!(!entries.is_empty());
        let first = &entries[0];
        assert!(first.degree.as_deref().unwrap().starts_with("Bachelor"));
        assert_eq!(first.institution.as_deref(), Some("Stanford University"));
    }

    #[test]
    fn test_extract_experience_dedup() {
        let ex = extractor();
        let text = "Senior Software Engineer at Initech\nSenior Software Engineer at Initech";
        let entries = ex.extract_experience(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].organization.as_deref(), Some("Initech"));
    }

    #[test]
    fn test_extractor_is_idempotent() {
        let ex = extractor();
        let text = "Jane Roe, jane@roe.io, +44 20 7946 0958.\n\
                    Python and Go developer. https://github.com/janeroe\n\
                    Master of Engineering from MIT";
        let first = ex.extract_profile(text);
        let second = ex.extract_profile(text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_absent_fields_are_omitted_not_errors() {
        let ex = extractor();
        let profile = ex.extract_profile("nothing useful in here");
        assert!(profile.contact.email.is_none());
        assert!(profile.skills.is_empty());
        assert!(profile.links.is_empty());
    }

    #[test]
    fn test_vocabulary_override() {
        let ex = FieldExtractor::new(SkillVocabulary::new(vec!["Fortran".to_string()]));
        let skills = ex.extract_skills("Python and Fortran veteran");
        assert_eq!(skills, vec!["Fortran".to_string()]);
    }
}
