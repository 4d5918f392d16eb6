// src/types/profile.rs
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Unified candidate record merged from all sources.
///
/// Every field is absent-tolerant: a missing field never invalidates the
/// record, it only means no source produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CandidateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Contact::is_empty", default)]
    pub contact: Contact,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub skills: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub education: Vec<EducationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub certifications: Vec<String>,
    /// Platform name (github, linkedin, instagram, website, ...) to URL.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub links: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EducationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<String>,
}

impl EducationEntry {
    pub fn is_empty(&self) -> bool {
        self.institution.is_none() && self.degree.is_none() && self.years.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperienceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub responsibilities: Vec<String>,
}

impl ExperienceEntry {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.organization.is_none()
            && self.dates.is_none()
            && self.responsibilities.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ProjectEntry {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.link.is_none()
    }
}

impl CandidateProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.about.is_none()
            && self.contact.is_empty()
            && self.skills.is_empty()
            && self.education.is_empty()
            && self.experience.is_empty()
            && self.projects.is_empty()
            && self.certifications.is_empty()
            && self.links.is_empty()
    }
}
