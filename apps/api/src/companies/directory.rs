//! Static company directory: an immutable list loaded once at startup and
//! filtered per request. No locks, no external calls.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::company::Company;

const BUILTIN_COMPANIES: &str = include_str!("companies.json");

const REMOTE: &str = "remote";

#[derive(Debug, Clone)]
pub struct CompanyDirectory {
    companies: Vec<Company>,
}

/// Search filters. Absent or empty fields apply no constraint; present ones
/// are ANDed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySearch {
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
}

impl CompanyDirectory {
    pub fn new(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    pub fn builtin() -> Result<Self> {
        let companies = serde_json::from_str(BUILTIN_COMPANIES)
            .context("built-in company fixture is malformed")?;
        Ok(Self::new(companies))
    }

    /// Loads the fixture from `path` when given, otherwise the built-in set.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read company fixture {}", path.display()))?;
        let companies = serde_json::from_str(&raw)
            .with_context(|| format!("company fixture {} is malformed", path.display()))?;
        Ok(Self::new(companies))
    }

    pub fn all(&self) -> &[Company] {
        &self.companies
    }

    pub fn get(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn search(&self, filter: &CompanySearch) -> Vec<&Company> {
        self.companies.iter().filter(|c| filter.matches(c)).collect()
    }
}

impl CompanySearch {
    pub fn matches(&self, company: &Company) -> bool {
        let interests_ok = match self.interests.as_deref() {
            Some(wanted) if !wanted.is_empty() => {
                interests_overlap(wanted, &company.hiring_interests)
            }
            _ => true,
        };

        let location_ok = match self.location.as_deref() {
            Some(query) if !query.is_empty() => location_matches(query, &company.locations),
            _ => true,
        };

        let size_ok = match self.company_size.as_deref() {
            Some(size) if !size.is_empty() => company.company_size.as_str() == size,
            _ => true,
        };

        interests_ok && location_ok && size_ok
    }
}

/// Case-insensitive substring match in either direction between any user
/// interest and any hiring interest. Deliberately loose: "ai" matches "air".
pub fn interests_overlap(wanted: &[String], hiring: &[String]) -> bool {
    hiring.iter().any(|offered| {
        let offered = offered.to_lowercase();
        wanted.iter().any(|interest| {
            let interest = interest.to_lowercase();
            interest.contains(&offered) || offered.contains(&interest)
        })
    })
}

/// A location matches when it contains the query (case-insensitive) or is
/// literally remote. Querying for remote matches every company.
pub fn location_matches(query: &str, locations: &[String]) -> bool {
    let query = query.to_lowercase();
    if query == REMOTE {
        return true;
    }
    locations.iter().any(|location| {
        let location = location.to_lowercase();
        location.contains(&query) || location == REMOTE
    })
}
