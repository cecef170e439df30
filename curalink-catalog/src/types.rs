use serde::{Deserialize, Serialize};

/// Lower-cased substring test used by every catalog filter.
pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Something the mock index can filter by a free-text query.
pub trait Searchable {
    fn id(&self) -> &str;

    /// Whether the entity matches `needle_lower`, which is already trimmed
    /// and lower-cased.
    fn matches(&self, needle_lower: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Researcher {
    pub id: String,
    pub name: String,
    pub institution: String,
    pub specialty: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publications: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub research_interests: Vec<String>,
}

impl Searchable for Researcher {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle_lower: &str) -> bool {
        contains_ci(&self.name, needle_lower)
            || contains_ci(&self.specialty, needle_lower)
            || self
                .research_interests
                .iter()
                .any(|interest| contains_ci(interest, needle_lower))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub journal: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Searchable for Publication {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle_lower: &str) -> bool {
        contains_ci(&self.title, needle_lower)
            || self
                .r#abstract
                .as_deref()
                .is_some_and(|text| contains_ci(text, needle_lower))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalTrial {
    pub id: String,
    pub title: String,
    pub status: String,
    pub phase: String,
    pub location: String,
    pub condition: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Searchable for ClinicalTrial {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle_lower: &str) -> bool {
        contains_ci(&self.title, needle_lower)
            || contains_ci(&self.description, needle_lower)
            || contains_ci(&self.condition, needle_lower)
    }
}

/// Optional hints taken from the user's profile.
///
/// They are recorded with each search but do not narrow the results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    pub disease: Option<String>,
    pub location: Option<String>,
}

impl SearchContext {
    pub fn new(disease: Option<String>, location: Option<String>) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            disease: keep(disease),
            location: keep(location),
        }
    }
}

/// The three result lists from one combined search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub researchers: Vec<Researcher>,
    pub publications: Vec<Publication>,
    pub trials: Vec<ClinicalTrial>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.researchers.len() + self.publications.len() + self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
