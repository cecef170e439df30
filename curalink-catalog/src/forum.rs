//! Community discussion board.
//!
//! The board shows a fixed set of sample threads plus any posts the user
//! created during the current session, newest first.
use chrono::Utc;
use curalink_common::{AccountType, CuralinkError, Result, require_fields};
use curalink_store::{JsonStore, keys};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Categories offered when composing a post.
pub const AVAILABLE_CATEGORIES: [&str; 6] = [
    "General Discussion",
    "Research Questions",
    "Clinical Trials",
    "Treatment Options",
    "Patient Experience",
    "Collaboration Opportunities",
];

/// Filter value that matches every category.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub category: String,
    pub author: String,
    pub author_type: AccountType,
    pub content: String,
    pub replies: u32,
    pub date: String,
}

/// Draft submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub category: String,
    pub content: String,
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    title: &str,
    category: &str,
    author: &str,
    author_type: AccountType,
    content: &str,
    replies: u32,
    date: &str,
) -> ForumPost {
    ForumPost {
        id: id.into(),
        title: title.into(),
        category: category.into(),
        author: author.into(),
        author_type,
        content: content.into(),
        replies,
        date: date.into(),
    }
}

pub fn sample_posts() -> Vec<ForumPost> {
    vec![
        sample(
            "1",
            "Experiences with Deep Brain Stimulation?",
            "Parkinson's Disease",
            "John Smith",
            AccountType::Patient,
            "I'm considering DBS therapy and would love to hear from others who have tried it...",
            12,
            "2025-01-10",
        ),
        sample(
            "2",
            "Latest Research on Stem Cell Therapy",
            "Parkinson's Disease",
            "Dr. Sarah Chen",
            AccountType::Researcher,
            "Here's a summary of recent findings in stem cell therapy for movement disorders...",
            8,
            "2025-01-09",
        ),
        sample(
            "3",
            "Diet and Breast Cancer Prevention",
            "Breast Cancer",
            "Jane Doe",
            AccountType::Patient,
            "What dietary changes have you found helpful?",
            15,
            "2025-01-08",
        ),
        sample(
            "4",
            "Clinical Trial Enrollment Tips",
            "General",
            "Dr. Michael Brown",
            AccountType::Researcher,
            "Guide for patients considering clinical trial participation...",
            6,
            "2025-01-07",
        ),
    ]
}

/// Posts matching `query` (title or content) within `category`, both
/// case-insensitive. `None` or `"all"` matches every category.
pub fn filter_posts<'a>(
    posts: &'a [ForumPost],
    query: &str,
    category: Option<&str>,
) -> Vec<&'a ForumPost> {
    let needle = query.trim().to_lowercase();
    let category = category.filter(|c| !c.eq_ignore_ascii_case(ALL_CATEGORIES));
    posts
        .iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&needle)
                || post.content.to_lowercase().contains(&needle)
        })
        .filter(|post| category.is_none_or(|c| post.category.eq_ignore_ascii_case(c.trim())))
        .collect()
}

/// `"all"` followed by each distinct category in order of first appearance.
pub fn categories(posts: &[ForumPost]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for post in posts {
        if !out.contains(&post.category) {
            out.push(post.category.clone());
        }
    }
    out
}

fn canonical_category(raw: &str) -> Result<&'static str> {
    let raw = raw.trim();
    AVAILABLE_CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(raw))
        .copied()
        .ok_or_else(|| CuralinkError::InvalidInput(format!("unknown forum category: {raw}")))
}

/// Session-scoped board: sample threads plus the user's own posts.
#[derive(Clone, Debug)]
pub struct ForumBoard {
    session: JsonStore,
}

impl ForumBoard {
    pub fn new(session: JsonStore) -> Self {
        Self { session }
    }

    async fn own_posts(&self) -> Result<Vec<ForumPost>> {
        Ok(self
            .session
            .get_json(keys::FORUM_POSTS)
            .await?
            .unwrap_or_default())
    }

    /// Every post, the user's newest first, then the samples.
    pub async fn posts(&self) -> Result<Vec<ForumPost>> {
        let mut posts = self.own_posts().await?;
        posts.extend(sample_posts());
        Ok(posts)
    }

    /// Publish a draft. The author falls back to `Anonymous` (as a patient)
    /// when no profile exists.
    pub async fn create_post(
        &self,
        draft: NewPost,
        author: Option<(&str, AccountType)>,
    ) -> Result<ForumPost> {
        require_fields(&[
            ("title", draft.title.as_str()),
            ("category", draft.category.as_str()),
            ("content", draft.content.as_str()),
        ])?;
        let category = canonical_category(&draft.category)?;
        let (name, author_type) = author.unwrap_or(("Anonymous", AccountType::Patient));

        let now = Utc::now();
        let post = ForumPost {
            id: now.timestamp_millis().to_string(),
            title: draft.title.trim().to_string(),
            category: category.to_string(),
            author: name.to_string(),
            author_type,
            content: draft.content.trim().to_string(),
            replies: 0,
            date: now.format("%Y-%m-%d").to_string(),
        };

        let mut own = self.own_posts().await?;
        own.insert(0, post.clone());
        self.session.set_json(keys::FORUM_POSTS, &own).await?;

        info!(id = %post.id, category, %author_type, "forum.post_created");
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_title_or_content() {
        let posts = sample_posts();
        let hits = filter_posts(&posts, "dietary", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "3");

        assert_eq!(filter_posts(&posts, "", None).len(), 4);
    }

    #[test]
    fn filter_by_category_ignores_case() {
        let posts = sample_posts();
        let hits = filter_posts(&posts, "", Some("Parkinson's Disease"));
        assert_eq!(hits.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(filter_posts(&posts, "", Some("all")).len(), 4);
        assert_eq!(filter_posts(&posts, "", Some("parkinson's disease")).len(), 2);
        assert!(filter_posts(&posts, "", Some("Parkinson")).is_empty());
    }

    #[test]
    fn categories_start_with_all_and_are_unique() {
        assert_eq!(
            categories(&sample_posts()),
            vec!["all", "Parkinson's Disease", "Breast Cancer", "General"]
        );
    }

    #[test]
    fn category_names_are_canonicalised() {
        assert_eq!(canonical_category(" clinical trials ").unwrap(), "Clinical Trials");
        assert!(canonical_category("Gossip").is_err());
    }
}
