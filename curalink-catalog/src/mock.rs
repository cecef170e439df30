//! Static in-memory index with an artificial response delay.
use crate::data;
use crate::types::{ClinicalTrial, Publication, Researcher, SearchContext, Searchable};
use crate::SearchService;
use async_trait::async_trait;
use curalink_common::Result;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Keep the entities matching `query`, in catalog order. A blank query keeps
/// everything.
pub fn filter_entities<T: Searchable>(items: Vec<T>, query: &str) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items.into_iter().filter(|item| item.matches(&needle)).collect()
}

#[derive(Debug, Clone)]
pub struct MockSearchService {
    latency: Duration,
}

impl Default for MockSearchService {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl MockSearchService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// No delay; for tests and batch jobs.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl SearchService for MockSearchService {
    async fn search_researchers(
        &self,
        query: &str,
        ctx: &SearchContext,
    ) -> Result<Vec<Researcher>> {
        self.simulate_latency().await;
        let hits = filter_entities(data::researchers(), query);
        debug!(query, disease = ?ctx.disease, location = ?ctx.location, hits = hits.len(), "search.researchers");
        Ok(hits)
    }

    async fn search_publications(
        &self,
        query: &str,
        ctx: &SearchContext,
    ) -> Result<Vec<Publication>> {
        self.simulate_latency().await;
        let hits = filter_entities(data::publications(), query);
        debug!(query, disease = ?ctx.disease, hits = hits.len(), "search.publications");
        Ok(hits)
    }

    async fn search_clinical_trials(
        &self,
        query: &str,
        ctx: &SearchContext,
    ) -> Result<Vec<ClinicalTrial>> {
        self.simulate_latency().await;
        let hits = filter_entities(data::clinical_trials(), query);
        debug!(query, location = ?ctx.location, hits = hits.len(), "search.trials");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_returns_everything_in_order() {
        let ids: Vec<_> = filter_entities(data::clinical_trials(), "   ")
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["NCT05123456", "NCT05123457", "NCT05123458"]);
    }

    #[test]
    fn trials_match_on_condition() {
        let hits = filter_entities(data::clinical_trials(), "multiple system");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "NCT05123457");
    }

    #[tokio::test(start_paused = true)]
    async fn default_service_waits_before_answering() {
        let service = MockSearchService::default();
        let started = tokio::time::Instant::now();
        service
            .search_researchers("", &SearchContext::default())
            .await
            .unwrap();
        assert!(started.elapsed() >= DEFAULT_LATENCY);
    }
}
