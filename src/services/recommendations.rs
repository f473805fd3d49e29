use std::sync::Arc;

use crate::{
    models::{EntityId, EntityType, InsightsQuery, RecommendationItem},
    services::{fan_out, providers::TasteGraph},
};

/// Queries the taste graph for recommendations seeded by canonical ids
///
/// A failed or empty query yields an empty list, so one bad seed never sinks
/// the other seeds of the same request.
#[derive(Clone)]
pub struct RecommendationFetcher {
    graph: Arc<dyn TasteGraph>,
    max_concurrency: usize,
}

impl RecommendationFetcher {
    pub fn new(graph: Arc<dyn TasteGraph>, max_concurrency: usize) -> Self {
        Self {
            graph,
            max_concurrency,
        }
    }

    /// Fetches up to `take` items of `target` for the combined signal of `seeds`
    ///
    /// With a popularity floor, items the service reports below the floor are
    /// also dropped locally, so raising the floor can only shrink the result.
    pub async fn fetch(
        &self,
        seeds: &[EntityId],
        target: EntityType,
        take: u32,
        min_popularity: Option<f64>,
    ) -> Vec<RecommendationItem> {
        if seeds.is_empty() || take == 0 {
            return Vec::new();
        }

        let min_popularity = min_popularity
            .filter(|floor| floor.is_finite())
            .map(|floor| floor.clamp(0.0, 1.0));

        let query = InsightsQuery {
            entity_type: target,
            signal: seeds.to_vec(),
            take,
            min_popularity,
        };

        let entities = match self.graph.insights(&query).await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    signal = %query.signal_param(),
                    entity_type = %target,
                    provider = self.graph.name(),
                    "Recommendation fetch failed"
                );
                return Vec::new();
            }
        };

        let items: Vec<RecommendationItem> = entities
            .into_iter()
            .filter(|entity| match (min_popularity, entity.popularity) {
                (Some(floor), Some(popularity)) => popularity >= floor,
                _ => true,
            })
            .take(take as usize)
            .map(RecommendationItem::from)
            .collect();

        tracing::debug!(
            seeds = seeds.len(),
            entity_type = %target,
            results = items.len(),
            "Recommendations fetched"
        );

        items
    }

    /// One identifier in, one group out
    pub async fn fetch_per_seed(
        &self,
        seed: &EntityId,
        target: EntityType,
        take: u32,
    ) -> Vec<RecommendationItem> {
        self.fetch(std::slice::from_ref(seed), target, take, None)
            .await
    }

    /// All identifiers joined into one signal, one merged list out
    pub async fn fetch_combined(
        &self,
        seeds: &[EntityId],
        target: EntityType,
        take: u32,
        min_popularity: Option<f64>,
    ) -> Vec<RecommendationItem> {
        self.fetch(seeds, target, take, min_popularity).await
    }

    /// Per-seed fetch for every seed concurrently; groups are in seed order
    pub async fn fetch_each(
        &self,
        seeds: &[EntityId],
        target: EntityType,
        take: u32,
    ) -> Vec<Vec<RecommendationItem>> {
        fan_out(seeds.to_vec(), self.max_concurrency, |seed| async move {
            self.fetch_per_seed(&seed, target, take).await
        })
        .await
    }
}
