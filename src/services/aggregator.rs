use serde::Serialize;
use std::sync::Arc;

use crate::{
    config::PipelineSettings,
    error::{AppError, AppResult},
    models::{
        normalize_category, CategoryRecommendations, EntityId, EntityType,
        GroupedRecommendations, IdentitySet, PreferenceSource, RecommendationItem,
    },
    services::{
        enrichment::Enricher,
        fan_out,
        identity::IdentitySetBuilder,
        providers::{TasteGraph, TextGenerator},
        recommendations::RecommendationFetcher,
        resolver::EntityResolver,
    },
};

/// Items per seed when turning a user's preferences into recommendations
pub const PREFERENCE_TAKE: u32 = 3;
/// Items per activity for mood-driven daily recommendations
pub const ACTIVITY_TAKE: u32 = 1;
/// Items for a blended group recommendation
pub const BLEND_TAKE: u32 = 3;
/// Items for a community archetype's example
pub const COMMUNITY_TAKE: u32 = 5;
/// Items per journey card or contrasting example
pub const SINGLE_TAKE: u32 = 1;

/// Result of blending several people's tastes into one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendOutcome {
    pub recommendations: Vec<RecommendationItem>,
    /// The combined comma-joined signal the query was issued with
    pub signal: String,
}

/// Drives resolution and recommendation fan-out for every entry point
#[derive(Clone)]
pub struct Aggregator {
    resolver: EntityResolver,
    identities: IdentitySetBuilder,
    fetcher: RecommendationFetcher,
    enricher: Enricher,
    settings: PipelineSettings,
}

impl Aggregator {
    pub fn new(
        graph: Arc<dyn TasteGraph>,
        generator: Arc<dyn TextGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        let resolver = EntityResolver::new(graph.clone(), settings.max_concurrency);
        Self {
            identities: IdentitySetBuilder::new(resolver.clone()),
            resolver,
            fetcher: RecommendationFetcher::new(graph, settings.max_concurrency),
            enricher: Enricher::new(generator, settings.max_concurrency),
            settings,
        }
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// One per-seed fetch for every seed; seeds that yield nothing leave no group
    pub async fn grouped(
        &self,
        seeds: &[EntityId],
        target: EntityType,
        take: u32,
    ) -> Vec<Vec<RecommendationItem>> {
        let mut groups = self.fetcher.fetch_each(seeds, target, take).await;
        groups.retain(|group| !group.is_empty());

        tracing::info!(
            seeds = seeds.len(),
            groups = groups.len(),
            entity_type = %target,
            "Grouped aggregation completed"
        );

        groups
    }

    /// One combined fetch per requested category that has resolved ids
    ///
    /// Categories that are unknown, unresolved, or whose fetch came back empty
    /// are absent from the result.
    pub async fn per_category(
        &self,
        identity_set: &IdentitySet,
        categories: &[String],
        take: u32,
        min_popularity: Option<f64>,
    ) -> CategoryRecommendations {
        let mut requested: Vec<(String, EntityType, Vec<EntityId>)> = Vec::new();
        for category in categories {
            let category = normalize_category(category);
            if requested.iter().any(|(seen, _, _)| *seen == category) {
                continue;
            }
            let Some(entity_type) = EntityType::from_category(&category) else {
                tracing::warn!(category = %category, "Skipping unsupported category");
                continue;
            };
            if let Some(seeds) = identity_set.get(&category) {
                requested.push((category, entity_type, seeds.to_vec()));
            }
        }

        let lists = fan_out(
            requested,
            self.settings.max_concurrency,
            |(category, entity_type, seeds)| async move {
                let items = self
                    .fetcher
                    .fetch_combined(&seeds, entity_type, take, min_popularity)
                    .await;
                (category, items)
            },
        )
        .await;

        let results: CategoryRecommendations = lists
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .collect();

        tracing::info!(
            requested = categories.len(),
            returned = results.len(),
            "Per-category aggregation completed"
        );

        results
    }

    /// Recommendations for `target_category`, one group per resolved example
    ///
    /// Fails with `NoResolvableCategories` when no example resolves at all. When
    /// examples resolve but no seed yields items, the map is empty rather than
    /// holding an empty entry.
    pub async fn resolve_preferences_to_recommendations(
        &self,
        examples: &PreferenceSource,
        target_category: &str,
    ) -> AppResult<GroupedRecommendations> {
        let target = EntityType::from_category(target_category)
            .ok_or_else(|| AppError::UnknownCategory(target_category.to_string()))?;

        let identity_set = self.identities.merge(std::slice::from_ref(examples)).await;
        if identity_set.is_empty() {
            return Err(AppError::NoResolvableCategories);
        }

        let seeds: Vec<EntityId> = identity_set.seeds().cloned().collect();
        let groups = self.grouped(&seeds, target, PREFERENCE_TAKE).await;

        let mut results = GroupedRecommendations::new();
        if !groups.is_empty() {
            results.insert(normalize_category(target_category), groups);
        }
        Ok(results)
    }

    /// Merges mood-derived and genre-derived examples, then recommends per activity
    ///
    /// The mood examples come first, so their ids lead each activity's signal.
    pub async fn merge_and_aggregate_by_activity(
        &self,
        mood_examples: &PreferenceSource,
        genre_examples: &PreferenceSource,
        activities: &[String],
    ) -> AppResult<CategoryRecommendations> {
        let identity_set = self
            .identities
            .merge(&[mood_examples.clone(), genre_examples.clone()])
            .await;

        let resolvable = activities
            .iter()
            .any(|activity| identity_set.get(activity).is_some());
        if !resolvable {
            return Err(AppError::NoResolvableCategories);
        }

        Ok(self
            .per_category(
                &identity_set,
                activities,
                ACTIVITY_TAKE,
                Some(self.settings.min_popularity),
            )
            .await)
    }

    /// One enriched list for a group: the user's example plus one per friend
    pub async fn blend_across_people(
        &self,
        user_example: &str,
        friend_examples: &[String],
        category: &str,
    ) -> AppResult<BlendOutcome> {
        let entity_type = EntityType::from_category(category)
            .ok_or_else(|| AppError::UnknownCategory(category.to_string()))?;

        let names: Vec<String> = std::iter::once(user_example.to_string())
            .chain(friend_examples.iter().cloned())
            .collect();
        let signal = self.identities.blend(&names, category).await?;
        if signal.is_empty() {
            return Err(AppError::NoResolvableCategories);
        }

        let items = self
            .fetcher
            .fetch_combined(&signal, entity_type, BLEND_TAKE, None)
            .await;
        let recommendations = self.enricher.enrich(items, category).await;

        Ok(BlendOutcome {
            recommendations,
            signal: signal
                .iter()
                .map(EntityId::as_str)
                .collect::<Vec<_>>()
                .join(","),
        })
    }

    /// Recommendations seeded by a single name
    ///
    /// An unresolved name yields an empty list; only an unknown category errors.
    pub async fn seed_recommendations(
        &self,
        name: &str,
        category: &str,
        take: u32,
    ) -> AppResult<Vec<RecommendationItem>> {
        let entity_type = EntityType::from_category(category)
            .ok_or_else(|| AppError::UnknownCategory(category.to_string()))?;

        match self.resolver.resolve_as(name, entity_type).await {
            Some(seed) => Ok(self.fetcher.fetch_per_seed(&seed, entity_type, take).await),
            None => Ok(Vec::new()),
        }
    }

    /// One per-seed fetch per category, seeded by that category's first resolved id
    pub async fn contrast_recommendations(
        &self,
        examples: &PreferenceSource,
    ) -> CategoryRecommendations {
        let identity_set = self.identities.merge(std::slice::from_ref(examples)).await;

        let seeds: Vec<(String, EntityType, EntityId)> = identity_set
            .iter()
            .filter_map(|(category, ids)| {
                let entity_type = EntityType::from_category(category)?;
                Some((category.to_string(), entity_type, ids.first()?.clone()))
            })
            .collect();

        let lists = fan_out(
            seeds,
            self.settings.max_concurrency,
            |(category, entity_type, seed)| async move {
                let items = self
                    .fetcher
                    .fetch_per_seed(&seed, entity_type, SINGLE_TAKE)
                    .await;
                (category, items)
            },
        )
        .await;

        lists
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }
}
