use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    models::{
        normalize_category, source_examples, EntityId, EntityType, IdentitySet,
        PreferenceExample, PreferenceSource,
    },
    services::resolver::EntityResolver,
};

/// Merges examples from several sources into per-category canonical ids
#[derive(Clone)]
pub struct IdentitySetBuilder {
    resolver: EntityResolver,
}

impl IdentitySetBuilder {
    pub fn new(resolver: EntityResolver) -> Self {
        Self { resolver }
    }

    /// Resolves every example of every source and merges the results
    ///
    /// Sources are merged in the order given; within a category the first
    /// contribution of an id fixes its position and later duplicates are dropped.
    /// Categories without an entity type are skipped, and categories that end up
    /// with no resolved id are absent from the result.
    pub async fn merge(&self, sources: &[PreferenceSource]) -> IdentitySet {
        let mut skipped = BTreeSet::new();
        let examples: Vec<PreferenceExample> = sources
            .iter()
            .flat_map(source_examples)
            .filter(|example| {
                let known = EntityType::from_category(&example.category).is_some();
                if !known {
                    skipped.insert(normalize_category(&example.category));
                }
                known
            })
            .collect();

        if !skipped.is_empty() {
            tracing::warn!(categories = ?skipped, "Skipping categories with no entity type");
        }

        let references = self.resolver.resolve_all(examples).await;

        let mut identity_set = IdentitySet::new();
        for reference in references {
            if let Some(id) = reference.canonical_id {
                identity_set.push_unique(&reference.category, id);
            }
        }

        tracing::info!(
            sources = sources.len(),
            categories = identity_set.len(),
            seeds = identity_set.seeds().count(),
            "Identity set built"
        );

        identity_set
    }

    /// Resolves one example per person into a single combined signal
    ///
    /// Unlike [`merge`](Self::merge), ids are not de-duplicated across people so
    /// each person's taste keeps its weight in the signal. Unresolved people are
    /// left out.
    pub async fn blend(&self, names: &[String], category: &str) -> AppResult<Vec<EntityId>> {
        if EntityType::from_category(category).is_none() {
            return Err(AppError::UnknownCategory(category.to_string()));
        }

        let examples = names
            .iter()
            .map(|name| PreferenceExample::new(category, name.as_str()))
            .collect();

        let signal: Vec<EntityId> = self
            .resolver
            .resolve_all(examples)
            .await
            .into_iter()
            .filter_map(|reference| reference.canonical_id)
            .collect();

        tracing::info!(
            people = names.len(),
            seeds = signal.len(),
            category = %category,
            "Blend signal built"
        );

        Ok(signal)
    }
}
