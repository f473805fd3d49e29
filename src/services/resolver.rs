use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{EntityId, EntityReference, EntityType, PreferenceExample, SearchHit},
    services::{fan_out, providers::TasteGraph},
};

const BEST_MATCH_LIMIT: u32 = 1;

/// Maps free-text names to canonical taste graph identifiers
///
/// Resolution never fails on upstream trouble: a transport error, timeout or
/// empty search result all resolve to `None` and are logged.
#[derive(Clone)]
pub struct EntityResolver {
    graph: Arc<dyn TasteGraph>,
    max_concurrency: usize,
}

impl EntityResolver {
    pub fn new(graph: Arc<dyn TasteGraph>, max_concurrency: usize) -> Self {
        Self {
            graph,
            max_concurrency,
        }
    }

    /// Resolves `name` within a human-facing category
    ///
    /// Errors only with `UnknownCategory` when `category` has no entity type.
    pub async fn resolve(&self, name: &str, category: &str) -> AppResult<Option<EntityId>> {
        let entity_type = EntityType::from_category(category)
            .ok_or_else(|| AppError::UnknownCategory(category.to_string()))?;
        Ok(self.resolve_as(name, entity_type).await)
    }

    /// Resolves `name` against an already-known entity type
    pub async fn resolve_as(&self, name: &str, entity_type: EntityType) -> Option<EntityId> {
        let query = name.trim();
        if query.is_empty() {
            tracing::debug!(entity_type = %entity_type, "Skipping empty name");
            return None;
        }

        match self.graph.search(query, entity_type, BEST_MATCH_LIMIT).await {
            Ok(hits) => {
                let id = hits.first().and_then(SearchHit::canonical_id);
                if id.is_none() {
                    tracing::info!(
                        query = %query,
                        entity_type = %entity_type,
                        provider = self.graph.name(),
                        "No entity found"
                    );
                }
                id
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    query = %query,
                    entity_type = %entity_type,
                    provider = self.graph.name(),
                    "Entity search failed"
                );
                None
            }
        }
    }

    /// Resolves a batch concurrently, returning one reference per input in input order
    ///
    /// Examples in unknown categories come back unresolved without a lookup.
    pub async fn resolve_all(&self, examples: Vec<PreferenceExample>) -> Vec<EntityReference> {
        let total = examples.len();
        let references = fan_out(examples, self.max_concurrency, |example| {
            self.resolve_example(example)
        })
        .await;

        let resolved = references.iter().filter(|r| r.is_resolved()).count();
        tracing::info!(
            total = total,
            resolved = resolved,
            unresolved = total - resolved,
            "Batch resolution completed"
        );

        references
    }

    async fn resolve_example(&self, example: PreferenceExample) -> EntityReference {
        let Some(entity_type) = EntityType::from_category(&example.category) else {
            tracing::warn!(category = %example.category, "Unknown category, not resolving");
            return EntityReference::absent(example);
        };

        let canonical_id = self.resolve_as(&example.text, entity_type).await;
        EntityReference {
            category: example.category,
            source_text: example.text,
            canonical_id,
        }
    }
}
