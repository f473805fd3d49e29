use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    models::{RecommendationItem, SamplingConfig, TitleDescription, TitleRequest},
    services::{
        extraction::{self, Shape},
        fan_out, prompts,
        providers::TextGenerator,
    },
};

pub const DEFAULT_SUMMARY: &str = "Great recommendation for you";
pub const DEFAULT_RATING: &str = "4.0";
pub const DEFAULT_COST: &str = "$$";
pub const DEFAULT_DESCRIPTION: &str = "Description unavailable.";
const DETAILS_ERROR: &str = "Failed to retrieve detailed info. Please try again.";

/// Generated fields may come back as strings or bare numbers (`"rating": 4.2`)
#[derive(Debug, Default, Deserialize)]
struct GeneratedDetails {
    #[serde(default)]
    summary: Option<Value>,
    #[serde(default)]
    rating: Option<Value>,
    #[serde(default)]
    cost: Option<Value>,
}

fn field_or(value: Option<Value>, default: &str) -> String {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        _ => default.to_string(),
    }
}

/// Decorates items with short generated metadata
///
/// Each item is handled on its own: a failed generation gives that item the
/// default summary, rating and cost, and never drops it or affects its siblings.
#[derive(Clone)]
pub struct Enricher {
    generator: Arc<dyn TextGenerator>,
    max_concurrency: usize,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>, max_concurrency: usize) -> Self {
        Self {
            generator,
            max_concurrency,
        }
    }

    /// Returns the same items in the same order, each with summary, rating and cost set
    pub async fn enrich(
        &self,
        items: Vec<RecommendationItem>,
        category: &str,
    ) -> Vec<RecommendationItem> {
        let enriched = fan_out(items, self.max_concurrency, |item| {
            self.enrich_item(item, category)
        })
        .await;

        tracing::info!(items = enriched.len(), category = %category, "Items enriched");
        enriched
    }

    async fn enrich_item(&self, mut item: RecommendationItem, category: &str) -> RecommendationItem {
        let prompt = prompts::enrichment(category, &item.name);
        let details = match self.generator.generate(&prompt, &SamplingConfig::DEFAULT).await {
            Ok(raw) => extraction::extract_or(&raw, &Shape::object(), GeneratedDetails::default()),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    item = %item.name,
                    provider = self.generator.name(),
                    "Enrichment failed, using defaults"
                );
                GeneratedDetails::default()
            }
        };

        item.summary = Some(field_or(details.summary, DEFAULT_SUMMARY));
        item.rating = Some(field_or(details.rating, DEFAULT_RATING));
        item.cost = Some(field_or(details.cost, DEFAULT_COST));
        item
    }

    /// Free-form metadata for one title
    ///
    /// Falls back to `{"name": name, "error": ...}` when nothing usable comes back.
    pub async fn item_details(&self, category: &str, name: &str) -> Value {
        let category = category.trim().to_lowercase();
        let fallback = json!({ "name": name, "error": DETAILS_ERROR });

        match self
            .generator
            .generate(&prompts::item_details(&category, name), &SamplingConfig::DEFAULT)
            .await
        {
            Ok(raw) => extraction::extract_or(&raw, &Shape::object(), fallback),
            Err(e) => {
                tracing::warn!(error = %e, name = %name, category = %category, "Item details failed");
                fallback
            }
        }
    }

    /// Two-line descriptions for a batch of titles, in input order
    ///
    /// Answered in a single generation; if the answer is malformed or does not
    /// cover every title, every title gets the default description.
    pub async fn describe_titles(&self, titles: &[TitleRequest]) -> Vec<TitleDescription> {
        if titles.is_empty() {
            return Vec::new();
        }

        let fallback: Vec<TitleDescription> = titles
            .iter()
            .map(|title| TitleDescription {
                title: title.title.clone(),
                category: title.category.clone(),
                description: DEFAULT_DESCRIPTION.to_string(),
            })
            .collect();

        let raw = match self
            .generator
            .generate(&prompts::describe_titles(titles), &SamplingConfig::DEFAULT)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, titles = titles.len(), "Title descriptions failed");
                return fallback;
            }
        };

        let shape = Shape::array()
            .require("title")
            .require("category")
            .require("description")
            .min_entries(titles.len());
        let described: Vec<TitleDescription> = extraction::extract_or(&raw, &shape, Vec::new());

        if described.len() != titles.len() {
            tracing::warn!(
                expected = titles.len(),
                received = described.len(),
                "Title descriptions incomplete, using defaults"
            );
            return fallback;
        }

        described
    }
}
