use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

pub mod category;
pub mod generation;
pub mod upstream;

pub use category::{normalize_category, EntityType};
pub use generation::{
    BlendExamples, JourneyCard, JourneyCards, SamplingConfig, TitleDescription, TitleRequest,
};
pub use upstream::{InsightEntity, InsightsQuery, SearchHit};

/// Canonical identifier of an entity in the taste graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single free-text example under a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceExample {
    pub category: String,
    pub text: String,
}

impl PreferenceExample {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }
}

/// Outcome of resolving one example against the taste graph
///
/// `canonical_id` is `None` when the name could not be resolved. That is an
/// expected state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReference {
    pub category: String,
    pub source_text: String,
    pub canonical_id: Option<EntityId>,
}

impl EntityReference {
    pub fn absent(example: PreferenceExample) -> Self {
        Self {
            category: example.category,
            source_text: example.text,
            canonical_id: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some()
    }
}

/// The examples a source contributes for one category
///
/// Generators emit a single name, a flat list, or a list of groups depending on
/// the prompt; all three flatten to names in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleValue {
    Name(String),
    Names(Vec<String>),
    Groups(Vec<Vec<String>>),
}

impl ExampleValue {
    pub fn names(&self) -> Vec<&str> {
        match self {
            ExampleValue::Name(name) => vec![name.as_str()],
            ExampleValue::Names(names) => names.iter().map(String::as_str).collect(),
            ExampleValue::Groups(groups) => groups.iter().flatten().map(String::as_str).collect(),
        }
    }
}

/// One source's examples keyed by category
pub type PreferenceSource = BTreeMap<String, ExampleValue>;

/// Flattens a source into examples, in category order then example order
pub fn source_examples(source: &PreferenceSource) -> Vec<PreferenceExample> {
    source
        .iter()
        .flat_map(|(category, value)| {
            value
                .names()
                .into_iter()
                .map(move |name| PreferenceExample::new(category.clone(), name))
        })
        .collect()
}

/// Per-category ordered, de-duplicated canonical ids
///
/// A category key only exists once at least one id was pushed under it, so a
/// returned set never maps a category to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentitySet {
    categories: BTreeMap<String, Vec<EntityId>>,
}

impl IdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` under `category` unless already present. Returns whether it was added.
    pub fn push_unique(&mut self, category: &str, id: EntityId) -> bool {
        let ids = self
            .categories
            .entry(normalize_category(category))
            .or_default();
        if ids.contains(&id) {
            false
        } else {
            ids.push(id);
            true
        }
    }

    pub fn get(&self, category: &str) -> Option<&[EntityId]> {
        self.categories
            .get(&normalize_category(category))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EntityId])> {
        self.categories
            .iter()
            .map(|(category, ids)| (category.as_str(), ids.as_slice()))
    }

    /// Every id in the set, in category order then first-contributed order
    pub fn seeds(&self) -> impl Iterator<Item = &EntityId> {
        self.categories.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A recommended entity, optionally enriched with generated metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub name: String,
    #[serde(rename = "image", default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
}

impl RecommendationItem {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            summary: None,
            rating: None,
            cost: None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.summary.is_some() && self.rating.is_some() && self.cost.is_some()
    }
}

impl From<InsightEntity> for RecommendationItem {
    fn from(entity: InsightEntity) -> Self {
        let image_url = entity
            .properties
            .image
            .and_then(|image| image.url)
            .unwrap_or_default();
        RecommendationItem::new(
            entity.name.unwrap_or_else(|| "Unknown".to_string()),
            image_url,
        )
    }
}

/// Per-seed result groups for a category; each group is non-empty
pub type GroupedRecommendations = BTreeMap<String, Vec<Vec<RecommendationItem>>>;

/// One merged list per category; each list is non-empty
pub type CategoryRecommendations = BTreeMap<String, Vec<RecommendationItem>>;
