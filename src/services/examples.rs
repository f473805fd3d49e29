use serde::Serialize;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{
        normalize_category, BlendExamples, ExampleValue, JourneyCards, PreferenceSource,
        SamplingConfig,
    },
    services::{
        extraction::{self, Shape},
        fan_out, prompts,
        providers::TextGenerator,
    },
};

const PAIR_KEY: &str = "recommendations";
const PAIR_LEN: usize = 2;
const MIN_MOOD_ACTIVITIES: usize = 2;

const PAIR_SAMPLING: SamplingConfig = SamplingConfig::diverse(1.3);
const MOOD_SAMPLING: SamplingConfig = SamplingConfig::diverse(1.2);
const COMMUNITY_SAMPLING: SamplingConfig = SamplingConfig::with_temperature(1.1);

/// Keeps the entries of a generated object that are names, keyed by normalized category
///
/// Entries of any other form (objects, numbers) are skipped with a warning so
/// one odd category never discards its siblings.
fn example_entries(raw: &str, shape: &Shape) -> AppResult<PreferenceSource> {
    let Value::Object(entries) = extraction::extract(raw, shape)? else {
        return Err(AppError::MalformedGeneratedPayload(
            "expected a JSON object".to_string(),
        ));
    };

    let mut source = PreferenceSource::new();
    for (category, value) in entries {
        match serde_json::from_value::<ExampleValue>(value) {
            Ok(example) => {
                source.insert(normalize_category(&category), example);
            }
            Err(_) => {
                tracing::warn!(category = %category, "Skipping generated entry that is not a name");
            }
        }
    }
    Ok(source)
}

fn example_entries_or_empty(raw: &str) -> PreferenceSource {
    example_entries(raw, &Shape::object()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to no generated examples");
        PreferenceSource::new()
    })
}

#[derive(serde::Deserialize)]
struct ExamplePair {
    recommendations: Vec<String>,
}

/// Asks the generative source for example names given some context
///
/// Every method pairs one prompt with the shape its answer must have. Apart from
/// the mood and journey generations, which have no meaningful default, a failed
/// or malformed generation degrades to an empty result.
#[derive(Clone)]
pub struct ExampleGenerator {
    generator: Arc<dyn TextGenerator>,
    max_concurrency: usize,
}

impl ExampleGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, max_concurrency: usize) -> Self {
        Self {
            generator,
            max_concurrency,
        }
    }

    async fn generate(&self, prompt: &str, sampling: SamplingConfig) -> AppResult<String> {
        self.generator.generate(prompt, &sampling).await.map_err(|e| {
            tracing::warn!(error = %e, provider = self.generator.name(), "Generation failed");
            e
        })
    }

    /// Exactly two names related to one preference, or none
    pub async fn single_example(&self, category: &str, preference: &str) -> Vec<String> {
        let prompt = prompts::single_example(category, preference);
        let Ok(raw) = self.generate(&prompt, PAIR_SAMPLING).await else {
            return Vec::new();
        };

        let shape = Shape::object()
            .require(PAIR_KEY)
            .with_list_len(PAIR_KEY, PAIR_LEN);
        match extraction::extract_as::<ExamplePair>(&raw, &shape) {
            Ok(pair) => pair.recommendations,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    category = %category,
                    preference = %preference,
                    "Discarding malformed example pair"
                );
                Vec::new()
            }
        }
    }

    /// Two examples per preference, grouped per category
    ///
    /// Preferences whose generation failed contribute no group; categories left
    /// with no groups are omitted.
    pub async fn preference_examples(
        &self,
        preferences: &BTreeMap<String, Vec<String>>,
    ) -> PreferenceSource {
        let requests: Vec<(String, String)> = preferences
            .iter()
            .flat_map(|(category, values)| {
                values
                    .iter()
                    .map(move |value| (category.clone(), value.clone()))
            })
            .collect();

        let pairs = fan_out(requests, self.max_concurrency, |(category, preference)| async move {
            let pair = self.single_example(&category, &preference).await;
            (category, pair)
        })
        .await;

        let mut grouped: BTreeMap<String, Vec<Vec<String>>> = BTreeMap::new();
        for (category, pair) in pairs {
            if !pair.is_empty() {
                grouped.entry(category).or_default().push(pair);
            }
        }

        grouped
            .into_iter()
            .map(|(category, groups)| (category, ExampleValue::Groups(groups)))
            .collect()
    }

    /// One example per activity that suits `mood`, at least two activities
    pub async fn mood_activities(&self, mood: &str) -> AppResult<PreferenceSource> {
        let raw = self
            .generate(&prompts::mood_activities(mood), MOOD_SAMPLING)
            .await?;
        let shape = Shape::object().min_entries(MIN_MOOD_ACTIVITIES);
        let activities = example_entries(&raw, &shape)?;

        if activities.len() < MIN_MOOD_ACTIVITIES {
            return Err(AppError::MalformedGeneratedPayload(format!(
                "expected at least {} usable activities, found {}",
                MIN_MOOD_ACTIVITIES,
                activities.len()
            )));
        }
        Ok(activities)
    }

    /// One example per genre, per activity
    pub async fn genre_examples(
        &self,
        genres_by_activity: &BTreeMap<String, Vec<String>>,
    ) -> PreferenceSource {
        if genres_by_activity.values().all(Vec::is_empty) {
            return PreferenceSource::new();
        }

        match self
            .generate(
                &prompts::genre_examples(genres_by_activity),
                SamplingConfig::DEFAULT,
            )
            .await
        {
            Ok(raw) => example_entries_or_empty(&raw),
            Err(_) => PreferenceSource::new(),
        }
    }

    /// A single title that members of `community` would enjoy
    pub async fn community_example(&self, community: &str, category: &str) -> Option<String> {
        let raw = self
            .generate(
                &prompts::community_example(community, category),
                COMMUNITY_SAMPLING,
            )
            .await
            .ok()?;
        extraction::extract_plain_name(&raw)
    }

    /// Morning / afternoon / night picks from another community
    pub async fn journey_cards(&self, archetype: &str) -> AppResult<JourneyCards> {
        let raw = self
            .generate(&prompts::journey_cards(archetype), SamplingConfig::DEFAULT)
            .await?;
        let shape = Shape::object()
            .require("morning")
            .require("afternoon")
            .require("night");
        extraction::extract_as(&raw, &shape)
    }

    /// One example for the user and one per friend for `activity`
    pub async fn blend_examples<U, F>(
        &self,
        user_preferences: &U,
        friend_preferences: &F,
        activity: &str,
    ) -> BlendExamples
    where
        U: Serialize + Sync,
        F: Serialize + Sync,
    {
        let prompt = prompts::blend_examples(user_preferences, friend_preferences, activity);
        match self.generate(&prompt, SamplingConfig::DEFAULT).await {
            Ok(raw) => extraction::extract_or(&raw, &Shape::object(), BlendExamples::default()),
            Err(_) => BlendExamples::default(),
        }
    }

    /// One title per category contrasting with `archetype`
    pub async fn contrasting_examples(&self, archetype: &str) -> PreferenceSource {
        match self
            .generate(
                &prompts::contrasting_examples(archetype),
                SamplingConfig::DEFAULT,
            )
            .await
        {
            Ok(raw) => example_entries_or_empty(&raw),
            Err(_) => PreferenceSource::new(),
        }
    }
}
