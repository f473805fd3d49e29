use serde::{Deserialize, Serialize};

use super::upstream::GenerationConfig;

/// Sampling knobs passed to the generative text capability
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

impl SamplingConfig {
    /// Provider defaults
    pub const DEFAULT: Self = Self {
        temperature: None,
        top_p: None,
        top_k: None,
    };

    /// High-variance sampling for "give me something new each time" prompts
    pub const fn diverse(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            top_p: Some(1.0),
            top_k: Some(40),
        }
    }

    pub const fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            top_p: None,
            top_k: None,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl From<SamplingConfig> for GenerationConfig {
    fn from(sampling: SamplingConfig) -> Self {
        GenerationConfig {
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
        }
    }
}

/// One time-of-day card from another community's point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyCard {
    pub content: String,
    pub item: String,
    pub archetype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyCards {
    pub morning: JourneyCard,
    pub afternoon: JourneyCard,
    pub night: JourneyCard,
}

/// One example for the acting user plus one per friend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendExamples {
    #[serde(default)]
    pub user_preference_example: String,
    #[serde(default)]
    pub friend_preference_example: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRequest {
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDescription {
    pub title: String,
    pub category: String,
    pub description: String,
}
