//! Prompt text for every generation the pipeline asks for.
//!
//! Each builder states the JSON shape it expects back; the matching
//! [`Shape`](crate::services::extraction::Shape) lives with the caller.

use serde::Serialize;

use crate::models::TitleRequest;

/// Communities a "walk in their shoes" journey may be drawn from
pub const COMMUNITY_ARCHETYPES: &[&str] = &[
    "Alt Pulse",
    "Lyrical Romantic",
    "Culture Hacker",
    "Berry Bloom",
    "Minimal Spirit",
    "Mystic Pulse",
    "Pop Dreamer",
    "Zen Zest",
    "Hidden Flame",
    "Wander Muse",
    "Sunset Rebel",
    "Cottage Noir",
    "Neon Thinker",
    "Kaleido Crafter",
    "Earth Artisan",
    "Retro Soul",
    "Cyber Chill",
    "Tropic Vibist",
    "Hyper Connector",
    "Cine Nomad",
    "Cloudwalker",
    "Vintage Flâneur",
    "Joy Alchemist",
    "Sunkissed Soul",
];

const JSON_ONLY: &str = "Respond with raw JSON only. No markdown, no code fences, no commentary.";

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn single_example(category: &str, preference: &str) -> String {
    format!(
        r#"You recommend Western cultural content.
The user likes this {category}: "{preference}".
Recommend exactly 2 distinct, real {category} titles related to it. Pick fresh titles each time.
Output format:
{{"recommendations": ["title one", "title two"]}}
{JSON_ONLY}"#
    )
}

pub fn mood_activities(mood: &str) -> String {
    format!(
        r#"You recommend Western cultural content.
The user is currently feeling "{mood}".
From these activity types: movies, books, podcast, videogame, tv_show, travel, artist, music
choose at least two that suit the mood, and give one popular, recognizable example for each.
Vary the selection between calls.
Output format:
{{"movies": "Example movie", "podcast": "Example podcast"}}
{JSON_ONLY}"#
    )
}

pub fn genre_examples<T: Serialize>(genres_by_activity: &T) -> String {
    format!(
        r#"You recommend Western cultural content.
The user's genre preferences per activity are:
{}
For each genre, give exactly one highly popular, widely recognized example, in genre order.
Vary the examples between calls.
Output format:
{{"music": ["Jazz example", "Rock example"], "books": ["Mystery example"]}}
{JSON_ONLY}"#,
        pretty(genres_by_activity)
    )
}

pub fn community_example(community: &str, category: &str) -> String {
    format!(
        r#"You are a cultural trends expert.
Name one specific, well-known Western {category} that people in the "{community}" community enjoy.
Pick a different one each time.
Reply with the exact title only: no quotes, no punctuation, no list, no explanation."#
    )
}

pub fn journey_cards(archetype: &str) -> String {
    format!(
        r#"You are a cultural journey guide.
The user belongs to the "{archetype}" community.
Pick one other community at random from: {}.
Suggest three real titles that community enjoys: a music track for the morning, a podcast for the
afternoon and a movie for the night.
Output format:
{{
  "morning": {{"content": "Listen to this track from the <community>", "item": "Track title", "archetype": "<community>"}},
  "afternoon": {{"content": "Try this show from the <community>", "item": "Podcast title", "archetype": "<community>"}},
  "night": {{"content": "Watch this film from the <community>", "item": "Movie title", "archetype": "<community>"}}
}}
{JSON_ONLY}"#,
        COMMUNITY_ARCHETYPES.join(", ")
    )
}

pub fn blend_examples<U: Serialize, F: Serialize>(
    user_preferences: &U,
    friend_preferences: &F,
    activity: &str,
) -> String {
    format!(
        r#"You are a cultural recommendation assistant.
The user's preferences:
{}
The user's friends and their preferences:
{}
Considering everyone's overall taste, suggest one specific {activity} title for the user and one
for each friend, in the order the friends are listed.
Output format:
{{"user_preference_example": "Title for user", "friend_preference_example": ["Title for friend 1"]}}
{JSON_ONLY}"#,
        pretty(user_preferences),
        pretty(friend_preferences)
    )
}

pub fn contrasting_examples(archetype: &str) -> String {
    format!(
        r#"You are a taste contrast engine.
Taste archetype: "{archetype}".
Suggest one real title per category that strongly contrasts with this archetype in tone,
worldview or energy. Vary picks between calls.
Output format:
{{"movies": "Movie", "podcast": "Podcast", "books": "Book", "music": "Artist or album", "tv_show": "TV show"}}
{JSON_ONLY}"#
    )
}

pub fn item_details(category: &str, name: &str) -> String {
    format!(
        r#"You are a structured knowledge assistant.
Give detailed metadata for the {category} titled "{name}" as a JSON object.
Always include "name" and "genre" where they apply, plus the fields that fit the category
(release_year, director, author, host, creator, developer, main_cast, seasons, country,
best_time_to_visit, top_attractions).
Include "platforms_available": a list of {{"name": "...", "icon_url": "..."}} limited to platforms
whose icon URL is publicly reachable.
{JSON_ONLY}"#
    )
}

pub fn enrichment(category: &str, name: &str) -> String {
    format!(
        r#"The user received a {category} recommendation titled "{name}".
Return a summary of at most two lines, a typical rating (for example IMDb for movies, Goodreads
for books) and a cost estimate.
Output format:
{{"summary": "Brief description", "rating": "4.2", "cost": "$$"}}
{JSON_ONLY}"#
    )
}

pub fn describe_titles(titles: &[TitleRequest]) -> String {
    format!(
        r#"For each item below, write a factual two-line description of what the title is about.
Items:
{}
Output format: a JSON array with one object per item, in the same order:
[{{"title": "same title", "category": "same category", "description": "Two-line summary"}}]
Do not add fields. {JSON_ONLY}"#,
        pretty(&titles)
    )
}
