use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Taste graph entity-type discriminator that a human-facing category maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Movie,
    Book,
    Place,
    Podcast,
    VideoGame,
    TvShow,
    Artist,
    Album,
}

impl EntityType {
    /// Maps a human-facing category name to its entity type
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. Returns `None`
    /// for categories the taste graph has no entity type for.
    pub fn from_category(category: &str) -> Option<Self> {
        match normalize_category(category).as_str() {
            "movies" => Some(EntityType::Movie),
            "books" => Some(EntityType::Book),
            "travel" => Some(EntityType::Place),
            "podcast" => Some(EntityType::Podcast),
            "videogame" | "video games" => Some(EntityType::VideoGame),
            "tv_show" | "tv shows" => Some(EntityType::TvShow),
            "music" | "artist" => Some(EntityType::Artist),
            "album" => Some(EntityType::Album),
            _ => None,
        }
    }

    /// The token sent to the taste graph as `filter.type`
    pub fn urn(&self) -> &'static str {
        match self {
            EntityType::Movie => "urn:entity:movie",
            EntityType::Book => "urn:entity:book",
            EntityType::Place => "urn:entity:place",
            EntityType::Podcast => "urn:entity:podcast",
            EntityType::VideoGame => "urn:entity:videogame",
            EntityType::TvShow => "urn:entity:tv_show",
            EntityType::Artist => "urn:entity:artist",
            EntityType::Album => "urn:entity:album",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.urn())
    }
}

/// Canonical form of a category key: trimmed and lowercased
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_category_known() {
        assert_eq!(EntityType::from_category("movies"), Some(EntityType::Movie));
        assert_eq!(EntityType::from_category("travel"), Some(EntityType::Place));
        assert_eq!(EntityType::from_category("music"), Some(EntityType::Artist));
        assert_eq!(EntityType::from_category("album"), Some(EntityType::Album));
    }

    #[test]
    fn test_from_category_aliases() {
        assert_eq!(
            EntityType::from_category("video games"),
            Some(EntityType::VideoGame)
        );
        assert_eq!(
            EntityType::from_category("videogame"),
            Some(EntityType::VideoGame)
        );
        assert_eq!(EntityType::from_category("tv shows"), Some(EntityType::TvShow));
        assert_eq!(EntityType::from_category("tv_show"), Some(EntityType::TvShow));
    }

    #[test]
    fn test_from_category_is_case_and_whitespace_insensitive() {
        assert_eq!(EntityType::from_category("  Movies "), Some(EntityType::Movie));
        assert_eq!(EntityType::from_category("BOOKS"), Some(EntityType::Book));
    }

    #[test]
    fn test_from_category_unknown() {
        assert_eq!(EntityType::from_category("food"), None);
        assert_eq!(EntityType::from_category(""), None);
    }

    #[test]
    fn test_urn_display() {
        assert_eq!(format!("{}", EntityType::TvShow), "urn:entity:tv_show");
        assert_eq!(EntityType::VideoGame.urn(), "urn:entity:videogame");
    }
}
