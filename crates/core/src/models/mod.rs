//! Shared domain models.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Numeric identifier the listing API assigns to a game.
///
/// Ids arrive as JSON numbers but callers frequently hold them as text (a
/// selected row, a command-line argument). [`IntoGameId`] is the single
/// place where both forms are normalized before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(transparent)]
pub struct GameId(pub u32);

impl GameId {
    /// Parse a textual id, ignoring surrounding whitespace.
    pub fn normalize(input: &str) -> Option<Self> {
        input.trim().parse::<u32>().ok().map(GameId)
    }

    /// Raw numeric value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for GameId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => u32::try_from(value)
                .map(GameId)
                .map_err(|_| de::Error::custom(format!("game id {value} out of range"))),
            Raw::Text(text) => GameId::normalize(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid game id {text:?}"))),
        }
    }
}

/// Anything that can be compared against a [`GameId`].
///
/// Text that does not hold a non-negative integer normalizes to `None` and
/// therefore never matches a stored game.
pub trait IntoGameId {
    /// Normalize into a [`GameId`], if the input denotes one.
    fn into_game_id(self) -> Option<GameId>;
}

impl IntoGameId for GameId {
    fn into_game_id(self) -> Option<GameId> {
        Some(self)
    }
}

impl IntoGameId for u32 {
    fn into_game_id(self) -> Option<GameId> {
        Some(GameId(self))
    }
}

impl IntoGameId for i64 {
    fn into_game_id(self) -> Option<GameId> {
        u32::try_from(self).ok().map(GameId)
    }
}

impl IntoGameId for &str {
    fn into_game_id(self) -> Option<GameId> {
        GameId::normalize(self)
    }
}

impl IntoGameId for &String {
    fn into_game_id(self) -> Option<GameId> {
        GameId::normalize(self)
    }
}

impl IntoGameId for String {
    fn into_game_id(self) -> Option<GameId> {
        GameId::normalize(&self)
    }
}

/// A game as served by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Unique id within a listing.
    pub id: GameId,
    /// Display title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Thumbnail image URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail: String,
    /// One-paragraph summary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_description: String,
    /// Genre label, e.g. `Shooter`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: String,
    /// Platform label, e.g. `PC (Windows)`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform: String,
    /// Publisher name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub publisher: String,
    /// Release date as served, usually `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    /// Developer name, when the API provides it.
    #[serde(default)]
    pub developer: Option<String>,
    /// Where the game can be played.
    #[serde(default)]
    pub game_url: Option<String>,
    /// Profile page on the listing site.
    #[serde(default)]
    pub freetogame_profile_url: Option<String>,
}

impl Game {
    /// Case-insensitive match of an already lowercased `needle` against
    /// title, genre and publisher.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.genre.to_lowercase().contains(needle)
            || self.publisher.to_lowercase().contains(needle)
    }
}

/// A single screenshot entry on the details endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    /// Screenshot id.
    #[serde(default)]
    pub id: Option<u64>,
    /// Image URL; empty when the service omits it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
}

/// Minimum system requirements. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRequirements {
    /// Operating system.
    #[serde(default)]
    pub os: Option<String>,
    /// Processor.
    #[serde(default)]
    pub processor: Option<String>,
    /// Memory.
    #[serde(default)]
    pub memory: Option<String>,
    /// Graphics card.
    #[serde(default)]
    pub graphics: Option<String>,
    /// Disk space.
    #[serde(default)]
    pub storage: Option<String>,
}

impl SystemRequirements {
    /// Labelled, non-empty entries in display order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("OS", &self.os),
            ("Processor", &self.processor),
            ("Memory", &self.memory),
            ("Graphics", &self.graphics),
            ("Storage", &self.storage),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| (label, value))
        })
        .collect()
    }
}

/// Extended details for a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    /// Everything the listing endpoint also serves.
    #[serde(flatten)]
    pub game: Game,
    /// Full description.
    #[serde(default)]
    pub description: Option<String>,
    /// Service status, e.g. `Live`.
    #[serde(default)]
    pub status: Option<String>,
    /// Screenshot list, possibly empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub screenshots: Vec<Screenshot>,
    /// `None` when the API has no requirements section.
    #[serde(default)]
    pub minimum_system_requirements: Option<SystemRequirements>,
}

impl GameDetails {
    /// Id of the game.
    pub fn id(&self) -> GameId {
        self.game.id
    }

    /// Title of the game.
    pub fn title(&self) -> &str {
        &self.game.title
    }

    /// URL where the game is played.
    pub fn play_url(&self) -> Option<&str> {
        self.game.game_url.as_deref()
    }
}

/// Aggregate counts over a catalog snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Number of games.
    pub total: usize,
    /// Number of distinct genres.
    pub genre_count: usize,
    /// Number of distinct platforms.
    pub platform_count: usize,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
