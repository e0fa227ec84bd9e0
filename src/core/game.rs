use serde::{Deserialize, Serialize};

use crate::core::{ComponentId, GameId, GenreId};

/// Deserialize a release year from string or int (CSV/JSON exports mix both)
pub(crate) fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearValue {
        Int(i32),
        String(String),
        Null,
    }

    match YearValue::deserialize(deserializer)? {
        YearValue::Int(i) => Ok(Some(i)),
        YearValue::String(s) if s.trim().is_empty() => Ok(None),
        YearValue::String(s) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| Error::custom(format!("Invalid year string: {}", s))),
        YearValue::Null => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Cover image stored alongside the game row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// One minimum + recommended hardware specification attached to a game.
///
/// RAM thresholds are in GB, VRAM thresholds in MB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSet {
    pub id: i64,
    pub game_id: GameId,
    pub min_cpu_id: ComponentId,
    pub min_gpu_id: ComponentId,
    pub rec_cpu_id: ComponentId,
    pub rec_gpu_id: ComponentId,
    pub min_ram: f64,
    pub min_vram: f64,
    pub rec_ram: f64,
    pub rec_vram: f64,
}

/// A catalog game with its relations and requirement sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,

    pub title: String,

    #[serde(default, deserialize_with = "deserialize_year")]
    pub release_year: Option<i32>,

    #[serde(default)]
    pub genre: Option<Genre>,

    #[serde(default)]
    pub platform: Option<Platform>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub image: Option<GameImage>,

    /// Evaluated in this order by the matcher
    #[serde(default)]
    pub requirements: Vec<RequirementSet>,
}

impl Game {
    pub fn new(id: GameId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            release_year: None,
            genre: None,
            platform: None,
            tags: Vec::new(),
            image: None,
            requirements: Vec::new(),
        }
    }

    pub fn genre_id(&self) -> Option<GenreId> {
        self.genre.as_ref().map(|g| g.id)
    }

    /// Release year used for ordering; unknown years sort last
    pub fn sort_year(&self) -> i32 {
        self.release_year.unwrap_or(0)
    }

    /// Get display name (for logging/UI)
    pub fn display_name(&self) -> String {
        if let Some(year) = self.release_year {
            format!("{} ({})", self.title, year)
        } else {
            self.title.clone()
        }
    }
}
