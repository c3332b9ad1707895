use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Owner of a flat, embedded in every listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Owner {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

/// Core flat data model, as served by the listings API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flat {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub street_number: String,
    #[serde(default)]
    pub rent_price: f64,
    #[serde(default)]
    pub area_size: f64,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub has_ac: bool,
    #[serde(default)]
    pub date_available: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "user")]
    pub owner: Owner,
}

/// Accept `"12"`, `12`, `12.5` or `null` as text
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Which collection a listing screen shows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ListingMode {
    #[default]
    All,
    FavoritesOnly,
}

impl fmt::Display for ListingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingMode::All => f.write_str("all"),
            ListingMode::FavoritesOnly => f.write_str("favorites-only"),
        }
    }
}

/// Favorite status as carried by the mutation endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteStatus {
    Active,
    Inactive,
}

impl FavoriteStatus {
    pub fn from_favorited(favorited: bool) -> Self {
        if favorited {
            FavoriteStatus::Active
        } else {
            FavoriteStatus::Inactive
        }
    }
}

/// Body of the favorite status lookup; `search == "ok"` means favorited
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FavoriteStatusResponse {
    #[serde(default)]
    pub search: Option<String>,
}

impl FavoriteStatusResponse {
    pub fn is_favorited(&self) -> bool {
        self.search.as_deref() == Some("ok")
    }
}

/// Body posted to the favorite mutation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteMutation {
    pub flat: String,
    pub user: String,
    pub status: FavoriteStatus,
}
