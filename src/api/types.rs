use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Endpoint layout of the listings API.
///
/// Paths are relative to `base`; `{user}` and `{flat}` placeholders are
/// substituted per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEndpoints {
    /// Base URL, with a trailing slash
    pub base: String,
    /// All flats
    pub all_flats: String,
    /// Flats favorited by `{user}`
    pub favorite_flats: String,
    /// Favorite status of `{flat}` for `{user}`
    pub favorite_status: String,
    /// POST target for favorite changes
    pub favorite_mutation: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            base: "http://localhost:3000/api/".to_string(),
            all_flats: "flats".to_string(),
            favorite_flats: "flats/favorites/{user}".to_string(),
            favorite_status: "favorites/{flat}/{user}".to_string(),
            favorite_mutation: "favorites".to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Endpoints rooted at a different base URL
    pub fn with_base(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            ..Self::default()
        }
    }

    pub fn all_flats_url(&self) -> Result<Url> {
        self.resolve(&self.all_flats)
    }

    pub fn favorite_flats_url(&self, user_id: &str) -> Result<Url> {
        self.resolve(&self.favorite_flats.replace("{user}", &encode_segment(user_id)))
    }

    pub fn favorite_status_url(&self, flat_id: &str, user_id: &str) -> Result<Url> {
        let path = self
            .favorite_status
            .replace("{flat}", &encode_segment(flat_id))
            .replace("{user}", &encode_segment(user_id));
        self.resolve(&path)
    }

    pub fn favorite_mutation_url(&self) -> Result<Url> {
        self.resolve(&self.favorite_mutation)
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base)
            .with_context(|| format!("Invalid API base URL: {}", self.base))?;
        base.join(path)
            .with_context(|| format!("Invalid API path: {}", path))
    }
}

fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
