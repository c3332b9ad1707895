use crate::error::ApiResult;
use crate::models::{FavoriteMutation, Flat};
use async_trait::async_trait;

/// Remote source of flats and favorite state.
/// The HTTP API is the production implementation; the in-memory source backs
/// offline runs and tests.
#[async_trait]
pub trait FlatSource: Send + Sync {
    /// Fetch every listed flat
    async fn list_all(&self) -> ApiResult<Vec<Flat>>;

    /// Fetch the flats a user has favorited
    async fn list_favorites(&self, user_id: &str) -> ApiResult<Vec<Flat>>;

    /// Whether `user_id` has favorited `flat_id`
    async fn favorite_status(&self, flat_id: &str, user_id: &str) -> ApiResult<bool>;

    /// Record a favorite change
    async fn set_favorite(&self, mutation: &FavoriteMutation) -> ApiResult<()>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}
