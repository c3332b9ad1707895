use crate::api::traits::FlatSource;
use crate::api::types::ApiEndpoints;
use crate::error::{ApiError, ApiResult};
use crate::models::{FavoriteMutation, FavoriteStatusResponse, Flat};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Listings API client
pub struct HttpFlatSource {
    client: Client,
    endpoints: ApiEndpoints,
    listing_timeout: Duration,
}

impl HttpFlatSource {
    /// Create a client with the default endpoints and timeouts
    pub fn new() -> Result<Self> {
        Self::with_endpoints(
            ApiEndpoints::default(),
            Duration::from_secs(30),
            Duration::from_secs(5),
        )
    }

    /// Create a client for custom endpoints.
    /// `request_timeout` bounds every call; `listing_timeout` additionally
    /// bounds the bulk listing fetches.
    pub fn with_endpoints(
        endpoints: ApiEndpoints,
        request_timeout: Duration,
        listing_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("flat-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoints,
            listing_timeout,
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    async fn fetch_listing(&self, url: Url) -> ApiResult<Vec<Flat>> {
        debug!("Fetching listing: {}", url);
        let request = self.client.get(url).timeout(self.listing_timeout);
        let flats: Vec<Flat> = send_checked(request).await?.json().await?;
        debug!("Listing returned {} flats", flats.len());
        Ok(flats)
    }
}

async fn send_checked(request: RequestBuilder) -> ApiResult<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!("Listings API returned status: {}", status);
        return Err(ApiError::Status(status.as_u16()));
    }
    Ok(response)
}

fn endpoint(url: Result<Url>) -> ApiResult<Url> {
    url.map_err(|err| ApiError::Transport(format!("{:#}", err)))
}

#[async_trait]
impl FlatSource for HttpFlatSource {
    async fn list_all(&self) -> ApiResult<Vec<Flat>> {
        let url = endpoint(self.endpoints.all_flats_url())?;
        self.fetch_listing(url).await
    }

    async fn list_favorites(&self, user_id: &str) -> ApiResult<Vec<Flat>> {
        let url = endpoint(self.endpoints.favorite_flats_url(user_id))?;
        self.fetch_listing(url).await
    }

    async fn favorite_status(&self, flat_id: &str, user_id: &str) -> ApiResult<bool> {
        let url = endpoint(self.endpoints.favorite_status_url(flat_id, user_id))?;
        debug!("Fetching favorite status: {}", url);
        let body: FavoriteStatusResponse = send_checked(self.client.get(url)).await?.json().await?;
        Ok(body.is_favorited())
    }

    async fn set_favorite(&self, mutation: &FavoriteMutation) -> ApiResult<()> {
        let url = endpoint(self.endpoints.favorite_mutation_url())?;
        debug!(
            "Posting favorite change: flat={} status={:?}",
            mutation.flat, mutation.status
        );
        send_checked(self.client.post(url).json(mutation)).await?;
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "Listings API"
    }
}
