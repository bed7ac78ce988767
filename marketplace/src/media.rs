//! Stock-photo search for event imagery.
//!
//! Thin client for a Pexels-style photo API. Failures never reach the
//! caller as errors: any transport or decoding problem degrades to an
//! empty photo list, logged at warn level.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// One photo search result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Photo {
    /// Provider-side photo id
    pub id: u64,
    /// Medium-size image URL
    pub url: String,
    /// Large image URL
    #[serde(rename = "largeUrl")]
    pub large_url: String,
    /// Attribution (photographer name)
    pub photographer: String,
}

/// Photo search results
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PhotoSearchResponse {
    /// Matching photos, possibly empty
    pub photos: Vec<Photo>,
}

/// Photo search service consumed by the event-creation flow
///
/// Returns `BoxFuture` instead of async fn to be dyn-compatible.
pub trait PhotoSearch: Send + Sync {
    /// Search for photos matching a query
    ///
    /// Infallible by contract: implementations swallow provider failures
    /// and return an empty list.
    fn search<'a>(&'a self, query: &'a str, per_page: u32) -> BoxFuture<'a, PhotoSearchResponse>;
}

/// HTTP client for a Pexels-compatible photo API
pub struct StockPhotoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Shape of the provider's search response
#[derive(Deserialize)]
struct ProviderResponse {
    photos: Vec<ProviderPhoto>,
}

#[derive(Deserialize)]
struct ProviderPhoto {
    id: u64,
    src: ProviderPhotoSrc,
    photographer: String,
}

#[derive(Deserialize)]
struct ProviderPhotoSrc {
    medium: String,
    large: String,
}

impl StockPhotoClient {
    /// Creates a client for the given provider endpoint and API key
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    async fn try_search(&self, query: &str, per_page: u32) -> reqwest::Result<ProviderResponse> {
        self.client
            .get(format!("{}/search", self.base_url))
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", &per_page.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json::<ProviderResponse>()
            .await
    }
}

impl PhotoSearch for StockPhotoClient {
    fn search<'a>(&'a self, query: &'a str, per_page: u32) -> BoxFuture<'a, PhotoSearchResponse> {
        Box::pin(async move {
            match self.try_search(query, per_page).await {
                Ok(provider) => PhotoSearchResponse {
                    photos: provider
                        .photos
                        .into_iter()
                        .map(|p| Photo {
                            id: p.id,
                            url: p.src.medium,
                            large_url: p.src.large,
                            photographer: p.photographer,
                        })
                        .collect(),
                },
                Err(error) => {
                    tracing::warn!(%error, query, "photo search failed, returning empty list");
                    PhotoSearchResponse::default()
                },
            }
        })
    }
}
