use std::sync::Arc;

use crate::api::routes;
use crate::api::traits::ApiTransport;
use crate::api::types::SearchFilters;
use crate::error::{ApiError, ApiResult};
use crate::models::{FavoriteEntry, Listing, ListingPage};

/// Typed access to the property catalog endpoints
#[derive(Clone)]
pub struct PropertyCatalog {
    transport: Arc<dyn ApiTransport>,
}

impl PropertyCatalog {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Fetch one page of listings matching the filters
    pub async fn search(&self, filters: &SearchFilters) -> ApiResult<ListingPage> {
        let value = self
            .transport
            .get_json(routes::PROPERTIES, &filters.to_query())
            .await?;
        ListingPage::from_value(value)
    }

    /// Fetch a single listing
    pub async fn detail(&self, id: i64) -> ApiResult<Listing> {
        let value = self
            .transport
            .get_json(&routes::property_detail(id), &[])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("listing {}: {}", id, e)))
    }

    /// Listings similar to the given one
    pub async fn similar(&self, id: i64) -> ApiResult<Vec<Listing>> {
        let value = self
            .transport
            .get_json(&routes::property_similar(id), &[])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("similar listings: {}", e)))
    }

    /// The authenticated landlord's own listings
    pub async fn my_properties(&self) -> ApiResult<ListingPage> {
        let value = self
            .transport
            .get_json(routes::MY_PROPERTIES, &[])
            .await?;
        ListingPage::from_value(value)
    }

    /// The authenticated user's saved favorites
    pub async fn favorites(&self) -> ApiResult<Vec<FavoriteEntry>> {
        let value = self.transport.get_json(routes::FAVORITES, &[]).await?;
        // Paginated envelope, same shape as the listing endpoint
        let results = value
            .get("results")
            .cloned()
            .ok_or_else(|| ApiError::MalformedResponse("favorites: missing results".into()))?;
        serde_json::from_value(results)
            .map_err(|e| ApiError::MalformedResponse(format!("favorites: {}", e)))
    }
}
