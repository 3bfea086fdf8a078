use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

use crate::api::routes;
use crate::api::traits::ApiTransport;
use crate::error::ApiResult;
use crate::models::Listing;

/// Local favorite state layered over the server's `is_favorite` flags.
///
/// A toggle flips the local override immediately, then confirms it against
/// the API; on failure the override rolls back to the pre-toggle value.
/// Mutations are serialized per listing id, so two rapid toggles on the
/// same listing settle one after the other instead of racing.
pub struct FavoriteStore {
    transport: Arc<dyn ApiTransport>,
    /// Pending or confirmed local divergence from the server state,
    /// keyed by listing id. Cleared when listings are reloaded.
    overrides: Mutex<HashMap<i64, bool>>,
    /// One gate per listing id; holding it is the single-flight guard
    gates: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl FavoriteStore {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            overrides: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Favorite state as the user currently sees it: the local override if
    /// one exists, the fetched flag otherwise
    pub fn effective(&self, listing: &Listing) -> bool {
        self.override_for(listing.id).unwrap_or(listing.is_favorite)
    }

    /// The local override for a listing id, if one is held
    pub fn override_for(&self, id: i64) -> Option<bool> {
        self.overrides().get(&id).copied()
    }

    /// Flip a listing's favorite state with immediate local effect.
    ///
    /// Returns the new effective state on success. On failure the override
    /// is rolled back to the pre-toggle value and the error is returned for
    /// the caller to surface.
    pub async fn toggle(&self, listing: &Listing) -> ApiResult<bool> {
        let gate = self.gate(listing.id);
        let _in_flight = gate.lock().await;

        let previous = self.effective(listing);
        let desired = !previous;
        self.overrides().insert(listing.id, desired);

        let result = if desired {
            self.add(listing.id).await
        } else {
            self.remove(listing.id).await
        };

        match result {
            Ok(()) => Ok(desired),
            Err(e) => {
                warn!("Favorite toggle failed for listing {}: {}", listing.id, e);
                self.overrides().insert(listing.id, previous);
                Err(e)
            }
        }
    }

    /// Drop all overrides. Call after a full reload, when the fetched
    /// `is_favorite` flags are authoritative again.
    pub fn clear_overrides(&self) {
        self.overrides().clear();
    }

    async fn add(&self, property_id: i64) -> ApiResult<()> {
        self.transport
            .post_json(routes::FAVORITES, json!({ "property_id": property_id }))
            .await?;
        Ok(())
    }

    async fn remove(&self, property_id: i64) -> ApiResult<()> {
        self.transport.delete(&routes::favorite(property_id)).await
    }

    fn overrides(&self) -> std::sync::MutexGuard<'_, HashMap<i64, bool>> {
        self.overrides.lock().expect("override map poisoned")
    }

    fn gate(&self, id: i64) -> Arc<AsyncMutex<()>> {
        let mut gates = self.gates.lock().expect("gate map poisoned");
        Arc::clone(gates.entry(id).or_default())
    }
}
