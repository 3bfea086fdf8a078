use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::api::routes;
use crate::api::traits::ApiTransport;
use crate::error::{ApiError, ApiResult};
use crate::models::UserProfile;

/// In-memory token pair shared between the session and the transport
#[derive(Debug, Clone, Default)]
pub struct AuthTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// On-disk token format. Key names are fixed: other tooling reads the
/// same file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: String,
}

/// Persists the token pair as a JSON file
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Save the token pair, creating parent directories as needed
    pub fn save(&self, access: &str, refresh: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let stored = StoredTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, json)
    }

    /// Load the token pair, if a readable file is present
    pub fn load(&self) -> Option<AuthTokens> {
        let json = fs::read_to_string(&self.path).ok()?;
        let stored: StoredTokens = serde_json::from_str(&json).ok()?;
        Some(AuthTokens {
            access: Some(stored.access_token),
            refresh: Some(stored.refresh_token),
        })
    }

    /// Delete the token file
    pub fn clear(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Authenticated session over the API.
///
/// Owns the token lifecycle explicitly: restore on startup, login/refresh
/// against the auth endpoints, teardown on logout. The token state is the
/// same handle the transport reads its bearer header from.
pub struct Session {
    transport: Arc<dyn ApiTransport>,
    tokens: Arc<RwLock<AuthTokens>>,
    store: Option<TokenStore>,
}

impl Session {
    pub fn new(transport: Arc<dyn ApiTransport>, tokens: Arc<RwLock<AuthTokens>>) -> Self {
        Self {
            transport,
            tokens,
            store: None,
        }
    }

    /// Attach a persistent token store
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Load previously persisted tokens into the session, if any
    pub fn restore(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.load() {
            Some(loaded) => {
                debug!("Restored session tokens from {:?}", store.path());
                *self.write_tokens() = loaded;
                true
            }
            None => false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_tokens().access.is_some()
    }

    /// Exchange credentials for a token pair
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        let value = self
            .transport
            .post_json(
                routes::AUTH_LOGIN,
                json!({ "email": email, "password": password }),
            )
            .await?;

        let (access, refresh) = Self::parse_token_pair(&value)?;
        info!("Logged in as {}", email);
        self.install(access, refresh);
        Ok(())
    }

    /// Obtain a fresh access token using the stored refresh token
    pub async fn refresh(&self) -> ApiResult<()> {
        let refresh = self
            .read_tokens()
            .refresh
            .clone()
            .ok_or(ApiError::Unauthorized)?;

        let value = self
            .transport
            .post_json(routes::AUTH_REFRESH, json!({ "refresh": refresh }))
            .await?;

        let access = Self::string_field(&value, "access")?;
        self.install(access, refresh);
        Ok(())
    }

    /// Fetch the authenticated user's profile
    pub async fn me(&self) -> ApiResult<UserProfile> {
        let value = self.transport.get_json(routes::AUTH_ME, &[]).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("profile: {}", e)))
    }

    /// Drop the in-memory tokens and the persisted copy
    pub fn logout(&self) {
        *self.write_tokens() = AuthTokens::default();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                debug!("Could not remove token file: {}", e);
            }
        }
        info!("Session cleared");
    }

    fn install(&self, access: String, refresh: String) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&access, &refresh) {
                debug!("Could not persist tokens: {}", e);
            }
        }
        *self.write_tokens() = AuthTokens {
            access: Some(access),
            refresh: Some(refresh),
        };
    }

    fn parse_token_pair(value: &serde_json::Value) -> ApiResult<(String, String)> {
        let access = Self::string_field(value, "access")?;
        let refresh = Self::string_field(value, "refresh")?;
        Ok((access, refresh))
    }

    fn string_field(value: &serde_json::Value, field: &str) -> ApiResult<String> {
        value
            .get(field)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::MalformedResponse(format!("auth: missing {}", field)))
    }

    fn read_tokens(&self) -> std::sync::RwLockReadGuard<'_, AuthTokens> {
        self.tokens.read().expect("token state poisoned")
    }

    fn write_tokens(&self) -> std::sync::RwLockWriteGuard<'_, AuthTokens> {
        self.tokens.write().expect("token state poisoned")
    }
}
