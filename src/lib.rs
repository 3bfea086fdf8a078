pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod favorites;
pub mod models;
pub mod search;

pub use api::{
    ApiTransport, FilterUpdate, HttpTransport, MessagesClient, PropertyCatalog, SearchFilters,
    SortKey,
};
pub use auth::{AuthTokens, Session, TokenStore};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use favorites::FavoriteStore;
pub use search::{SearchController, SearchHandle, SearchSnapshot};
