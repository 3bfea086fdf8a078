pub mod catalog;
pub mod http;
pub mod messages;
pub mod routes;
pub mod traits;
pub mod types;

pub use catalog::PropertyCatalog;
pub use http::HttpTransport;
pub use messages::MessagesClient;
pub use traits::ApiTransport;
pub use types::{FilterUpdate, SearchFilters, SortKey};
