use crate::error::ApiResult;
use async_trait::async_trait;

/// Abstract HTTP seam every component talks through.
/// Object-safe so tests can substitute an in-memory fake for the network.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// GET a JSON document; query pairs are appended to the path
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<serde_json::Value>;

    /// POST a JSON body, returning the response document
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value>;

    /// DELETE a resource; 204 No Content counts as success
    async fn delete(&self, path: &str) -> ApiResult<()>;
}
