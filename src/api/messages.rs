use std::sync::Arc;

use serde_json::json;

use crate::api::routes;
use crate::api::traits::ApiTransport;
use crate::error::{ApiError, ApiResult};
use crate::models::Message;

/// Typed access to the renter/landlord messaging endpoints
#[derive(Clone)]
pub struct MessagesClient {
    transport: Arc<dyn ApiTransport>,
}

impl MessagesClient {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Messages received by the authenticated user
    pub async fn inbox(&self) -> ApiResult<Vec<Message>> {
        let value = self
            .transport
            .get_json(routes::MESSAGES_INBOX, &[])
            .await?;
        Self::parse_messages(value)
    }

    /// Messages sent by the authenticated user
    pub async fn sent(&self) -> ApiResult<Vec<Message>> {
        let value = self.transport.get_json(routes::MESSAGES_SENT, &[]).await?;
        Self::parse_messages(value)
    }

    /// Start or continue a conversation about a listing
    pub async fn send(&self, property_id: i64, subject: &str, content: &str) -> ApiResult<()> {
        self.transport
            .post_json(
                routes::MESSAGES,
                json!({
                    "property_id": property_id,
                    "subject": subject,
                    "content": content,
                }),
            )
            .await?;
        Ok(())
    }

    /// Mark a received message as read
    pub async fn mark_as_read(&self, id: i64) -> ApiResult<Message> {
        let value = self
            .transport
            .post_json(&routes::message_mark_as_read(id), json!({}))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("message {}: {}", id, e)))
    }

    /// Number of unread messages in the inbox
    pub async fn unread_count(&self) -> ApiResult<u64> {
        let value = self
            .transport
            .get_json(routes::MESSAGES_UNREAD_COUNT, &[])
            .await?;
        value
            .get("unread_count")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ApiError::MalformedResponse("unread count: missing field".into()))
    }

    fn parse_messages(value: serde_json::Value) -> ApiResult<Vec<Message>> {
        serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("messages: {}", e)))
    }
}
