//! Request and response types for the AnonBox backend API.
//!
//! The backend speaks snake_case JSON, which matches Rust field names, so no
//! renaming is needed. Optional fields default so older backends still parse.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Public identity of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    pub handle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub inbox_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body sent to POST /users.
#[derive(Debug, Serialize)]
pub struct CreateUserRequest {
    pub display_name: String,
}

/// Response from POST /users.
#[derive(Debug, Deserialize)]
pub struct CreateUserResponse {
    pub data: User,
    pub private_token: String,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Body sent to POST /users/verify-token.
#[derive(Debug, Serialize)]
pub struct VerifyTokenRequest {
    pub private_token: String,
}

/// Response from POST /users/verify-token.
#[derive(Debug, Deserialize)]
pub struct VerifyTokenResponse {
    pub data: User,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unread_count: u64,
}

/// Response from POST /users/regenerate-token.
#[derive(Debug, Deserialize)]
pub struct RegenerateTokenResponse {
    pub new_private_token: String,
    #[serde(default)]
    pub inbox_url: Option<String>,
}

/// Response from GET /users/{handle}.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicProfile {
    pub handle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompts: Vec<Prompt>,
}

/// Pre-set question a user publishes to collect answers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prompt {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub user_handle: Option<String>,
    #[serde(default)]
    pub share_count: Option<u64>,
    #[serde(default)]
    pub share_url: Option<String>,
}

/// Response from GET /users/{handle}/prompts.
#[derive(Debug, Deserialize)]
pub struct PromptList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompts: Vec<Prompt>,
}

/// Body sent to POST /prompts.
#[derive(Debug, Serialize)]
pub struct CreatePromptRequest {
    pub text: String,
}

/// Response from POST /prompts/{id}/share.
#[derive(Debug, Deserialize)]
pub struct ShareCountResponse {
    pub share_count: u64,
}

/// Read state of a received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
        }
    }
}

/// A received anonymous message. Owned by the backend, never stored locally.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: u64,
    pub content: String,
    pub status: MessageStatus,
    #[serde(default)]
    pub response_text: Option<String>,
    #[serde(default)]
    pub prompt_id: Option<u64>,
    #[serde(default)]
    pub is_shared: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Inbox filters. Unset filters are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxFilters {
    pub status: Option<MessageStatus>,
    pub prompt_id: Option<u64>,
}

/// Response from GET /inbox.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboxResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unread_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_count: u64,
}

/// Body sent to POST /messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessageRequest {
    pub user_handle: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<u64>,
}

/// Response from POST /messages.
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub message_id: Option<u64>,
}

/// Body sent to POST /messages/{id}/respond.
#[derive(Debug, Serialize)]
pub struct RespondRequest {
    pub response_text: String,
}

/// Response from POST /messages/{id}/respond.
#[derive(Debug, Deserialize)]
pub struct RespondResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub card_url: Option<String>,
}

/// Plain `{ message }` acknowledgement used by most mutating endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Body sent to POST /cards/generate.
#[derive(Debug, Serialize)]
pub struct GenerateCardRequest {
    pub message_id: u64,
}

/// Response from POST /cards/generate.
#[derive(Debug, Clone, Deserialize)]
pub struct CardResponse {
    pub image_url: String,
    pub filename: String,
}

/// Response from DELETE /cards/cleanup.
#[derive(Debug, Deserialize)]
pub struct CleanupResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub deleted_count: u64,
}

/// Response from GET /health.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_omits_missing_prompt() {
        let req = SendMessageRequest {
            user_handle: "ab123".into(),
            content: "hi".into(),
            prompt_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"user_handle": "ab123", "content": "hi"}));
    }

    #[test]
    fn test_inbox_response_parses_laravel_shape() {
        let body = serde_json::json!({
            "messages": [
                {"id": 7, "content": "hello", "status": "unread", "created_at": "2024-01-01"},
                {"id": 8, "content": "again", "status": "read", "response_text": "thanks"}
            ],
            "unread_count": 1,
            "total_count": 2
        });
        let inbox: InboxResponse = serde_json::from_value(body).unwrap();
        assert_eq!(inbox.messages.len(), 2);
        assert_eq!(inbox.messages[0].status, MessageStatus::Unread);
        assert_eq!(inbox.messages[1].response_text.as_deref(), Some("thanks"));
        assert_eq!(inbox.unread_count, 1);
        assert_eq!(inbox.total_count, 2);
    }

    #[test]
    fn test_create_user_response_minimal_user() {
        let body = serde_json::json!({
            "data": {"handle": "ab123"},
            "private_token": "tok_x",
            "success": true
        });
        let resp: CreateUserResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.data.handle, "ab123");
        assert_eq!(resp.data.display_name, "");
        assert_eq!(resp.private_token, "tok_x");
    }

    #[test]
    fn test_null_counts_and_names_read_as_defaults() {
        let body = serde_json::json!({"messages": null, "unread_count": null, "total_count": null});
        let inbox: InboxResponse = serde_json::from_value(body).unwrap();
        assert!(inbox.messages.is_empty());
        assert_eq!(inbox.unread_count, 0);
        assert_eq!(inbox.total_count, 0);

        let user: User = serde_json::from_value(serde_json::json!({"handle": "ab123", "display_name": null})).unwrap();
        assert_eq!(user.display_name, "");

        let profile: PublicProfile =
            serde_json::from_value(serde_json::json!({"handle": "ab123", "display_name": null, "prompts": null}))
                .unwrap();
        assert_eq!(profile.display_name, "");
        assert!(profile.prompts.is_empty());
    }

    #[test]
    fn test_unknown_message_status_is_rejected() {
        let body = serde_json::json!({"id": 1, "content": "x", "status": "archived"});
        assert!(serde_json::from_value::<Message>(body).is_err());
    }
}
