//! Typed AnonBox endpoints on top of [`ApiClient`].
//!
//! Endpoints marked "private" need the `X-Private-Token` header, which the
//! client attaches automatically whenever a session is stored.

use urlencoding::encode;

use super::client::ApiClient;
use super::error::ApiError;
use super::types::*;

/// Build the inbox path, keeping only the filters that are set.
pub fn inbox_path(filters: &InboxFilters) -> String {
    let mut params = Vec::new();
    if let Some(status) = filters.status {
        params.push(format!("status={}", status.as_str()));
    }
    if let Some(prompt_id) = filters.prompt_id {
        params.push(format!("prompt_id={}", prompt_id));
    }
    if params.is_empty() {
        "/inbox".to_string()
    } else {
        format!("/inbox?{}", params.join("&"))
    }
}

impl ApiClient {
    // ── Users ────────────────────────────────────────────────────────────

    /// POST /users
    pub async fn create_user(&self, display_name: &str) -> Result<CreateUserResponse, ApiError> {
        let req = CreateUserRequest {
            display_name: display_name.to_string(),
        };
        self.post_json("/users", &req).await
    }

    /// GET /users/{handle}
    pub async fn get_public_profile(&self, handle: &str) -> Result<PublicProfile, ApiError> {
        self.get_json(&format!("/users/{}", encode(handle))).await
    }

    /// POST /users/verify-token
    pub async fn verify_token(&self, token: &str) -> Result<VerifyTokenResponse, ApiError> {
        let req = VerifyTokenRequest {
            private_token: token.to_string(),
        };
        self.post_json("/users/verify-token", &req).await
    }

    /// POST /users/regenerate-token (private)
    pub async fn regenerate_token(&self) -> Result<RegenerateTokenResponse, ApiError> {
        self.post_empty_json("/users/regenerate-token").await
    }

    // ── Prompts ──────────────────────────────────────────────────────────

    /// GET /prompts/{id}
    pub async fn get_prompt(&self, id: u64) -> Result<Prompt, ApiError> {
        self.get_json(&format!("/prompts/{}", id)).await
    }

    /// GET /users/{handle}/prompts
    pub async fn get_user_prompts(&self, handle: &str) -> Result<Vec<Prompt>, ApiError> {
        let list: PromptList = self.get_json(&format!("/users/{}/prompts", encode(handle))).await?;
        Ok(list.prompts)
    }

    /// POST /prompts/{id}/share
    pub async fn increment_prompt_share(&self, id: u64) -> Result<u64, ApiError> {
        let resp: ShareCountResponse = self.post_empty_json(&format!("/prompts/{}/share", id)).await?;
        Ok(resp.share_count)
    }

    /// POST /prompts (private)
    pub async fn create_prompt(&self, text: &str) -> Result<Prompt, ApiError> {
        let req = CreatePromptRequest { text: text.to_string() };
        self.post_json("/prompts", &req).await
    }

    /// DELETE /prompts/{id} (private)
    pub async fn delete_prompt(&self, id: u64) -> Result<Acknowledgement, ApiError> {
        self.delete_json(&format!("/prompts/{}", id)).await
    }

    // ── Messages ─────────────────────────────────────────────────────────

    /// POST /messages
    pub async fn send_message(&self, req: &SendMessageRequest) -> Result<SendMessageResponse, ApiError> {
        self.post_json("/messages", req).await
    }

    /// GET /inbox (private)
    pub async fn get_inbox(&self, filters: &InboxFilters) -> Result<InboxResponse, ApiError> {
        self.get_json(&inbox_path(filters)).await
    }

    /// PATCH /messages/{id}/read (private)
    pub async fn mark_message_read(&self, id: u64) -> Result<Acknowledgement, ApiError> {
        self.patch_empty_json(&format!("/messages/{}/read", id)).await
    }

    /// POST /messages/{id}/respond (private)
    pub async fn respond_to_message(&self, id: u64, response_text: &str) -> Result<RespondResponse, ApiError> {
        let req = RespondRequest {
            response_text: response_text.to_string(),
        };
        self.post_json(&format!("/messages/{}/respond", id), &req).await
    }

    /// DELETE /messages/{id} (private)
    pub async fn delete_message(&self, id: u64) -> Result<Acknowledgement, ApiError> {
        self.delete_json(&format!("/messages/{}", id)).await
    }

    /// POST /messages/{id}/share (private)
    pub async fn mark_message_shared(&self, id: u64) -> Result<Acknowledgement, ApiError> {
        self.post_empty_json(&format!("/messages/{}/share", id)).await
    }

    // ── Cards ────────────────────────────────────────────────────────────

    /// POST /cards/generate (private)
    pub async fn generate_card(&self, message_id: u64) -> Result<CardResponse, ApiError> {
        self.post_json("/cards/generate", &GenerateCardRequest { message_id }).await
    }

    /// GET /cards/download/{filename}, raw image bytes.
    pub async fn download_card(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        self.download(&format!("/cards/download/{}", encode(filename))).await
    }

    /// DELETE /cards/cleanup (private)
    pub async fn cleanup_cards(&self) -> Result<u64, ApiError> {
        let resp: CleanupResponse = self.delete_json("/cards/cleanup").await?;
        Ok(resp.deleted_count)
    }

    // ── Health ───────────────────────────────────────────────────────────

    /// GET /health
    pub async fn check_health(&self) -> Result<HealthResponse, ApiError> {
        self.get_json("/health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_path_only_includes_set_filters() {
        assert_eq!(inbox_path(&InboxFilters::default()), "/inbox");
        assert_eq!(
            inbox_path(&InboxFilters {
                status: Some(MessageStatus::Unread),
                prompt_id: None,
            }),
            "/inbox?status=unread"
        );
        assert_eq!(
            inbox_path(&InboxFilters {
                status: None,
                prompt_id: Some(4),
            }),
            "/inbox?prompt_id=4"
        );
        assert_eq!(
            inbox_path(&InboxFilters {
                status: Some(MessageStatus::Read),
                prompt_id: Some(4),
            }),
            "/inbox?status=read&prompt_id=4"
        );
    }
}
