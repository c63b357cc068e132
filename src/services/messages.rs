//! Message and card operations with caller-friendly signatures.

use crate::api::types::{
    Acknowledgement, CardResponse, InboxFilters, InboxResponse, MessageStatus, RespondResponse,
    SendMessageRequest, SendMessageResponse,
};
use crate::api::{ApiClient, ApiError};

/// Card image fetched right after generation.
#[derive(Debug, Clone)]
pub struct DownloadedCard {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Send an anonymous message to `user_handle`. Public endpoint.
pub async fn send_anonymous_message(
    api: &ApiClient,
    user_handle: &str,
    content: &str,
    prompt_id: Option<u64>,
) -> Result<SendMessageResponse, ApiError> {
    let req = SendMessageRequest {
        user_handle: user_handle.to_string(),
        content: content.to_string(),
        prompt_id,
    };
    api.send_message(&req).await
}

pub async fn fetch_inbox(api: &ApiClient, filters: &InboxFilters) -> Result<InboxResponse, ApiError> {
    api.get_inbox(filters).await
}

pub async fn fetch_unread_messages(api: &ApiClient) -> Result<InboxResponse, ApiError> {
    let filters = InboxFilters {
        status: Some(MessageStatus::Unread),
        prompt_id: None,
    };
    api.get_inbox(&filters).await
}

pub async fn fetch_messages_by_prompt(api: &ApiClient, prompt_id: u64) -> Result<InboxResponse, ApiError> {
    let filters = InboxFilters {
        status: None,
        prompt_id: Some(prompt_id),
    };
    api.get_inbox(&filters).await
}

pub async fn read_message(api: &ApiClient, message_id: u64) -> Result<Acknowledgement, ApiError> {
    api.mark_message_read(message_id).await
}

pub async fn reply_to_message(
    api: &ApiClient,
    message_id: u64,
    response_text: &str,
) -> Result<RespondResponse, ApiError> {
    api.respond_to_message(message_id, response_text).await
}

pub async fn remove_message(api: &ApiClient, message_id: u64) -> Result<Acknowledgement, ApiError> {
    api.delete_message(message_id).await
}

pub async fn share_message(api: &ApiClient, message_id: u64) -> Result<Acknowledgement, ApiError> {
    api.mark_message_shared(message_id).await
}

pub async fn create_card(api: &ApiClient, message_id: u64) -> Result<CardResponse, ApiError> {
    api.generate_card(message_id).await
}

pub async fn download_card(api: &ApiClient, filename: &str) -> Result<Vec<u8>, ApiError> {
    api.download_card(filename).await
}

/// Generate a card for a message and download it in one go.
pub async fn generate_and_download_card(api: &ApiClient, message_id: u64) -> Result<DownloadedCard, ApiError> {
    let card = create_card(api, message_id).await?;
    let bytes = download_card(api, &card.filename).await?;
    log::debug!("Downloaded card {} ({} bytes)", card.filename, bytes.len());
    Ok(DownloadedCard {
        filename: card.filename,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::api::mock::{body_json, mock_client, BASE_URL};
    use crate::api::ErrorCode;

    #[tokio::test]
    async fn test_send_without_prompt_omits_field() {
        let (api, transport, _) = mock_client();
        transport.push_json(201, json!({"message": "Message sent", "message_id": 1}));

        send_anonymous_message(&api, "ab123", "hey", None).await.unwrap();
        assert_eq!(
            body_json(&transport.last_request()),
            json!({"user_handle": "ab123", "content": "hey"})
        );
    }

    #[tokio::test]
    async fn test_fetch_unread_and_by_prompt_paths() {
        let (api, transport, _) = mock_client();
        transport.push_json(200, json!({"messages": []}));
        transport.push_json(200, json!({"messages": []}));

        fetch_unread_messages(&api).await.unwrap();
        fetch_messages_by_prompt(&api, 9).await.unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{}/inbox?status=unread", BASE_URL),
                format!("{}/inbox?prompt_id=9", BASE_URL),
            ]
        );
    }

    #[tokio::test]
    async fn test_generate_and_download_card() {
        let (api, transport, _) = mock_client();
        transport.push_json(
            200,
            json!({"image_url": "http://api.test/storage/cards/c1.png", "filename": "c1.png"}),
        );
        transport.push_raw(200, Some("image/png"), b"PNGDATA");

        let card = generate_and_download_card(&api, 3).await.unwrap();
        assert_eq!(card.filename, "c1.png");
        assert_eq!(card.bytes, b"PNGDATA".to_vec());

        let reqs = transport.requests();
        assert_eq!(body_json(&reqs[0]), json!({"message_id": 3}));
        assert_eq!(reqs[1].url, format!("{}/cards/download/c1.png", BASE_URL));
    }

    #[tokio::test]
    async fn test_generate_failure_skips_download() {
        let (api, transport, _) = mock_client();
        transport.push_json(403, json!({}));

        let err = generate_and_download_card(&api, 3).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(transport.requests().len(), 1);
    }
}
