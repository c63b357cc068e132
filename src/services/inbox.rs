//! Stateful helpers for the inbox and message screens.
//!
//! Each holder tracks `loading` and a human-readable `error` the way a view
//! would, and swallows failures after recording them: callers read the state
//! instead of handling `Result`s.

use std::future::Future;
use std::sync::Arc;

use super::messages::{self, DownloadedCard};
use crate::api::types::{Acknowledgement, InboxFilters, InboxResponse, Message, RespondResponse};
use crate::api::{ApiClient, ApiError};

const LOAD_FAILED: &str = "Unable to load messages.";
const ACTION_FAILED: &str = "An error occurred.";

fn message_or(err: &ApiError, fallback: &str) -> String {
    if err.message().is_empty() {
        fallback.to_string()
    } else {
        err.message().to_string()
    }
}

/// Loaded inbox page.
pub struct InboxState {
    api: Arc<ApiClient>,
    pub messages: Vec<Message>,
    pub unread_count: u64,
    pub total_count: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl InboxState {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            messages: Vec::new(),
            unread_count: 0,
            total_count: 0,
            loading: false,
            error: None,
        }
    }

    /// Load the inbox. On failure the previous contents are kept.
    pub async fn load(&mut self, filters: &InboxFilters) {
        let api = self.api.clone();
        let filters = filters.clone();
        self.fetch(async move { messages::fetch_inbox(&api, &filters).await })
            .await;
    }

    pub async fn load_unread(&mut self) {
        let api = self.api.clone();
        self.fetch(async move { messages::fetch_unread_messages(&api).await })
            .await;
    }

    async fn fetch<F>(&mut self, request: F)
    where
        F: Future<Output = Result<InboxResponse, ApiError>>,
    {
        self.loading = true;
        self.error = None;
        match request.await {
            Ok(inbox) => {
                self.messages = inbox.messages;
                self.unread_count = inbox.unread_count;
                self.total_count = inbox.total_count;
            }
            Err(e) => {
                log::warn!("Inbox load failed: {} ({})", e, e.code());
                self.error = Some(message_or(&e, LOAD_FAILED));
            }
        }
        self.loading = false;
    }
}

type SuccessCallback = Box<dyn Fn() + Send + Sync>;

/// Actions on a single message.
///
/// Every action returns `None` on failure and records the message in `error`.
/// `on_success` runs after each successful action (e.g. to reload the inbox).
pub struct MessageActions {
    api: Arc<ApiClient>,
    on_success: Option<SuccessCallback>,
    pub loading: bool,
    pub error: Option<String>,
}

impl MessageActions {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            on_success: None,
            loading: false,
            error: None,
        }
    }

    pub fn on_success(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub async fn mark_as_read(&mut self, message_id: u64) -> Option<Acknowledgement> {
        let api = self.api.clone();
        self.run(async move { messages::read_message(&api, message_id).await })
            .await
    }

    pub async fn reply(&mut self, message_id: u64, response_text: &str) -> Option<RespondResponse> {
        let api = self.api.clone();
        let text = response_text.to_string();
        self.run(async move { messages::reply_to_message(&api, message_id, &text).await })
            .await
    }

    pub async fn remove(&mut self, message_id: u64) -> Option<Acknowledgement> {
        let api = self.api.clone();
        self.run(async move { messages::remove_message(&api, message_id).await })
            .await
    }

    pub async fn share(&mut self, message_id: u64) -> Option<Acknowledgement> {
        let api = self.api.clone();
        self.run(async move { messages::share_message(&api, message_id).await })
            .await
    }

    pub async fn generate_card(&mut self, message_id: u64) -> Option<DownloadedCard> {
        let api = self.api.clone();
        self.run(async move { messages::generate_and_download_card(&api, message_id).await })
            .await
    }

    async fn run<T, F>(&mut self, action: F) -> Option<T>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.loading = true;
        self.error = None;
        let result = action.await;
        self.loading = false;
        match result {
            Ok(value) => {
                if let Some(callback) = &self.on_success {
                    callback();
                }
                Some(value)
            }
            Err(e) => {
                log::warn!("Message action failed: {} ({})", e, e.code());
                self.error = Some(message_or(&e, ACTION_FAILED));
                None
            }
        }
    }
}

/// Anonymous send form on a public profile.
pub struct SendState {
    api: Arc<ApiClient>,
    pub loading: bool,
    pub success: bool,
    pub error: Option<String>,
}

impl SendState {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            loading: false,
            success: false,
            error: None,
        }
    }

    pub fn reset(&mut self) {
        self.success = false;
        self.error = None;
    }

    pub async fn send(&mut self, user_handle: &str, content: &str, prompt_id: Option<u64>) {
        self.loading = true;
        self.error = None;
        self.success = false;
        match messages::send_anonymous_message(&self.api, user_handle, content, prompt_id).await {
            Ok(_) => self.success = true,
            Err(e) => {
                log::warn!("Message send failed: {} ({})", e, e.code());
                self.error = Some(message_or(&e, ACTION_FAILED));
            }
        }
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;

    use crate::api::error::messages as texts;
    use crate::api::mock::{mock_client, MockTransport};

    fn api() -> (Arc<ApiClient>, Arc<MockTransport>) {
        let (client, transport, _) = mock_client();
        (Arc::new(client), transport)
    }

    #[tokio::test]
    async fn test_inbox_load_success() {
        let (api, transport) = api();
        transport.push_json(
            200,
            json!({
                "messages": [{"id": 1, "content": "hi", "status": "unread"}],
                "unread_count": 1,
                "total_count": 4
            }),
        );

        let mut inbox = InboxState::new(api);
        inbox.load(&InboxFilters::default()).await;

        assert_eq!(inbox.messages.len(), 1);
        assert_eq!(inbox.unread_count, 1);
        assert_eq!(inbox.total_count, 4);
        assert!(!inbox.loading);
        assert!(inbox.error.is_none());
    }

    #[tokio::test]
    async fn test_inbox_failure_keeps_previous_contents() {
        let (api, transport) = api();
        transport.push_json(
            200,
            json!({"messages": [{"id": 1, "content": "hi", "status": "read"}], "unread_count": 0, "total_count": 1}),
        );
        transport.push_offline();

        let mut inbox = InboxState::new(api);
        inbox.load(&InboxFilters::default()).await;
        inbox.load_unread().await;

        assert_eq!(inbox.messages.len(), 1);
        assert_eq!(inbox.total_count, 1);
        assert_eq!(inbox.error.as_deref(), Some(texts::NETWORK));
        assert!(!inbox.loading);
    }

    #[tokio::test]
    async fn test_actions_call_on_success_only_when_ok() {
        let (api, transport) = api();
        transport.push_json(200, json!({"message": "Message marked as read"}));
        transport.push_json(404, json!({}));

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut actions = MessageActions::new(api).on_success(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let ack = actions.mark_as_read(1).await;
        assert_eq!(ack.map(|a| a.message).as_deref(), Some("Message marked as read"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(actions.error.is_none());

        assert!(actions.remove(2).await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(actions.error.as_deref(), Some(texts::NOT_FOUND));
        assert!(!actions.loading);
    }

    #[tokio::test]
    async fn test_reply_returns_card_url() {
        let (api, transport) = api();
        transport.push_json(200, json!({"message": "Response saved", "card_url": "/cards/x.png"}));

        let mut actions = MessageActions::new(api);
        let resp = actions.reply(1, "thanks!").await.unwrap();
        assert_eq!(resp.card_url.as_deref(), Some("/cards/x.png"));
    }

    #[tokio::test]
    async fn test_send_state_tracks_success_and_reset() {
        let (api, transport) = api();
        transport.push_json(201, json!({"message": "Message sent"}));
        transport.push_json(429, json!({}));

        let mut form = SendState::new(api);
        form.send("ab123", "hello", None).await;
        assert!(form.success);
        assert!(form.error.is_none());

        form.send("ab123", "again", None).await;
        assert!(!form.success);
        assert_eq!(form.error.as_deref(), Some(texts::RATE_LIMIT));

        form.reset();
        assert!(form.error.is_none());
        assert!(!form.success);
    }
}
