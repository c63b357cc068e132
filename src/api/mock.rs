//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::client::ApiClient;
use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::session::SessionStore;

pub(crate) const BASE_URL: &str = "http://api.test/api";

/// Replays queued responses in order and records every request.
///
/// Running out of scripted responses behaves like being offline.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, resp: Result<HttpResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub(crate) fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse {
            status,
            content_type: Some("application/json".into()),
            body: serde_json::to_vec(&body).unwrap(),
        }));
    }

    pub(crate) fn push_raw(&self, status: u16, content_type: Option<&str>, body: &[u8]) {
        self.push(Ok(HttpResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.to_vec(),
        }));
    }

    pub(crate) fn push_offline(&self) {
        self.push(Err(TransportError::Connect("dns error: no such host".into())));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Other("no scripted response".into())))
    }
}

/// Client over a fresh mock transport and in-memory session store.
pub(crate) fn mock_client() -> (ApiClient, Arc<MockTransport>, Arc<SessionStore>) {
    let transport = MockTransport::new();
    let session = Arc::new(SessionStore::in_memory());
    let client = ApiClient::with_transport(BASE_URL, transport.clone(), session.clone());
    (client, transport, session)
}

/// Parse a recorded request body as JSON.
pub(crate) fn body_json(req: &HttpRequest) -> Value {
    serde_json::from_slice(req.body.as_deref().unwrap()).unwrap()
}
