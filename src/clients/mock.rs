use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::core::{AssistantPayload, ChatClient};
use crate::error::ClientError;

/// One scripted outcome of a mock request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Reply(String),
    Fail(ClientError),
}

/// Shared control surface of a `MockClient`: queue outcomes, inspect requests.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<AssistantPayload>>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.push(MockResponse::Reply(reply.into()));
    }

    pub fn push_failure(&self, error: ClientError) {
        self.push(MockResponse::Fail(error));
    }

    /// Payloads received so far, oldest first
    pub fn requests(&self) -> Vec<AssistantPayload> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn next(&self, payload: &AssistantPayload) -> Option<MockResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.clone());
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Mock chat client for tests. An empty queue behaves like a server that
/// answered with an empty reply.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (client, handle)
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn ask(&self, payload: &AssistantPayload) -> Result<String, ClientError> {
        match self.handle.next(payload) {
            Some(MockResponse::Reply(reply)) => Ok(reply),
            Some(MockResponse::Fail(error)) => Err(error),
            None => Err(ClientError::EmptyReply),
        }
    }

    fn clone_box(&self) -> Box<dyn ChatClient> {
        Box::new(self.clone())
    }
}
