//! Scripted transport for unit tests

use super::{ApiRequest, ApiTransport};
use crate::error::SdkError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Reply = std::result::Result<Value, SdkError>;

/// Replies per action are consumed in order; the last one repeats
#[derive(Default)]
pub(crate) struct StubTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn ok(&self, action: &str, response: Value) {
        self.push(action, Ok(response));
    }

    pub(crate) fn err(&self, action: &str, code: &str) {
        self.push(action, Err(SdkError::new(code, "stubbed failure", "stub-request")));
    }

    fn push(&self, action: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(action.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.action).collect()
    }

    pub(crate) fn count(&self, action: &str) -> usize {
        self.calls().iter().filter(|c| c.action == action).count()
    }

    pub(crate) fn last_payload(&self, action: &str) -> Option<Value> {
        self.calls()
            .into_iter()
            .rev()
            .find(|c| c.action == action)
            .map(|c| c.payload)
    }
}

#[async_trait]
impl ApiTransport for StubTransport {
    async fn send(&self, request: &ApiRequest) -> Reply {
        self.calls.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(&request.action) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(SdkError::new(
                "InvalidAction",
                format!("no stubbed reply for {}", request.action),
                "stub-request",
            )),
        }
    }
}
