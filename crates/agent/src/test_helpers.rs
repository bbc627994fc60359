//! Scripted providers for orchestrator tests.

use tensive_core::error::ProviderError;
use tensive_core::message::{Message, MessageToolCall};
use tensive_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Returns queued responses in order and records every request.
///
/// Panics if called more times than responses were queued.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        assert!(!responses.is_empty(), "ScriptedProvider: no more responses");
        Ok(responses.remove(0))
    }
}

/// Holds its first call open until [`GatedProvider::release`], then answers
/// each call with `reply <n>`.
pub struct GatedProvider {
    gate: Notify,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self {
            gate: Notify::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for GatedProvider {
    fn name(&self) -> &str {
        "gated"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        if n == 1 {
            self.gate.notified().await;
        }
        Ok(text_reply(&format!("reply {n}")))
    }
}

/// Always fails as if the network were down.
pub struct FailingProvider;

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

pub fn text_reply(text: &str) -> ProviderResponse {
    reply(Message::assistant(text))
}

/// A reply carrying `content` and one tool call per `(name, arguments)`.
pub fn tool_reply(content: &str, calls: &[(&str, &str)]) -> ProviderResponse {
    let mut message = Message::assistant(content);
    message.tool_calls = calls
        .iter()
        .enumerate()
        .map(|(i, (name, arguments))| MessageToolCall {
            id: format!("call_{i}"),
            name: name.to_string(),
            arguments: arguments.to_string(),
        })
        .collect();
    reply(message)
}

fn reply(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "scripted-model".into(),
    }
}
