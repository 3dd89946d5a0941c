// Scripted provider
//
// In-process LlmProvider that replays queued replies instead of calling a
// vendor. Counts calls and keeps every request, so tests can assert on
// exactly what was (or was not) sent.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::types::{CompletionRequest, ProviderError, RawCompletion, TokenUsage};
use super::LlmProvider;
use crate::config::{ProviderConfig, ProviderKind};

type Responder = Box<dyn Fn(&CompletionRequest) -> String + Send + Sync>;

pub struct ScriptedProvider {
    config: ProviderConfig,
    queue: Mutex<VecDeque<Result<String, ProviderError>>>,
    failures: Mutex<HashMap<usize, ProviderError>>,
    responder: Option<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            config: ProviderConfig::with_defaults(kind, "scripted"),
            queue: Mutex::new(VecDeque::new()),
            failures: Mutex::new(HashMap::new()),
            responder: None,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        lock(&self.queue).push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: ProviderError) -> Self {
        lock(&self.queue).push_back(Err(error));
        self
    }

    /// Fail the n-th call (1-based) regardless of the queue.
    pub fn fail_on(self, call: usize, error: ProviderError) -> Self {
        lock(&self.failures).insert(call, error);
        self
    }

    /// Build replies from the request once the queue is drained.
    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> String + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Reply with the same text for every call once the queue is drained.
    pub fn always(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.respond_with(move |_| text.clone())
    }

    /// Sleep before answering (pair with a paused tokio clock).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.requests).last().cloned()
    }

    fn next_reply(&self, call: usize, request: &CompletionRequest) -> Result<String, ProviderError> {
        if let Some(error) = lock(&self.failures).remove(&call) {
            return Err(error);
        }
        if let Some(queued) = lock(&self.queue).pop_front() {
            return queued;
        }
        match &self.responder {
            Some(responder) => Ok(responder(request)),
            None => Err(ProviderError::EmptyResponse),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.requests).push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let text = self.next_reply(call, request)?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        // Rough 4-chars-per-token estimate
        let usage = TokenUsage {
            input_tokens: (request.prompt.chars().count() / 4) as u32,
            output_tokens: (text.chars().count() / 4) as u32,
        };

        Ok(RawCompletion {
            provider: self.config.kind,
            model: self.config.model.clone(),
            text,
            usage,
            cost: self
                .config
                .estimate_cost(usage.input_tokens, usage.output_tokens),
        })
    }

    fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
