use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use synaptic_core::SynapticError;
use tokio::sync::Mutex;

use crate::client::{MetalClient, MetalIndexPayload, MetalSearchPayload, MetalSearchResponse};

/// A call observed by [`FakeMetalClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetalCall {
    Search {
        payload: MetalSearchPayload,
        limit: usize,
    },
    Index(MetalIndexPayload),
    DeleteOne(String),
}

/// Test client that records every call and replays queued results.
///
/// Search responses are consumed in order; searching with nothing queued is
/// an error. Index and delete calls succeed unless a failure was registered.
pub struct FakeMetalClient {
    calls: Arc<Mutex<Vec<MetalCall>>>,
    search_responses: Arc<Mutex<VecDeque<Result<MetalSearchResponse, SynapticError>>>>,
    index_failures: Arc<Mutex<HashMap<String, SynapticError>>>,
    delete_failures: Arc<Mutex<VecDeque<SynapticError>>>,
}

impl FakeMetalClient {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            search_responses: Arc::new(Mutex::new(VecDeque::new())),
            index_failures: Arc::new(Mutex::new(HashMap::new())),
            delete_failures: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn push_search_response(&self, response: MetalSearchResponse) -> &Self {
        self.search_responses
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(Ok(response));
        self
    }

    pub fn push_search_error(&self, error: SynapticError) -> &Self {
        self.search_responses
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(Err(error));
        self
    }

    /// Make the next index call for `id` fail with `error`.
    pub fn fail_index_for(&self, id: impl Into<String>, error: SynapticError) -> &Self {
        self.index_failures
            .try_lock()
            .expect("not concurrent during setup")
            .insert(id.into(), error);
        self
    }

    /// Make the next delete call fail with `error`.
    pub fn push_delete_error(&self, error: SynapticError) -> &Self {
        self.delete_failures
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(error);
        self
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<MetalCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: MetalCall) {
        self.calls.lock().await.push(call);
    }
}

impl Default for FakeMetalClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetalClient for FakeMetalClient {
    async fn search(
        &self,
        payload: MetalSearchPayload,
        limit: usize,
    ) -> Result<MetalSearchResponse, SynapticError> {
        self.record(MetalCall::Search { payload, limit }).await;
        self.search_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| {
                Err(SynapticError::VectorStore(
                    "FakeMetalClient has no queued search response".to_string(),
                ))
            })
    }

    async fn index(&self, payload: MetalIndexPayload) -> Result<Value, SynapticError> {
        let id = payload.id.clone();
        self.record(MetalCall::Index(payload)).await;
        match self.index_failures.lock().await.remove(&id) {
            Some(error) => Err(error),
            None => Ok(json!({"id": id})),
        }
    }

    async fn delete_one(&self, id: &str) -> Result<Value, SynapticError> {
        self.record(MetalCall::DeleteOne(id.to_string())).await;
        match self.delete_failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(Value::Null),
        }
    }
}
