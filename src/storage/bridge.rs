//! Async request/response access to a store.
//!
//! UI-facing code never touches a backend directly: it sends a request to a
//! dedicated storage thread and awaits the reply. Requests are served one at a
//! time in arrival order.

use std::thread;

use tokio::sync::{mpsc, oneshot};

use super::SharedStore;
use crate::types::errors::StoreError;

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

enum StoreRequest {
    Get { key: String, reply: Reply<Option<String>> },
    Set { key: String, value: String, reply: Reply<()> },
    Remove { key: String, reply: Reply<()> },
    ListKeys { reply: Reply<Vec<String>> },
}

/// Cloneable handle to the storage worker. The worker exits once every
/// handle has been dropped.
#[derive(Clone)]
pub struct StoreBridge {
    tx: mpsc::UnboundedSender<StoreRequest>,
}

impl StoreBridge {
    /// Starts the storage worker thread for `store`.
    pub fn spawn(store: SharedStore) -> Result<Self, StoreError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<StoreRequest>();
        thread::Builder::new()
            .name("tabshell-store".into())
            .spawn(move || {
                while let Some(request) = rx.blocking_recv() {
                    match request {
                        StoreRequest::Get { key, reply } => {
                            let _ = reply.send(store.get(&key));
                        }
                        StoreRequest::Set { key, value, reply } => {
                            let _ = reply.send(store.set(&key, &value));
                        }
                        StoreRequest::Remove { key, reply } => {
                            let _ = reply.send(store.remove(&key));
                        }
                        StoreRequest::ListKeys { reply } => {
                            let _ = reply.send(store.list_keys());
                        }
                    }
                }
                tracing::debug!("store worker stopped");
            })?;
        Ok(Self { tx })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.request(|reply| StoreRequest::Get { key, reply }).await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.request(|reply| StoreRequest::Set { key, value, reply })
            .await
    }

    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.request(|reply| StoreRequest::Remove { key, reply }).await
    }

    pub async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        self.request(|reply| StoreRequest::ListKeys { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| StoreError::Unavailable("store worker stopped".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::Unavailable("store worker dropped the request".to_string()))?
    }
}
