use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::ApiClient;

const LOAD_FAILED: &str = "Could not load tags.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsState {
    pub tags: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for TagsState {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

pub struct TagsStore {
    state: Arc<watch::Sender<TagsState>>,
    loader: JoinHandle<()>,
}

impl TagsStore {
    pub fn spawn(client: ApiClient) -> Self {
        let (state, _) = watch::channel(TagsState::default());
        let state = Arc::new(state);

        let loader = tokio::spawn(load(client, Arc::clone(&state)));
        Self { state, loader }
    }

    pub fn subscribe(&self) -> watch::Receiver<TagsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TagsState {
        self.state.borrow().clone()
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for TagsStore {
    fn drop(&mut self) {
        self.loader.abort();
    }
}

async fn load(client: ApiClient, state: Arc<watch::Sender<TagsState>>) {
    let next = match client.fetch_all_tags().await {
        Ok(tags) => {
            tracing::debug!(count = tags.len(), "tags loaded");
            TagsState {
                tags,
                loading: false,
                error: None,
            }
        }
        Err(error) => {
            tracing::error!("Failed to load tags: {}", error);
            TagsState {
                tags: Vec::new(),
                loading: false,
                error: Some(LOAD_FAILED.to_string()),
            }
        }
    };
    state.send_replace(next);
}
