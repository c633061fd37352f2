use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;

use crate::api::ApiClient;
use crate::models::{ANONYMOUS_AUTHOR, Comment};

const LOAD_FAILED: &str = "Could not load comments.";
const POST_FAILED: &str = "Failed to post comment. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentsState {
    pub paper_id: Option<i64>,
    pub comments: Vec<Comment>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for CommentsState {
    fn default() -> Self {
        Self {
            paper_id: None,
            comments: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingComment {
    pub paper_id: i64,
    pub placeholder_id: i64,
}

impl PendingComment {
    fn belongs_to(&self, state: &CommentsState) -> bool {
        state.paper_id.is_none_or(|shown| shown == self.paper_id)
    }
}

pub struct CommentsStore {
    client: ApiClient,
    state: watch::Sender<CommentsState>,
    loads: AtomicU64,
}

impl CommentsStore {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(CommentsState::default());
        Self {
            client,
            state,
            loads: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CommentsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CommentsState {
        self.state.borrow().clone()
    }

    pub async fn load(&self, paper_id: i64) {
        let ticket = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(CommentsState {
            paper_id: Some(paper_id),
            ..CommentsState::default()
        });

        let result = self.client.fetch_comments(paper_id).await;
        if self.loads.load(Ordering::SeqCst) != ticket {
            tracing::debug!(paper_id, "dropping superseded comments load");
            return;
        }

        let next = match result {
            Ok(comments) => CommentsState {
                paper_id: Some(paper_id),
                comments,
                loading: false,
                error: None,
            },
            Err(error) => {
                tracing::error!(paper_id, "Failed to load comments: {}", error);
                CommentsState {
                    paper_id: Some(paper_id),
                    comments: Vec::new(),
                    loading: false,
                    error: Some(LOAD_FAILED.to_string()),
                }
            }
        };
        self.state.send_replace(next);
    }

    pub async fn add(&self, paper_id: i64, body: &str) {
        let pending = self.insert_placeholder(paper_id, body);

        match self.client.post_comment(paper_id, body).await {
            Ok(saved) => self.confirm(&pending, saved),
            Err(error) => {
                tracing::error!(paper_id, "Failed to post comment: {}", error);
                self.discard(&pending);
            }
        }
    }

    fn insert_placeholder(&self, paper_id: i64, body: &str) -> PendingComment {
        let placeholder_id = -rand::rng().random_range(1..=i64::MAX);
        let placeholder = Comment {
            id: placeholder_id,
            body: body.to_string(),
            created_at: Utc::now(),
            author_name: ANONYMOUS_AUTHOR.to_string(),
        };

        self.state.send_modify(|state| {
            state.comments.insert(0, placeholder);
            state.error = None;
        });

        PendingComment {
            paper_id,
            placeholder_id,
        }
    }

    fn confirm(&self, pending: &PendingComment, saved: Comment) {
        self.state.send_if_modified(|state| {
            if !pending.belongs_to(state) {
                return false;
            }
            match state
                .comments
                .iter_mut()
                .find(|comment| comment.id == pending.placeholder_id)
            {
                Some(slot) => {
                    *slot = saved;
                    true
                }
                None => false,
            }
        });
    }

    fn discard(&self, pending: &PendingComment) {
        self.state.send_if_modified(|state| {
            // Another paper's comments replaced the list; its error slot is not ours.
            if !pending.belongs_to(state) {
                return false;
            }
            state
                .comments
                .retain(|comment| comment.id != pending.placeholder_id);
            state.error = Some(POST_FAILED.to_string());
            true
        });
    }
}
