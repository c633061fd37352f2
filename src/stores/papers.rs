use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError, FetchPapersParams};
use crate::models::{ActiveFilter, FeedState, Paper, VoteDirection};
use crate::stores::FeedStore;

pub const PAGE_SIZE: u32 = 20;

const VOTE_FAILED: &str = "Your vote could not be saved.";

#[derive(Debug, Clone, Default)]
struct Cursor {
    offset: u32,
    // Bumped on every reset; pages from an older generation are dropped.
    generation: u64,
    filter: ActiveFilter,
}

#[derive(Debug, Clone)]
pub struct PapersState {
    pub papers: Vec<Paper>,
    pub loading: bool,
    pub has_more: bool,
    pub error: Option<String>,
    cursor: Cursor,
}

impl PapersState {
    fn fresh(cursor: Cursor) -> Self {
        Self {
            papers: Vec::new(),
            loading: false,
            has_more: true,
            error: None,
            cursor,
        }
    }

    pub fn filter(&self) -> &ActiveFilter {
        &self.cursor.filter
    }

    fn begin_page(&mut self) -> Option<PageRequest> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        self.error = None;

        Some(PageRequest {
            generation: self.cursor.generation,
            params: page_params(&self.cursor.filter, self.cursor.offset),
        })
    }
}

impl Default for PapersState {
    fn default() -> Self {
        Self::fresh(Cursor::default())
    }
}

#[derive(Debug, Clone)]
struct PageRequest {
    generation: u64,
    params: FetchPapersParams,
}

fn page_params(filter: &ActiveFilter, offset: u32) -> FetchPapersParams {
    let params = FetchPapersParams {
        limit: PAGE_SIZE,
        offset,
        ..FetchPapersParams::new(filter.source())
    };

    match filter {
        ActiveFilter::Arxiv(filters) => FetchPapersParams {
            tags: filters.tags.clone(),
            ..params
        },
        ActiveFilter::OpenReview(filters) => FetchPapersParams {
            tags: filters.tags.clone(),
            venue: filters.venue.clone(),
            year: filters.year,
            category: filters.category.clone(),
            ..params
        },
    }
}

#[derive(Debug)]
struct VoteRequest {
    paper_id: i64,
    direction: VoteDirection,
    generation: u64,
    snapshot: Option<Paper>,
}

struct Shared {
    client: ApiClient,
    state: watch::Sender<PapersState>,
}

impl Shared {
    fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(PapersState::default());
        Self { client, state }
    }

    fn restart(&self, filter: ActiveFilter) -> Option<PageRequest> {
        let mut request = None;
        self.state.send_modify(|state| {
            let cursor = Cursor {
                offset: 0,
                generation: state.cursor.generation + 1,
                filter,
            };
            *state = PapersState::fresh(cursor);
            request = state.begin_page();
        });
        request
    }

    fn spawn_restart(self: &Arc<Self>, filter: ActiveFilter) {
        if let Some(request) = self.restart(filter) {
            let shared = Arc::clone(self);
            tokio::spawn(async move { shared.fetch_page(request).await });
        }
    }

    fn begin_page(&self) -> Option<PageRequest> {
        let mut request = None;
        self.state.send_if_modified(|state| {
            request = state.begin_page();
            request.is_some()
        });
        request
    }

    async fn fetch_page(&self, request: PageRequest) {
        let result = self.client.fetch_papers(&request.params).await;
        self.finish_page(request, result);
    }

    fn finish_page(&self, request: PageRequest, result: Result<Vec<Paper>, ApiError>) {
        self.state.send_if_modified(|state| {
            if state.cursor.generation != request.generation {
                tracing::debug!(
                    stale = request.generation,
                    current = state.cursor.generation,
                    "discarding page for a superseded filter"
                );
                return false;
            }

            state.loading = false;
            match result {
                Ok(papers) => {
                    let count = papers.len() as u32;
                    state.has_more = count == request.params.limit;
                    state.cursor.offset += count;
                    state.papers.extend(papers);
                    state.error = None;
                    tracing::debug!(
                        source = %request.params.source,
                        count,
                        offset = state.cursor.offset,
                        has_more = state.has_more,
                        "papers page loaded"
                    );
                }
                Err(error) => {
                    tracing::error!(
                        source = %request.params.source,
                        offset = request.params.offset,
                        "Failed to load more papers: {}",
                        error
                    );
                    state.error = Some(error.to_string());
                }
            }
            true
        });
    }

    fn apply_vote(&self, paper_id: i64, direction: VoteDirection) -> VoteRequest {
        let mut snapshot = None;
        let mut generation = 0;
        self.state.send_if_modified(|state| {
            generation = state.cursor.generation;
            let Some(paper) = state.papers.iter_mut().find(|paper| paper.id == paper_id) else {
                return false;
            };
            snapshot = Some(paper.clone());
            match direction {
                VoteDirection::Up => paper.upvotes += 1,
                VoteDirection::Down => paper.downvotes += 1,
            }
            true
        });

        VoteRequest {
            paper_id,
            direction,
            generation,
            snapshot,
        }
    }

    fn rollback_vote(&self, request: VoteRequest) {
        let VoteRequest {
            paper_id,
            direction,
            generation,
            snapshot,
        } = request;
        let Some(original) = snapshot else {
            return;
        };

        // A reset while the vote was in flight makes the snapshot stale.
        let restored = self.state.send_if_modified(|state| {
            if state.cursor.generation != generation {
                return false;
            }
            let Some(paper) = state.papers.iter_mut().find(|paper| paper.id == paper_id) else {
                return false;
            };
            *paper = original;
            state.error = Some(VOTE_FAILED.to_string());
            true
        });

        if !restored {
            tracing::debug!(paper_id, direction = %direction, "vote rollback skipped, paper gone or list reset");
        }
    }
}

pub struct PapersStore {
    shared: Arc<Shared>,
    listener: JoinHandle<()>,
}

impl PapersStore {
    pub fn new(client: ApiClient, feed: &FeedStore) -> Self {
        let shared = Arc::new(Shared::new(client));

        let mut filters = feed.subscribe();
        let filter = filters.borrow_and_update().active_filter();
        shared.spawn_restart(filter.clone());

        let listener = tokio::spawn(follow_filters(Arc::clone(&shared), filters, filter));
        Self { shared, listener }
    }

    pub fn subscribe(&self) -> watch::Receiver<PapersState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> PapersState {
        self.shared.state.borrow().clone()
    }

    pub async fn load_more(&self) {
        if let Some(request) = self.shared.begin_page() {
            self.shared.fetch_page(request).await;
        }
    }

    pub async fn vote(&self, paper_id: i64, direction: VoteDirection) {
        let request = self.shared.apply_vote(paper_id, direction);

        if let Err(error) = self.shared.client.vote_on_paper(paper_id, direction).await {
            tracing::error!(paper_id, direction = %direction, "Vote failed: {}", error);
            self.shared.rollback_vote(request);
        }
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for PapersStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn follow_filters(
    shared: Arc<Shared>,
    mut filters: watch::Receiver<FeedState>,
    mut current: ActiveFilter,
) {
    while filters.changed().await.is_ok() {
        let next = filters.borrow_and_update().active_filter();
        if next == current {
            continue;
        }

        tracing::debug!(source = %next.source(), tags = ?next.tags(), "feed filter changed, reloading papers");
        current = next.clone();
        shared.spawn_restart(next);
    }
}
