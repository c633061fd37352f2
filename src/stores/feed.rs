use tokio::sync::watch;

use crate::models::{ActiveFilter, FeedState, Source};

#[derive(Debug)]
pub struct FeedStore {
    state: watch::Sender<FeedState>,
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedStore {
    pub fn new() -> Self {
        Self::with_state(FeedState::default())
    }

    pub fn with_state(initial: FeedState) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn active_filter(&self) -> ActiveFilter {
        self.state.borrow().active_filter()
    }

    pub fn set_source(&self, source: Source) {
        self.state.send_if_modified(|state| {
            if state.active_source == source {
                return false;
            }
            state.active_source = source;
            true
        });
    }

    pub fn add_tag(&self, tag: &str) {
        self.state.send_if_modified(|state| {
            let tags = state.active_tags_mut();
            if tag.is_empty() || tags.iter().any(|existing| existing == tag) {
                return false;
            }
            tags.push(tag.to_string());
            true
        });
    }

    pub fn remove_tag(&self, tag: &str) {
        self.state.send_if_modified(|state| {
            let tags = state.active_tags_mut();
            let before = tags.len();
            tags.retain(|existing| existing != tag);
            tags.len() != before
        });
    }

    pub fn set_venue(&self, venue: Option<String>) {
        self.state.send_if_modified(|state| replace(&mut state.openreview.venue, venue));
    }

    pub fn set_year(&self, year: Option<i32>) {
        self.state.send_if_modified(|state| replace(&mut state.openreview.year, year));
    }

    pub fn set_category(&self, category: Option<String>) {
        self.state
            .send_if_modified(|state| replace(&mut state.openreview.category, category));
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
