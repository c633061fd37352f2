pub mod comments;
pub mod feed;
pub mod papers;
pub mod tags;

pub use comments::{CommentsState, CommentsStore, PendingComment};
pub use feed::FeedStore;
pub use papers::{PAGE_SIZE, PapersState, PapersStore};
pub use tags::{TagsState, TagsStore};
