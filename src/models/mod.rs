pub mod comment;
pub mod feed;
pub mod paper;

pub use comment::*;
pub use feed::*;
pub use paper::*;
