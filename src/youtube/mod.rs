pub mod comments;
pub mod errors;
pub mod innertube;
pub mod types;

pub use comments::{CommentFetcher, FetchOutcome, Termination};
pub use errors::CommentFeedError;
pub use types::CommentRecord;
