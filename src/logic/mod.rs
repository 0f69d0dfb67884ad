pub mod feed;

pub use feed::{FeedHandle, SharedState, apply_update, feed_task, handle_message, spawn_feed};
