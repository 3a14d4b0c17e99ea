//! Client-side Storage
//!
//! Local persistence for view state that outlives a session.

mod filter_store;
mod local_store;

pub use filter_store::{FeedFilterStore, FEED_FILTERS_KEY};
pub use local_store::LocalStore;
