//! Infinite-scroll feed.
//!
//! - `infinite`: page accumulation state machine
//! - `header`: sort, field and tag controls
//! - `loader`: async driver over the query client

pub mod header;
mod infinite;
mod loader;

pub use infinite::{InfiniteFeed, PageTicket};
pub use loader::FeedLoader;
