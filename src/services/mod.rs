//! Service layer for the story client.
//!
//! This module contains:
//! - Story endpoint calls (`StoryApi`)
//! - User notifications (`Notifier`)

mod notifier;
mod stories;

pub use notifier::{LogNotifier, Notifier, RecordingNotifier, Toast, ToastLevel};
pub use stories::StoryApi;
