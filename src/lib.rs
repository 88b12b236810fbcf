//! Ephemeral stories: posting, 24-hour expiry and per-story viewed state.

pub mod clock;
pub mod config;
pub mod demo;
pub mod draft;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod story;
mod sweeper;
pub mod viewer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use draft::{Author, StoryDraft};
pub use error::StoriesError;
pub use store::StoriesStore;
pub use story::{NewStory, Snapshot, Story, StoryId, Timestamp, STORY_TTL};
pub use viewer::{Step, StoryViewer};
