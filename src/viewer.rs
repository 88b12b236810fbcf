use std::time::Duration;

use tracing::debug;

use crate::{
    store::StoriesStore,
    story::{Snapshot, Story, StoryId},
};

/// How long each story stays on screen before auto-advancing.
pub const VIEW_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Showing(StoryId),
    Closed,
}

/// Full-screen viewer over the stories listed when it was opened.
///
/// Every story the cursor lands on is marked viewed in the store.
pub struct StoryViewer {
    store: StoriesStore,
    stories: Snapshot,
    index: usize,
    closed: bool,
}

impl StoryViewer {
    pub fn open(store: &StoriesStore, index: usize) -> Option<Self> {
        let stories = store.list();
        if index >= stories.len() {
            return None;
        }
        let viewer = StoryViewer {
            store: store.clone(),
            stories,
            index,
            closed: false,
        };
        viewer.enter();
        Some(viewer)
    }

    pub fn current(&self) -> Option<&Story> {
        if self.closed {
            return None;
        }
        self.stories.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn next(&mut self) -> Step {
        if self.closed || self.index + 1 >= self.stories.len() {
            return self.close();
        }
        self.index += 1;
        self.enter()
    }

    pub fn prev(&mut self) -> Step {
        if self.closed || self.index == 0 {
            return self.close();
        }
        self.index -= 1;
        self.enter()
    }

    pub fn close(&mut self) -> Step {
        if !self.closed {
            debug!(index = self.index, "story viewer closed");
        }
        self.closed = true;
        Step::Closed
    }

    /// Shows each story for [`VIEW_DURATION`] until the end, returning the ids shown.
    pub async fn autoplay(mut self) -> Vec<StoryId> {
        let mut shown = Vec::new();
        while let Some(story) = self.current() {
            shown.push(story.id().clone());
            tokio::time::sleep(VIEW_DURATION).await;
            self.next();
        }
        shown
    }

    fn enter(&self) -> Step {
        let id = self.stories[self.index].id().clone();
        self.store.mark_viewed(id.as_str());
        Step::Showing(id)
    }
}
