use std::{
    collections::HashSet,
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::Config,
    story::{NewStory, Snapshot, Story, StoryId},
    sweeper::spawn_sweeper,
};

/// Session-scoped owner of the story collection.
///
/// Cloning gives another handle to the same collection. Every change replaces
/// the whole [`Snapshot`], so readers never see a partial update. Stories are
/// removed only by the background sweep, which stops when [`shutdown`] is
/// called or the last handle is dropped.
///
/// Must be constructed inside a Tokio runtime.
///
/// [`shutdown`]: StoriesStore::shutdown
#[derive(Clone)]
pub struct StoriesStore {
    inner: Arc<Inner>,
}

struct Inner {
    stories: watch::Sender<Snapshot>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl StoriesStore {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config.sweep_interval, Arc::new(SystemClock))
    }

    pub fn with_clock(sweep_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        let (stories, _) = watch::channel(Snapshot::from(Vec::new()));
        let inner = Arc::new(Inner {
            stories,
            clock,
            cancel: CancellationToken::new(),
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        spawn_sweeper(sweep_interval, inner.cancel.clone(), move || {
            weak.upgrade().map(|inner| inner.sweep())
        });
        debug!(?sweep_interval, "stories store started");

        StoriesStore { inner }
    }

    /// Current stories, oldest first. Expired stories stay visible until the next sweep.
    pub fn list(&self) -> Snapshot {
        self.ensure_open("list");
        self.inner.stories.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.ensure_open("is_empty");
        self.inner.stories.borrow().is_empty()
    }

    /// Posts a story and returns its id. Empty content is accepted.
    pub fn create(&self, new: NewStory) -> Option<StoryId> {
        if !self.ensure_open("create") {
            return None;
        }
        let now = self.inner.clock.now_millis();
        let mut id = StoryId::generate();
        self.inner.stories.send_modify(|stories| {
            while stories.iter().any(|s| s.id() == &id) {
                id = StoryId::generate();
            }
            let mut next = Vec::with_capacity(stories.len() + 1);
            next.extend(stories.iter().cloned());
            next.push(Story::from_new(id.clone(), new, now));
            *stories = next.into();
        });
        debug!(%id, created_at = now, "story created");
        Some(id)
    }

    /// Marks a story as seen. Unknown ids and already-viewed stories are left alone.
    pub fn mark_viewed(&self, id: &str) {
        if !self.ensure_open("mark_viewed") {
            return;
        }
        let changed = self.inner.stories.send_if_modified(|stories| {
            let Some(pos) = stories.iter().position(|s| s.id().as_str() == id) else {
                return false;
            };
            if stories[pos].viewed() {
                return false;
            }
            let mut next = stories.to_vec();
            next[pos].mark_viewed();
            *stories = next.into();
            true
        });
        if changed {
            debug!(id, "story viewed");
        }
    }

    /// Inserts previously posted stories as they are, keeping their ids,
    /// timestamps and viewed flags. Ids already held are skipped. Returns how
    /// many were inserted. Only snapshot loading and demo seeding use this;
    /// callers outside the crate go through `create`.
    pub(crate) fn restore(&self, restored: impl IntoIterator<Item = Story>) -> usize {
        if !self.ensure_open("restore") {
            return 0;
        }
        let mut inserted = 0;
        self.inner.stories.send_if_modified(|stories| {
            let mut seen: HashSet<StoryId> = stories.iter().map(|s| s.id().clone()).collect();
            let mut next = stories.to_vec();
            for story in restored {
                if seen.insert(story.id().clone()) {
                    next.push(story);
                } else {
                    warn!(id = %story.id(), "skipping duplicate story");
                }
            }
            inserted = next.len() - stories.len();
            if inserted == 0 {
                return false;
            }
            *stories = next.into();
            true
        });
        inserted
    }

    /// Receiver that wakes on every change to the collection.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.ensure_open("subscribe");
        self.inner.stories.subscribe()
    }

    /// Stops the sweeper. The store must not be used afterwards.
    pub fn shutdown(&self) {
        if !self.inner.cancel.is_cancelled() {
            info!("stories store shutting down");
            self.inner.cancel.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    fn ensure_open(&self, op: &'static str) -> bool {
        if self.is_closed() {
            debug_assert!(false, "{op} called on a stories store that was shut down");
            warn!(op, "ignoring call on a stories store that was shut down");
            return false;
        }
        true
    }
}

impl Inner {
    fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let mut removed = 0;
        self.stories.send_if_modified(|stories| {
            if !stories.iter().any(|s| s.is_expired(now)) {
                return false;
            }
            let next: Vec<Story> = stories
                .iter()
                .filter(|s| !s.is_expired(now))
                .cloned()
                .collect();
            removed = stories.len() - next.len();
            *stories = next.into();
            true
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::StoriesStore;
    use crate::{
        clock::ManualClock,
        story::{NewStory, Story, StoryId},
    };

    const DAY: u64 = 86_400_000;
    const SWEEP: Duration = Duration::from_millis(60_000);

    fn store_at(start: u64) -> (StoriesStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        (StoriesStore::with_clock(SWEEP, clock.clone()), clock)
    }

    fn text(t: &str) -> NewStory {
        NewStory::new("u1", "Jane Smith", "avatar.jpg").with_text(t)
    }

    fn ids(store: &StoriesStore) -> Vec<StoryId> {
        store.list().iter().map(|s| s.id().clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn create_appends_one_unviewed_story() {
        let (store, _) = store_at(1_000);
        let before = store.list().len();
        let id = store.create(text("hello")).unwrap();

        let stories = store.list();
        assert_eq!(stories.len(), before + 1);
        let story = stories.last().unwrap();
        assert_eq!(story.id(), &id);
        assert!(!story.viewed());
        assert_eq!(story.created_at(), 1_000);
        assert_eq!(story.expires_at() - story.created_at(), DAY);
    }

    #[tokio::test(start_paused = true)]
    async fn create_accepts_empty_content() {
        let (store, _) = store_at(0);
        store.create(NewStory::new("u1", "Jane", "a")).unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn list_keeps_insertion_order() {
        let (store, clock) = store_at(0);
        let a = store.create(text("a")).unwrap();
        clock.advance(10);
        let b = store.create(text("b")).unwrap();
        clock.advance(10);
        let c = store.create(text("c")).unwrap();
        store.mark_viewed(b.as_str());
        assert_eq!(ids(&store), vec![a, b, c]);
    }

    #[tokio::test(start_paused = true)]
    async fn mark_viewed_is_idempotent() {
        let (store, _) = store_at(0);
        let id = store.create(text("hello")).unwrap();
        store.mark_viewed(id.as_str());
        store.mark_viewed(id.as_str());
        assert!(store.list()[0].viewed());
    }

    #[tokio::test(start_paused = true)]
    async fn mark_viewed_unknown_id_changes_nothing() {
        let (store, _) = store_at(0);
        store.create(text("hello")).unwrap();
        let before = store.list();
        let mut rx = store.subscribe();
        store.mark_viewed("nonexistent");
        assert_eq!(store.list(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_are_not_affected_by_later_changes() {
        let (store, _) = store_at(0);
        let id = store.create(text("hello")).unwrap();
        let snapshot = store.list();
        store.mark_viewed(id.as_str());
        assert!(!snapshot[0].viewed());
        assert!(store.list()[0].viewed());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_expired() {
        let (store, clock) = store_at(0);
        let old = store.create(text("old")).unwrap();
        clock.set(DAY / 2);
        let young = store.create(text("young")).unwrap();

        clock.set(DAY);
        assert_eq!(store.inner.sweep(), 1);
        assert_eq!(ids(&store), vec![young.clone()]);
        assert!(!ids(&store).contains(&old));

        assert_eq!(store.inner.sweep(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_viewed_and_unviewed_alike() {
        let (store, clock) = store_at(0);
        let a = store.create(text("a")).unwrap();
        store.create(text("b")).unwrap();
        store.mark_viewed(a.as_str());
        clock.set(DAY);
        assert_eq!(store.inner.sweep(), 2);
        assert!(store.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_story_stays_listed_until_the_sweep() {
        let (store, clock) = store_at(0);
        store.create(text("hello")).unwrap();
        clock.set(DAY + 1);
        assert_eq!(store.list().len(), 1);

        let mut rx = store.subscribe();
        rx.changed().await.unwrap();
        assert!(store.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn story_lifecycle() {
        let (store, clock) = store_at(0);
        let a = store.create(text("hello")).unwrap();

        let stories = store.list();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].text(), Some("hello"));
        assert!(!stories[0].viewed());

        store.mark_viewed(a.as_str());
        let stories = store.list();
        assert_eq!(ids(&store), vec![a]);
        assert!(stories[0].viewed());

        clock.set(DAY + 1);
        let mut rx = store.subscribe();
        rx.changed().await.unwrap();
        assert!(store.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn restore_keeps_fields_and_skips_duplicates() {
        let (store, _) = store_at(500);
        let existing = store.create(text("mine")).unwrap();

        let json = format!(
            r#"[{{"id":"{existing}","userId":"u","userName":"n","avatar":"a","createdAt":1}},
                {{"id":"r1","userId":"u","userName":"n","avatar":"a","createdAt":2,"viewed":true}},
                {{"id":"r1","userId":"u","userName":"n","avatar":"a","createdAt":3}}]"#
        );
        let restored: Vec<Story> = serde_json::from_str(&json).unwrap();
        assert_eq!(store.restore(restored), 1);

        let stories = store.list();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[1].id().as_str(), "r1");
        assert_eq!(stories[1].created_at(), 2);
        assert!(stories[1].viewed());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_last_handle_cancels_the_sweeper() {
        let (store, _) = store_at(0);
        let cancel = store.inner.cancel.clone();
        let other = store.clone();
        drop(store);
        assert!(!cancel.is_cancelled());
        drop(other);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_the_store() {
        let (store, _) = store_at(0);
        assert!(!store.is_closed());
        store.shutdown();
        store.shutdown();
        assert!(store.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn far_future_story_does_not_stop_the_sweep() {
        let (store, clock) = store_at(0);
        let far: Vec<Story> = serde_json::from_str(&format!(
            r#"[{{"id":"far","userId":"u","userName":"n","avatar":"a","createdAt":{}}}]"#,
            u64::MAX - 10
        ))
        .unwrap();
        assert_eq!(store.restore(far), 1);
        let normal = store.create(text("hello")).unwrap();

        clock.set(DAY + 1);
        tokio::time::sleep(SWEEP * 3).await;

        let remaining = ids(&store);
        assert_eq!(remaining, vec![StoryId::from("far")]);
        assert!(!remaining.contains(&normal));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_swept_after_shutdown() {
        let (store, clock) = store_at(0);
        store.create(text("hello")).unwrap();
        let rx = store.subscribe();

        store.shutdown();
        clock.set(DAY + 1);
        tokio::time::sleep(SWEEP * 3).await;

        assert!(!rx.has_changed().unwrap());
        assert_eq!(rx.borrow().len(), 1);
    }

    #[cfg(debug_assertions)]
    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "shut down")]
    async fn subscribe_after_shutdown_is_fatal_in_debug() {
        let (store, _) = store_at(0);
        store.shutdown();
        let _rx = store.subscribe();
    }

    #[cfg(debug_assertions)]
    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "shut down")]
    async fn use_after_shutdown_is_fatal_in_debug() {
        let (store, _) = store_at(0);
        store.shutdown();
        store.create(text("too late"));
    }
}
