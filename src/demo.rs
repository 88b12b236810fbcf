use tracing::info;

use crate::{
    store::StoriesStore,
    story::{NewStory, Story, StoryId},
};

const DEMO_STORIES: [(&str, &str, &str, &str, &str, [&str; 2]); 4] = [
    (
        "demo1",
        "demo-user1",
        "Jane Smith",
        "assets/images/profile-pictures/image-02.webp",
        "Welcome to NetworkPro Stories! This is a demo story. 🎉",
        ["🎉", "🔥"],
    ),
    (
        "demo2",
        "demo-user2",
        "John Doe",
        "assets/images/profile-pictures/image-01.jpg",
        "Check out my latest project update!",
        ["💻", "🚀"],
    ),
    (
        "demo3",
        "demo-user3",
        "Emma Davis",
        "assets/images/profile-pictures/image-06.webp",
        "Enjoying a sunny day at the park! ☀️",
        ["☀️", "🌳"],
    ),
    (
        "demo4",
        "demo-user4",
        "Alex Brown",
        "assets/images/profile-pictures/image-05.avif",
        "Networking with amazing people!",
        ["🤝", "🌐"],
    ),
];

/// Fills an empty store with the sample stories. Returns how many were added.
pub fn seed_demo(store: &StoriesStore, now: u64) -> usize {
    if !store.is_empty() {
        return 0;
    }
    let stories = DEMO_STORIES
        .iter()
        .map(|(id, user_id, user_name, avatar, text, stickers)| {
            let mut new = NewStory::new(*user_id, *user_name, *avatar).with_text(*text);
            for sticker in stickers {
                new = new.with_sticker(*sticker);
            }
            Story::from_new(StoryId::from(*id), new, now)
        });
    let count = store.restore(stories);
    info!(count, "seeded demo stories");
    count
}
