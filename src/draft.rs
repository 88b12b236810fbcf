use crate::{
    store::StoriesStore,
    story::{NewStory, StoryId},
};

/// Stickers offered by the creation flow.
pub const STICKER_PALETTE: [&str; 16] = [
    "😀", "😂", "😍", "🎉", "🔥", "💯", "👍", "❤️", "😎", "🤔", "😢", "😡", "🤯", "🥳", "😴", "🤩",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Author {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// Input collected while composing a story.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryDraft {
    text: String,
    media: Option<String>,
    sticker: Option<String>,
}

impl StoryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_media(&mut self, media: Option<String>) {
        self.media = media;
    }

    /// Only one sticker can be selected; picking another replaces it.
    pub fn select_sticker(&mut self, sticker: impl Into<String>) {
        self.sticker = Some(sticker.into());
    }

    pub fn clear_sticker(&mut self) {
        self.sticker = None;
    }

    pub fn sticker(&self) -> Option<&str> {
        self.sticker.as_deref()
    }

    pub fn into_new_story(self, author: &Author) -> NewStory {
        NewStory {
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            avatar: author.avatar.clone(),
            media: self.media,
            text: (!self.text.is_empty()).then_some(self.text),
            stickers: self.sticker.into_iter().collect(),
        }
    }

    pub fn submit(self, store: &StoriesStore, author: &Author) -> Option<StoryId> {
        store.create(self.into_new_story(author))
    }
}
