use std::{fmt, sync::Arc, time::Duration};

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// How long a story stays up after it is posted.
pub const STORY_TTL: Duration = Duration::from_millis(24 * 60 * 60 * 1000);

/// Immutable view of the held stories, oldest first.
pub type Snapshot = Arc<[Story]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    pub(crate) fn generate() -> Self {
        StoryId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoryId {
    fn from(id: &str) -> Self {
        StoryId(id.to_string())
    }
}

impl From<String> for StoryId {
    fn from(id: String) -> Self {
        StoryId(id)
    }
}

impl AsRef<str> for StoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied part of a story. The store fills in the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStory {
    pub user_id: String,
    pub user_name: String,
    pub avatar: String,
    pub media: Option<String>,
    pub text: Option<String>,
    pub stickers: Vec<String>,
}

impl NewStory {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        NewStory {
            user_id: user_id.into(),
            user_name: user_name.into(),
            avatar: avatar.into(),
            ..Default::default()
        }
    }

    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_sticker(mut self, sticker: impl Into<String>) -> Self {
        self.stickers.push(sticker.into());
        self
    }

    /// Whether a viewer would see anything. The store does not check this.
    pub fn has_content(&self) -> bool {
        self.media.is_some() || self.text.is_some() || !self.stickers.is_empty()
    }
}

/// A posted story.
///
/// `expires_at` is not stored: it is always `created_at + STORY_TTL`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    id: StoryId,
    user_id: String,
    user_name: String,
    avatar: String,
    #[serde(default)]
    media: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    stickers: Vec<String>,
    created_at: Timestamp,
    #[serde(default)]
    viewed: bool,
}

impl Story {
    pub(crate) fn from_new(id: StoryId, new: NewStory, created_at: Timestamp) -> Self {
        Story {
            id,
            user_id: new.user_id,
            user_name: new.user_name,
            avatar: new.avatar,
            media: new.media,
            text: new.text,
            stickers: new.stickers,
            created_at,
            viewed: false,
        }
    }

    pub fn id(&self) -> &StoryId {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn stickers(&self) -> &[String] {
        &self.stickers
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Saturates for timestamps within a day of `u64::MAX`.
    pub fn expires_at(&self) -> Timestamp {
        self.created_at
            .saturating_add(STORY_TTL.as_millis() as Timestamp)
    }

    pub fn viewed(&self) -> bool {
        self.viewed
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at() <= now
    }

    /// Returns `true` if this call flipped the flag.
    pub(crate) fn mark_viewed(&mut self) -> bool {
        !std::mem::replace(&mut self.viewed, true)
    }
}

impl Serialize for Story {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Story", 10)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("userId", &self.user_id)?;
        s.serialize_field("userName", &self.user_name)?;
        s.serialize_field("avatar", &self.avatar)?;
        s.serialize_field("media", &self.media)?;
        s.serialize_field("text", &self.text)?;
        s.serialize_field("stickers", &self.stickers)?;
        s.serialize_field("createdAt", &self.created_at)?;
        s.serialize_field("expiresAt", &self.expires_at())?;
        s.serialize_field("viewed", &self.viewed)?;
        s.end()
    }
}
