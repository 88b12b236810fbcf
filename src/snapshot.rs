use std::{collections::HashSet, fs, path::Path};

use crate::{
    error::StoriesError,
    store::StoriesStore,
    story::{Snapshot, Story},
};

/// Reads a JSON array of stories. Stored `expiresAt` values are ignored.
pub fn read_snapshot_file<P: AsRef<Path>>(path: P) -> Result<Vec<Story>, StoriesError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| StoriesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_snapshot(&data)
}

/// Loads a snapshot file into the store, keeping the saved ids. Returns how
/// many stories were added.
pub fn load_snapshot<P: AsRef<Path>>(store: &StoriesStore, path: P) -> Result<usize, StoriesError> {
    Ok(store.restore(read_snapshot_file(path)?))
}

pub fn write_snapshot_file<P: AsRef<Path>>(
    path: P,
    stories: &Snapshot,
) -> Result<(), StoriesError> {
    let path = path.as_ref();
    let data = serde_json::to_vec_pretty(&**stories)?;
    fs::write(path, data).map_err(|source| StoriesError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_snapshot(data: &[u8]) -> Result<Vec<Story>, StoriesError> {
    let stories: Vec<Story> = serde_json::from_slice(data)?;
    let mut seen = HashSet::new();
    for story in &stories {
        if !seen.insert(story.id().as_str()) {
            return Err(StoriesError::DuplicateId(story.id().to_string()));
        }
    }
    Ok(stories)
}
