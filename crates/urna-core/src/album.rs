//! Candidate photo albums. An album and the photos added with it are always
//! persisted as one unit.

use serde::{Deserialize, Serialize};

use crate::id::{AlbumId, PersonId, PhotoId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
  pub photo_id:    PhotoId,
  pub album_id:    AlbumId,
  /// Path relative to the media directory; no image data lives in the store.
  pub path:        String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
  pub album_id:    AlbumId,
  pub title:       String,
  pub description: Option<String>,
  /// The candidate owning the album.
  pub owner_id:    PersonId,
  pub photos:      Vec<Photo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
  pub path:        String,
  pub description: Option<String>,
}

/// Input to [`crate::store::AlbumStore::save_album`].
///
/// With `album_id: None` a new album is created; otherwise the existing row is
/// updated. In both cases `photos` are appended to the album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumDraft {
  pub album_id:    Option<AlbumId>,
  pub title:       String,
  pub description: Option<String>,
  pub owner_id:    PersonId,
  pub photos:      Vec<NewPhoto>,
}
