//! [`AlbumStore`] for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension as _};
use urna_core::{
  AlbumId, PersonId,
  album::{Album, AlbumDraft},
  store::AlbumStore,
};

use crate::{
  Result, SqliteStore,
  encode::{RawAlbum, read_photo},
  write::insert_parent,
};

fn photos_of(conn: &Connection, album_id: i64) -> rusqlite::Result<Vec<urna_core::album::Photo>> {
  let mut stmt = conn.prepare(
    "SELECT id, path, description, album_id FROM photos WHERE album_id = ?1 ORDER BY id",
  )?;
  stmt
    .query_map(rusqlite::params![album_id], read_photo)?
    .collect()
}

impl AlbumStore for SqliteStore {
  async fn save_album(&self, draft: AlbumDraft) -> Result<Option<AlbumId>> {
    let saved = self
      .atomically(move |tx| {
        let album_id = match draft.album_id {
          Some(id) => {
            let updated = tx.execute(
              "UPDATE albums SET title = ?2, description = ?3, owner_candidate_id = ?4
               WHERE id = ?1",
              rusqlite::params![id.0, draft.title, draft.description, draft.owner_id.0],
            )?;
            if updated == 0 {
              return Ok(None);
            }
            id.0
          }
          None => insert_parent(
            tx,
            "INSERT INTO albums (title, description, owner_candidate_id) VALUES (?1, ?2, ?3)",
            rusqlite::params![draft.title, draft.description, draft.owner_id.0],
          )?,
        };

        for photo in &draft.photos {
          tx.execute(
            "INSERT INTO photos (path, description, album_id) VALUES (?1, ?2, ?3)",
            rusqlite::params![photo.path, photo.description, album_id],
          )?;
        }

        Ok(Some(album_id))
      })
      .await?;

    Ok(saved.map(AlbumId))
  }

  async fn get_album(&self, id: AlbumId) -> Result<Option<Album>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let raw = conn
            .query_row(
              "SELECT id, title, description, owner_candidate_id FROM albums WHERE id = ?1",
              rusqlite::params![id.0],
              RawAlbum::read,
            )
            .optional()?;
          let Some(raw) = raw else {
            return Ok(None);
          };
          let photos = photos_of(conn, raw.id)?;
          Ok(Some(raw.with_photos(photos)))
        })
        .await?,
    )
  }

  async fn albums_for(&self, owner: PersonId) -> Result<Vec<Album>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let raws = {
            let mut stmt = conn.prepare(
              "SELECT id, title, description, owner_candidate_id FROM albums
               WHERE owner_candidate_id = ?1 ORDER BY id",
            )?;
            stmt
              .query_map(rusqlite::params![owner.0], RawAlbum::read)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };

          let mut albums = Vec::with_capacity(raws.len());
          for raw in raws {
            let photos = photos_of(conn, raw.id)?;
            albums.push(raw.with_photos(photos));
          }
          Ok(albums)
        })
        .await?,
    )
  }
}
