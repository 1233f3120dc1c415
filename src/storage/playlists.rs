//! Playlist directory: name-unique create, lookup with members, rename,
//! artwork update, delete.

use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    domain::{
        playlist::{Playlist, PlaylistPatch},
        track::Track,
    },
    storage::{
        Storage,
        catalog::track_from_row,
        error::{StorageError, is_constraint_violation},
        schema::{columns::*, tables::*},
    },
};

/// Member tracks of a playlist in observed order, i.e. the insertion order
/// of the join table rows.
pub(crate) fn member_tracks(
    conn: &Connection,
    playlist_id: i64,
) -> Result<Vec<Track>, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT t.{ID}, t.{TITLE}, t.{ARTIST}, t.{ALBUM}, t.{DURATION}, \
                t.{ARTWORK_URL}, t.{AUDIO_URL}, t.{LYRICS_LRC} \
         FROM {TRACKS} t \
         JOIN {PLAYLIST_TRACKS} pt ON pt.{TRACK_ID} = t.{ID} \
         WHERE pt.{PLAYLIST_ID} = ?1 \
         ORDER BY pt.rowid"
    ))?;

    stmt.query_map(params![playlist_id], track_from_row)?
        .collect()
}

/// Loads a playlist together with its member list, or None if the id does
/// not resolve.
pub(crate) fn load_playlist(
    conn: &Connection,
    id: i64,
) -> Result<Option<Playlist>, rusqlite::Error> {
    let head = conn
        .query_row(
            &format!("SELECT {ID}, {NAME}, {ARTWORK_URL} FROM {PLAYLISTS} WHERE {ID} = ?1"),
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    match head {
        None => Ok(None),
        Some((id, name, artwork_url)) => {
            let tracks = member_tracks(conn, id)?;
            Ok(Some(Playlist {
                id,
                name,
                artwork_url,
                tracks,
            }))
        }
    }
}

fn name_taken(
    conn: &Connection,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, rusqlite::Error> {
    let existing: Option<i64> = conn
        .query_row(
            &format!("SELECT {ID} FROM {PLAYLISTS} WHERE {NAME} = ?1"),
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    Ok(match (existing, exclude_id) {
        (Some(found), Some(excluded)) => found != excluded,
        (Some(_), None) => true,
        (None, _) => false,
    })
}

impl Storage {
    /// Creates an empty playlist. Names are unique, case-sensitive.
    pub fn create_playlist(
        &mut self,
        name: &str,
        artwork_url: Option<String>,
    ) -> Result<Playlist, StorageError> {
        let tx = self.db.transaction()?;

        if name_taken(&tx, name, None)? {
            return Err(StorageError::DuplicatePlaylistName(name.to_string()));
        }

        let inserted = tx.execute(
            &format!("INSERT INTO {PLAYLISTS} ({NAME}, {ARTWORK_URL}) VALUES (?1, ?2)"),
            params![name, artwork_url],
        );
        match inserted {
            Err(e) if is_constraint_violation(&e) => {
                return Err(StorageError::DuplicatePlaylistName(name.to_string()));
            }
            other => {
                other?;
            }
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Playlist {
            id,
            name: name.to_string(),
            artwork_url,
            tracks: Vec::new(),
        })
    }

    pub fn get_playlist(&mut self, id: i64) -> Result<Playlist, StorageError> {
        load_playlist(&self.db, id)?.ok_or(StorageError::PlaylistNotFound(id))
    }

    /// Reports the same conflict `create_playlist` would, without writing
    /// anything.
    pub fn check_playlist_name_available(&mut self, name: &str) -> Result<(), StorageError> {
        if name_taken(&self.db, name, None)? {
            return Err(StorageError::DuplicatePlaylistName(name.to_string()));
        }
        Ok(())
    }

    /// All playlists ordered by id, each with its member list resolved.
    pub fn list_playlists(&mut self) -> Result<Vec<Playlist>, StorageError> {
        let tx = self.db.transaction()?;

        let heads = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {ID}, {NAME}, {ARTWORK_URL} FROM {PLAYLISTS} ORDER BY {ID}"
            ))?;
            stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?
        };

        let mut playlists = Vec::with_capacity(heads.len());
        for (id, name, artwork_url) in heads {
            let tracks = member_tracks(&tx, id)?;
            playlists.push(Playlist {
                id,
                name,
                artwork_url,
                tracks,
            });
        }

        tx.commit()?;
        Ok(playlists)
    }

    /// Renames and/or restyles a playlist. Renaming to the name of a
    /// *different* playlist is a conflict; renaming to the current name is a
    /// no-op.
    pub fn update_playlist(
        &mut self,
        id: i64,
        patch: PlaylistPatch,
    ) -> Result<Playlist, StorageError> {
        let tx = self.db.transaction()?;

        let mut playlist = load_playlist(&tx, id)?.ok_or(StorageError::PlaylistNotFound(id))?;

        if let Some(name) = patch.name
            && name != playlist.name
        {
            if name_taken(&tx, &name, Some(id))? {
                return Err(StorageError::DuplicatePlaylistName(name));
            }
            playlist.name = name;
        }
        if let Some(artwork_url) = patch.artwork_url {
            playlist.artwork_url = artwork_url;
        }

        let updated = tx.execute(
            &format!("UPDATE {PLAYLISTS} SET {NAME} = ?1, {ARTWORK_URL} = ?2 WHERE {ID} = ?3"),
            params![playlist.name, playlist.artwork_url, id],
        );
        match updated {
            Err(e) if is_constraint_violation(&e) => {
                return Err(StorageError::DuplicatePlaylistName(playlist.name));
            }
            other => {
                other?;
            }
        }

        tx.commit()?;
        Ok(playlist)
    }

    /// Deletes a playlist and all its membership rows. Member tracks stay in
    /// the catalog.
    pub fn delete_playlist(&mut self, id: i64) -> Result<(), StorageError> {
        let tx = self.db.transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                &format!("SELECT {ID} FROM {PLAYLISTS} WHERE {ID} = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StorageError::PlaylistNotFound(id));
        }

        tx.execute(
            &format!("DELETE FROM {PLAYLIST_TRACKS} WHERE {PLAYLIST_ID} = ?1"),
            params![id],
        )?;
        tx.execute(
            &format!("DELETE FROM {PLAYLISTS} WHERE {ID} = ?1"),
            params![id],
        )?;

        tx.commit()?;
        Ok(())
    }
}
