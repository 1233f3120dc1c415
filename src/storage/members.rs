//! Association manager: the many-to-many membership between playlists and
//! tracks. Depends on the catalog and the playlist directory for existence
//! checks, never on their storage.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    domain::{playlist::Playlist, track::Track},
    storage::{
        Storage,
        error::{StorageError, is_constraint_violation},
        playlists::load_playlist,
        schema::{columns::*, tables::*},
    },
};

fn playlist_exists(conn: &Connection, id: i64) -> Result<bool, rusqlite::Error> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT {ID} FROM {PLAYLISTS} WHERE {ID} = ?1"),
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn track_exists(conn: &Connection, id: i64) -> Result<bool, rusqlite::Error> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT {ID} FROM {TRACKS} WHERE {ID} = ?1"),
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn is_member(conn: &Connection, playlist_id: i64, track_id: i64) -> Result<bool, rusqlite::Error> {
    let found: Option<i64> = conn
        .query_row(
            &format!(
                "SELECT rowid FROM {PLAYLIST_TRACKS} \
                 WHERE {PLAYLIST_ID} = ?1 AND {TRACK_ID} = ?2"
            ),
            params![playlist_id, track_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

impl Storage {
    /// Appends a track to the end of a playlist's member list.
    pub fn add_track_to_playlist(
        &mut self,
        playlist_id: i64,
        track_id: i64,
    ) -> Result<Playlist, StorageError> {
        let tx = self.db.transaction()?;

        if !playlist_exists(&tx, playlist_id)? {
            return Err(StorageError::PlaylistNotFound(playlist_id));
        }
        if !track_exists(&tx, track_id)? {
            return Err(StorageError::TrackNotFound(track_id));
        }
        if is_member(&tx, playlist_id, track_id)? {
            return Err(StorageError::DuplicateMember {
                playlist: playlist_id,
                track: track_id,
            });
        }

        let inserted = tx.execute(
            &format!(
                "INSERT INTO {PLAYLIST_TRACKS} ({PLAYLIST_ID}, {TRACK_ID}) VALUES (?1, ?2)"
            ),
            params![playlist_id, track_id],
        );
        match inserted {
            Err(e) if is_constraint_violation(&e) => {
                return Err(StorageError::DuplicateMember {
                    playlist: playlist_id,
                    track: track_id,
                });
            }
            other => {
                other?;
            }
        }

        let playlist = load_playlist(&tx, playlist_id)?
            .ok_or(StorageError::PlaylistNotFound(playlist_id))?;
        tx.commit()?;
        Ok(playlist)
    }

    /// Removes a single membership row.
    pub fn remove_track_from_playlist(
        &mut self,
        playlist_id: i64,
        track_id: i64,
    ) -> Result<(), StorageError> {
        let tx = self.db.transaction()?;

        if !playlist_exists(&tx, playlist_id)? {
            return Err(StorageError::PlaylistNotFound(playlist_id));
        }
        if !track_exists(&tx, track_id)? {
            return Err(StorageError::TrackNotFound(track_id));
        }

        let deleted = tx.execute(
            &format!(
                "DELETE FROM {PLAYLIST_TRACKS} WHERE {PLAYLIST_ID} = ?1 AND {TRACK_ID} = ?2"
            ),
            params![playlist_id, track_id],
        )?;
        if deleted == 0 {
            return Err(StorageError::NotAMember {
                playlist: playlist_id,
                track: track_id,
            });
        }

        tx.commit()?;
        Ok(())
    }

    /// Replaces a playlist's entire membership with the given track ids, in
    /// that order.
    ///
    /// Ids that are not current members are silently dropped, duplicates
    /// collapse to their first appearance, and current members omitted from
    /// the input are removed from the playlist. Callers asking for a pure
    /// reorder must therefore pass the complete member set.
    pub fn reorder_playlist(
        &mut self,
        playlist_id: i64,
        track_ids: &[i64],
    ) -> Result<Playlist, StorageError> {
        let tx = self.db.transaction()?;

        let Playlist {
            id,
            name,
            artwork_url,
            tracks,
        } = load_playlist(&tx, playlist_id)?
            .ok_or(StorageError::PlaylistNotFound(playlist_id))?;

        let mut current: HashMap<i64, Track> =
            tracks.into_iter().map(|t| (t.id, t)).collect();

        // remove() keeps only current members and collapses duplicate input
        // ids to their first appearance
        let kept: Vec<Track> = track_ids
            .iter()
            .filter_map(|id| current.remove(id))
            .collect();

        tx.execute(
            &format!("DELETE FROM {PLAYLIST_TRACKS} WHERE {PLAYLIST_ID} = ?1"),
            params![playlist_id],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {PLAYLIST_TRACKS} ({PLAYLIST_ID}, {TRACK_ID}) VALUES (?1, ?2)"
            ))?;
            for track in &kept {
                stmt.execute(params![playlist_id, track.id])?;
            }
        }

        tx.commit()?;
        Ok(Playlist {
            id,
            name,
            artwork_url,
            tracks: kept,
        })
    }
}
