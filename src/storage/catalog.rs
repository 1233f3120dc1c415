//! Track catalog: create, point lookup, partial update, paginated listing.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{
    domain::track::{NewTrack, Track, TrackPage, TrackPatch},
    storage::{
        Storage,
        error::{StorageError, is_constraint_violation},
        schema::{columns::*, tables::*},
    },
};

pub(crate) fn track_columns() -> String {
    format!("{ID}, {TITLE}, {ARTIST}, {ALBUM}, {DURATION}, {ARTWORK_URL}, {AUDIO_URL}, {LYRICS_LRC}")
}

/// Maps a row selected with [`track_columns`] in that column order.
pub(crate) fn track_from_row(row: &Row) -> Result<Track, rusqlite::Error> {
    Ok(Track {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        album: row.get(3)?,
        duration: row.get(4)?,
        artwork_url: row.get(5)?,
        audio_url: row.get(6)?,
        lyrics_lrc: row.get(7)?,
    })
}

pub(crate) fn track_by_id(conn: &Connection, id: i64) -> Result<Option<Track>, rusqlite::Error> {
    conn.query_row(
        &format!(
            "SELECT {} FROM {TRACKS} WHERE {ID} = ?1",
            track_columns()
        ),
        params![id],
        track_from_row,
    )
    .optional()
}

fn audio_url_taken(
    conn: &Connection,
    audio_url: &str,
    exclude_id: Option<i64>,
) -> Result<bool, rusqlite::Error> {
    let existing: Option<i64> = conn
        .query_row(
            &format!("SELECT {ID} FROM {TRACKS} WHERE {AUDIO_URL} = ?1"),
            params![audio_url],
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
    /// Inserts a new track and assigns its id.
    pub fn create_track(&mut self, new: NewTrack) -> Result<Track, StorageError> {
        let tx = self.db.transaction()?;

        if audio_url_taken(&tx, &new.audio_url, None)? {
            return Err(StorageError::DuplicateAudioUrl(new.audio_url));
        }

        let inserted = tx.execute(
            &format!(
                "INSERT INTO {TRACKS} \
                 ({TITLE}, {ARTIST}, {ALBUM}, {DURATION}, {ARTWORK_URL}, {AUDIO_URL}, {LYRICS_LRC}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            ),
            params![
                new.title,
                new.artist,
                new.album,
                new.duration,
                new.artwork_url,
                new.audio_url,
                new.lyrics_lrc
            ],
        );
        match inserted {
            Err(e) if is_constraint_violation(&e) => {
                return Err(StorageError::DuplicateAudioUrl(new.audio_url));
            }
            other => {
                other?;
            }
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Track {
            id,
            title: new.title,
            artist: new.artist,
            album: new.album,
            duration: new.duration,
            artwork_url: new.artwork_url,
            audio_url: new.audio_url,
            lyrics_lrc: new.lyrics_lrc,
        })
    }

    pub fn get_track(&mut self, id: i64) -> Result<Track, StorageError> {
        track_by_id(&self.db, id)?.ok_or(StorageError::TrackNotFound(id))
    }

    /// Reports the same conflict `create_track` would, without writing
    /// anything. Upload ingestion runs it before touching the media root.
    pub fn check_audio_url_available(&mut self, audio_url: &str) -> Result<(), StorageError> {
        if audio_url_taken(&self.db, audio_url, None)? {
            return Err(StorageError::DuplicateAudioUrl(audio_url.to_string()));
        }
        Ok(())
    }

    /// Applies only the fields present in the patch; absent fields are left
    /// untouched.
    pub fn update_track(&mut self, id: i64, patch: TrackPatch) -> Result<Track, StorageError> {
        let tx = self.db.transaction()?;

        let mut track = track_by_id(&tx, id)?.ok_or(StorageError::TrackNotFound(id))?;

        if let Some(title) = patch.title {
            track.title = title;
        }
        if let Some(artist) = patch.artist {
            track.artist = artist;
        }
        if let Some(album) = patch.album {
            track.album = album;
        }
        if let Some(duration) = patch.duration {
            track.duration = duration;
        }
        if let Some(audio_url) = patch.audio_url {
            if audio_url != track.audio_url && audio_url_taken(&tx, &audio_url, Some(id))? {
                return Err(StorageError::DuplicateAudioUrl(audio_url));
            }
            track.audio_url = audio_url;
        }
        if let Some(artwork_url) = patch.artwork_url {
            track.artwork_url = artwork_url;
        }
        if let Some(lyrics_lrc) = patch.lyrics_lrc {
            track.lyrics_lrc = lyrics_lrc;
        }

        let updated = tx.execute(
            &format!(
                "UPDATE {TRACKS} SET {TITLE} = ?1, {ARTIST} = ?2, {ALBUM} = ?3, \
                 {DURATION} = ?4, {ARTWORK_URL} = ?5, {AUDIO_URL} = ?6, {LYRICS_LRC} = ?7 \
                 WHERE {ID} = ?8"
            ),
            params![
                track.title,
                track.artist,
                track.album,
                track.duration,
                track.artwork_url,
                track.audio_url,
                track.lyrics_lrc,
                id
            ],
        );
        match updated {
            Err(e) if is_constraint_violation(&e) => {
                return Err(StorageError::DuplicateAudioUrl(track.audio_url));
            }
            other => {
                other?;
            }
        }

        tx.commit()?;
        Ok(track)
    }

    /// Lists tracks ordered by id ascending.
    ///
    /// `offset` clamps to zero; an absent `limit` returns all remaining rows.
    /// `total` is the full unfiltered count, so callers can compute page
    /// counts regardless of the window they asked for.
    pub fn list_tracks(
        &mut self,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<TrackPage, StorageError> {
        let offset = offset.max(0);
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.unwrap_or(-1);

        let tx = self.db.transaction()?;

        let items = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM {TRACKS} ORDER BY {ID} LIMIT ?1 OFFSET ?2",
                track_columns()
            ))?;
            stmt.query_map(params![limit, offset], track_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        let total: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {TRACKS}"), [], |row| {
            row.get(0)
        })?;

        tx.commit()?;
        Ok(TrackPage { total, items })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::track::TrackPatch,
        storage::{
            error::StorageError,
            testing::{mock_track, setup_storage},
        },
    };

    #[test]
    fn create_assigns_sequential_ids() {
        let mut storage = setup_storage();

        let first = storage.create_track(mock_track(1)).unwrap();
        let second = storage.create_track(mock_track(2)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(storage.get_track(1).unwrap(), first);
    }

    #[test]
    fn create_rejects_duplicate_audio_url() {
        let mut storage = setup_storage();

        storage.create_track(mock_track(1)).unwrap();

        let mut dup = mock_track(2);
        dup.audio_url = mock_track(1).audio_url;

        let err = storage.create_track(dup).unwrap_err();
        assert!(matches!(err, StorageError::DuplicateAudioUrl(..)));

        // the failed insert left nothing behind
        assert_eq!(storage.list_tracks(None, 0).unwrap().total, 1);
    }

    #[test]
    fn check_audio_url_available_reports_conflict() {
        let mut storage = setup_storage();
        let track = storage.create_track(mock_track(1)).unwrap();

        storage
            .check_audio_url_available("/audio/free.mp3")
            .unwrap();

        let err = storage
            .check_audio_url_available(&track.audio_url)
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateAudioUrl(..)));
    }

    #[test]
    fn get_missing_track_is_not_found() {
        let mut storage = setup_storage();

        let err = storage.get_track(42).unwrap_err();
        assert!(matches!(err, StorageError::TrackNotFound(42)));
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut storage = setup_storage();
        let track = storage.create_track(mock_track(1)).unwrap();

        let updated = storage
            .update_track(
                track.id,
                TrackPatch {
                    title: Some("Renamed".to_string()),
                    lyrics_lrc: Some(Some("[00:01.00]la".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.lyrics_lrc.as_deref(), Some("[00:01.00]la"));
        // untouched fields survive
        assert_eq!(updated.artist, track.artist);
        assert_eq!(updated.audio_url, track.audio_url);
    }

    #[test]
    fn update_with_explicit_null_clears_field() {
        let mut storage = setup_storage();
        let mut new = mock_track(1);
        new.artwork_url = Some("/cover_art/a.jpg".to_string());
        let track = storage.create_track(new).unwrap();

        let updated = storage
            .update_track(
                track.id,
                TrackPatch {
                    artwork_url: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.artwork_url, None);
    }

    #[test]
    fn update_rejects_colliding_audio_url() {
        let mut storage = setup_storage();
        storage.create_track(mock_track(1)).unwrap();
        let second = storage.create_track(mock_track(2)).unwrap();

        let err = storage
            .update_track(
                second.id,
                TrackPatch {
                    audio_url: Some(mock_track(1).audio_url),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, StorageError::DuplicateAudioUrl(..)));
        // rolled back, nothing changed
        assert_eq!(
            storage.get_track(second.id).unwrap().audio_url,
            mock_track(2).audio_url
        );
    }

    #[test]
    fn update_keeping_own_audio_url_is_allowed() {
        let mut storage = setup_storage();
        let track = storage.create_track(mock_track(1)).unwrap();

        let updated = storage
            .update_track(
                track.id,
                TrackPatch {
                    audio_url: Some(track.audio_url.clone()),
                    title: Some("Still me".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.audio_url, track.audio_url);
        assert_eq!(updated.title, "Still me");
    }

    #[test]
    fn update_missing_track_is_not_found() {
        let mut storage = setup_storage();

        let err = storage
            .update_track(7, TrackPatch::default())
            .unwrap_err();
        assert!(matches!(err, StorageError::TrackNotFound(7)));
    }

    #[test]
    fn list_pagination_windows() {
        let mut storage = setup_storage();
        for n in 1..=5 {
            storage.create_track(mock_track(n)).unwrap();
        }

        let page = storage.list_tracks(Some(2), 0).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(ids(&page.items), vec![1, 2]);

        let page = storage.list_tracks(Some(2), 4).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(ids(&page.items), vec![5]);

        // no limit returns everything from the offset on
        let page = storage.list_tracks(None, 3).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(ids(&page.items), vec![4, 5]);
    }

    #[test]
    fn list_clamps_negative_offset() {
        let mut storage = setup_storage();
        storage.create_track(mock_track(1)).unwrap();

        let page = storage.list_tracks(None, -3).unwrap();
        assert_eq!(ids(&page.items), vec![1]);
    }

    #[test]
    fn list_total_is_invariant_to_window() {
        let mut storage = setup_storage();
        for n in 1..=4 {
            storage.create_track(mock_track(n)).unwrap();
        }

        for (limit, offset) in [(None, 0), (Some(1), 0), (Some(10), 2), (None, 99)] {
            assert_eq!(storage.list_tracks(limit, offset).unwrap().total, 4);
        }
    }

    fn ids(tracks: &[crate::domain::track::Track]) -> Vec<i64> {
        tracks.iter().map(|t| t.id).collect()
    }
}
