use crate::config;
use crate::storage::error::StorageError;

pub mod catalog;
pub mod db;
pub mod error;
pub mod media;
pub mod members;
pub mod playlists;
pub(crate) mod schema;

/// Main structure that implements all storage logic.
///
/// Every operation runs inside its own rusqlite transaction: either the
/// whole mutation commits, or the transaction is dropped and nothing of it
/// survives.
pub struct Storage {
    pub(crate) db: rusqlite::Connection,
}

impl Storage {
    /// when called, opens a database connection and initializes the schema
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Storage, schema};
    use crate::domain::track::NewTrack;

    pub fn setup_storage() -> Storage {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        schema::init(&conn).unwrap();
        Storage::from_existing_conn(conn)
    }

    pub fn mock_track(n: u32) -> NewTrack {
        NewTrack {
            title: format!("Track {n}"),
            artist: format!("Artist {n}"),
            album: format!("Album {n}"),
            duration: "3:14".to_string(),
            artwork_url: None,
            audio_url: format!("/audio/track_{n}.mp3"),
            lyrics_lrc: None,
        }
    }
}
