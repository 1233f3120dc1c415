use rusqlite::Connection;

pub mod tables {
    pub const TRACKS: &str = "tracks";
    pub const PLAYLISTS: &str = "playlists";
    pub const PLAYLIST_TRACKS: &str = "playlist_tracks";

    pub const ALL_TABLES: &[&str] = &[TRACKS, PLAYLISTS, PLAYLIST_TRACKS];
}

pub mod columns {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const ALBUM: &str = "album";
    pub const DURATION: &str = "duration";
    pub const ARTWORK_URL: &str = "artwork_url";
    pub const AUDIO_URL: &str = "audio_url";
    pub const LYRICS_LRC: &str = "lyrics_lrc";
    pub const NAME: &str = "name";
    pub const PLAYLIST_ID: &str = "playlist_id";
    pub const TRACK_ID: &str = "track_id";
}

pub use columns::*;
pub use tables::*;

// playlist_tracks has no position column on purpose: member order is the
// join table's insertion (rowid) order, and reorder rewrites the rows.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tracks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    album TEXT NOT NULL,
    duration TEXT NOT NULL,
    artwork_url TEXT,
    audio_url TEXT NOT NULL UNIQUE,
    lyrics_lrc TEXT
);

CREATE TABLE IF NOT EXISTS playlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    artwork_url TEXT
);

CREATE TABLE IF NOT EXISTS playlist_tracks (
    playlist_id INTEGER NOT NULL REFERENCES playlists(id),
    track_id INTEGER NOT NULL REFERENCES tracks(id),
    PRIMARY KEY (playlist_id, track_id)
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
