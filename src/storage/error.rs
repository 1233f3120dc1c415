use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("track {0} not found")]
    TrackNotFound(i64),

    #[error("playlist {0} not found")]
    PlaylistNotFound(i64),

    #[error("a playlist named '{0}' already exists")]
    DuplicatePlaylistName(String),

    #[error("a track with audio url '{0}' already exists")]
    DuplicateAudioUrl(String),

    #[error("track {track} is already in playlist {playlist}")]
    DuplicateMember { playlist: i64, track: i64 },

    #[error("track {track} is not in playlist {playlist}")]
    NotAMember { playlist: i64, track: i64 },

    #[error("invalid media file name '{0}'")]
    InvalidFileName(String),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Uniqueness violations are caught at commit time and mapped back to the
/// matching conflict variant; the pre-commit checks only improve messages.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
