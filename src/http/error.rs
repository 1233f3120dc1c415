use rouille::Response;
use serde::Serialize;

use crate::storage::error::StorageError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TrackNotFound(_)
            | StorageError::PlaylistNotFound(_)
            | StorageError::NotAMember { .. } => ApiError::NotFound(err.to_string()),

            // duplicate playlist name / audio url surface as 400 at the API,
            // matching the original wire contract
            StorageError::DuplicatePlaylistName(_)
            | StorageError::DuplicateAudioUrl(_)
            | StorageError::InvalidFileName(_) => ApiError::BadRequest(err.to_string()),

            StorageError::DuplicateMember { .. } => ApiError::Conflict(err.to_string()),

            StorageError::Database(_) | StorageError::Fs(_) | StorageError::Internal(_) => {
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        };
        Response::json(&ErrorBody { detail }).with_status_code(status)
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use crate::storage::error::StorageError;

    #[test]
    fn storage_errors_map_to_expected_statuses() {
        let cases: Vec<(StorageError, u16)> = vec![
            (StorageError::TrackNotFound(1), 404),
            (StorageError::PlaylistNotFound(1), 404),
            (
                StorageError::NotAMember {
                    playlist: 1,
                    track: 2,
                },
                404,
            ),
            (StorageError::DuplicatePlaylistName("x".into()), 400),
            (StorageError::DuplicateAudioUrl("/audio/x.mp3".into()), 400),
            (StorageError::InvalidFileName("".into()), 400),
            (
                StorageError::DuplicateMember {
                    playlist: 1,
                    track: 2,
                },
                409,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }
}
