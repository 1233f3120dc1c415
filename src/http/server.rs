use log::info;
use rouille::{Request, Response, input::post::BufferedFile};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    config::HttpConfig,
    domain::{
        playlist::PlaylistPatch,
        track::{NewTrack, TrackPatch},
    },
    http::error::ApiError,
    storage::{Storage, media::MediaStore},
};

pub struct HttpServer {
    storage: Arc<Mutex<Storage>>,
    media: MediaStore,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(storage: Storage, media: MediaStore, config: HttpConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            media,
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/) => {
                Response::json(&serde_json::json!({"message": "Welcome to the playdeck API!"}))
            },

            (GET) (/api/tracks) => {
                respond(self.list_tracks(request))
            },
            (PATCH) (/api/tracks/{id: i64}) => {
                respond(self.update_track(request, id))
            },

            (GET) (/api/playlists) => {
                respond(self.list_playlists())
            },
            (POST) (/api/playlists) => {
                respond(self.create_playlist(request))
            },
            (GET) (/api/playlists/{id: i64}) => {
                respond(self.get_playlist(id))
            },
            (PATCH) (/api/playlists/{id: i64}) => {
                respond(self.update_playlist(request, id))
            },
            (DELETE) (/api/playlists/{id: i64}) => {
                respond(self.delete_playlist(id))
            },

            (POST) (/api/playlists/{id: i64}/tracks/{track_id: i64}) => {
                respond(self.add_member(id, track_id))
            },
            (DELETE) (/api/playlists/{id: i64}/tracks/{track_id: i64}) => {
                respond(self.remove_member(id, track_id))
            },
            (PUT) (/api/playlists/{id: i64}/reorder) => {
                respond(self.reorder(request, id))
            },

            (POST) (/api/upload) => {
                respond(self.upload(request))
            },

            _ => self.serve_media(request)
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>, ApiError> {
        self.storage
            .lock()
            .map_err(|e| ApiError::Internal(format!("storage lock poisoned: {e}")))
    }

    fn list_tracks(&self, request: &Request) -> Result<Response, ApiError> {
        let limit = match request.get_param("limit") {
            None => None,
            Some(raw) => {
                let limit: i64 = raw
                    .parse()
                    .map_err(|_| ApiError::BadRequest("limit must be an integer".into()))?;
                if limit < 1 {
                    return Err(ApiError::BadRequest("limit must be at least 1".into()));
                }
                Some(limit)
            }
        };
        let offset = match request.get_param("offset") {
            None => 0,
            Some(raw) => raw
                .parse()
                .map_err(|_| ApiError::BadRequest("offset must be an integer".into()))?,
        };

        let page = self.storage()?.list_tracks(limit, offset)?;
        Ok(Response::json(&page))
    }

    fn update_track(&self, request: &Request, id: i64) -> Result<Response, ApiError> {
        let patch: TrackPatch = rouille::input::json_input(request)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let track = self.storage()?.update_track(id, patch)?;
        Ok(Response::json(&track))
    }

    fn list_playlists(&self) -> Result<Response, ApiError> {
        let playlists = self.storage()?.list_playlists()?;
        Ok(Response::json(&playlists))
    }

    fn create_playlist(&self, request: &Request) -> Result<Response, ApiError> {
        let input = rouille::post_input!(request, {
            name: String,
            artwork_file: Option<BufferedFile>,
        })
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        // reject a taken name before the cover hits disk, so a failed
        // create leaves no orphaned file behind
        let mut storage = self.storage()?;
        storage.check_playlist_name_available(&input.name)?;

        let artwork_url = match input.artwork_file {
            Some(file) => Some(self.media.store_cover(
                "playlist_cover",
                file.filename.as_deref(),
                &file.data,
            )?),
            None => None,
        };

        let playlist = storage.create_playlist(&input.name, artwork_url)?;
        Ok(Response::json(&playlist).with_status_code(201))
    }

    fn get_playlist(&self, id: i64) -> Result<Response, ApiError> {
        let playlist = self.storage()?.get_playlist(id)?;
        Ok(Response::json(&playlist))
    }

    fn update_playlist(&self, request: &Request, id: i64) -> Result<Response, ApiError> {
        let patch: PlaylistPatch = rouille::input::json_input(request)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let playlist = self.storage()?.update_playlist(id, patch)?;
        Ok(Response::json(&playlist))
    }

    fn delete_playlist(&self, id: i64) -> Result<Response, ApiError> {
        self.storage()?.delete_playlist(id)?;
        Ok(no_content())
    }

    fn add_member(&self, playlist_id: i64, track_id: i64) -> Result<Response, ApiError> {
        let playlist = self.storage()?.add_track_to_playlist(playlist_id, track_id)?;
        Ok(Response::json(&playlist))
    }

    fn remove_member(&self, playlist_id: i64, track_id: i64) -> Result<Response, ApiError> {
        self.storage()?
            .remove_track_from_playlist(playlist_id, track_id)?;
        Ok(no_content())
    }

    fn reorder(&self, request: &Request, id: i64) -> Result<Response, ApiError> {
        let body: ReorderRequest = rouille::input::json_input(request)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let playlist = self.storage()?.reorder_playlist(id, &body.track_ids)?;
        Ok(Response::json(&playlist))
    }

    fn upload(&self, request: &Request) -> Result<Response, ApiError> {
        let input = rouille::post_input!(request, {
            title: String,
            artist: String,
            album: String,
            duration: String,
            audio_file: BufferedFile,
            cover_art: Option<BufferedFile>,
            lyrics_lrc: Option<String>,
        })
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let audio_name = input
            .audio_file
            .filename
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("audio file has no file name".into()))?;

        // reject a duplicate audio_url before any bytes land on disk, so a
        // failed upload cannot clobber an existing track's media
        let audio_url = self.media.audio_url(audio_name)?;
        let mut storage = self.storage()?;
        storage.check_audio_url_available(&audio_url)?;

        let audio_url = self.media.store_audio(audio_name, &input.audio_file.data)?;

        let artwork_url = match input.cover_art {
            Some(file) => {
                Some(self.media
                    .store_cover("cover", file.filename.as_deref(), &file.data)?)
            }
            None => None,
        };

        let track = storage.create_track(NewTrack {
            title: input.title,
            artist: input.artist,
            album: input.album,
            duration: input.duration,
            artwork_url,
            audio_url,
            lyrics_lrc: input.lyrics_lrc,
        })?;

        Ok(Response::json(&UploadResponse {
            message: "Track and cover uploaded successfully!".to_string(),
            track_id: track.id,
            title: track.title,
        }))
    }

    /// Serves stored media under /audio and /cover_art by path string, the
    /// way the catalog references them.
    fn serve_media(&self, request: &Request) -> Response {
        let url = request.url();
        let is_media = url.starts_with(&format!("/{}/", crate::storage::media::AUDIO_DIR))
            || url.starts_with(&format!("/{}/", crate::storage::media::COVER_DIR));

        if request.method() != "GET" || !is_media {
            return Response::empty_404();
        }

        let Some(path) = self.media.resolve(&url) else {
            return Response::empty_404();
        };

        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        match std::fs::File::open(&path) {
            Ok(file) => Response::from_file(mime, file),
            Err(_) => Response::empty_404(),
        }
    }
}

fn respond(result: Result<Response, ApiError>) -> Response {
    match result {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

fn no_content() -> Response {
    Response::text("").with_status_code(204)
}

#[derive(Deserialize)]
struct ReorderRequest {
    #[serde(rename = "trackIds")]
    track_ids: Vec<i64>,
}

#[derive(Serialize, Deserialize)]
struct UploadResponse {
    message: String,
    track_id: i64,
    title: String,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
