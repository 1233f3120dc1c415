use serde::{Deserialize, Serialize};

use super::present;

/// Represents a catalogued music track
///
/// `duration` is an opaque formatted value ("3:14"); it is stored and served
/// verbatim, never parsed. `audio_url` is unique across the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: String,
    pub artwork_url: Option<String>,
    pub audio_url: String,
    pub lyrics_lrc: Option<String>,
}

/// Fields of a track before it has been assigned an id
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: String,
    pub artwork_url: Option<String>,
    pub audio_url: String,
    pub lyrics_lrc: Option<String>,
}

/// Partial update of a track: only fields present in the request body are
/// applied. The nullable columns use `Option<Option<_>>` so that an explicit
/// `null` clears the value while an absent field leaves it untouched.
#[derive(Debug, Default, Deserialize)]
pub struct TrackPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<String>,
    pub audio_url: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub artwork_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub lyrics_lrc: Option<Option<String>>,
}

/// One page of the track catalog. `total` is always the full row count,
/// independent of the limit/offset that produced `items`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackPage {
    pub total: i64,
    pub items: Vec<Track>,
}

#[cfg(test)]
mod tests {
    use super::TrackPatch;

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: TrackPatch = serde_json::from_str(r#"{"lyrics_lrc": null}"#).unwrap();
        assert_eq!(patch.lyrics_lrc, Some(None));
        assert_eq!(patch.artwork_url, None);
        assert_eq!(patch.title, None);
    }

    #[test]
    fn patch_carries_present_values() {
        let patch: TrackPatch =
            serde_json::from_str(r#"{"title": "New", "artwork_url": "/cover_art/x.jpg"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(
            patch.artwork_url,
            Some(Some("/cover_art/x.jpg".to_string()))
        );
        assert_eq!(patch.lyrics_lrc, None);
    }
}
