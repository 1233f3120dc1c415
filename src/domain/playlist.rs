use serde::{Deserialize, Serialize};

use super::{present, track::Track};

/// A named, ordered collection of tracks.
///
/// `tracks` is the current member list in observed order; it is always
/// resolved eagerly when a playlist is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub artwork_url: Option<String>,
    pub tracks: Vec<Track>,
}

/// Partial update of a playlist: name and artwork update independently when
/// present. `artwork_url: null` clears the artwork.
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub artwork_url: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::PlaylistPatch;

    #[test]
    fn patch_with_null_artwork_clears() {
        let patch: PlaylistPatch =
            serde_json::from_str(r#"{"name": "Mix", "artwork_url": null}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Mix"));
        assert_eq!(patch.artwork_url, Some(None));
    }

    #[test]
    fn empty_patch_touches_nothing() {
        let patch: PlaylistPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.artwork_url, None);
    }
}
