use serde::{Deserialize, Serialize};

/// Repeat behavior of the playback session.
///
/// Raw values mirror the session protocol: 0 = off, 1 = one, 2 = all.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    #[default]
    Off,
    /// Repeat the current item indefinitely.
    One,
    /// Restart the queue after the last item.
    All,
}

impl RepeatMode {
    /// Parse a raw session value; unknown values map to `Off`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => RepeatMode::One,
            2 => RepeatMode::All,
            _ => RepeatMode::Off,
        }
    }

    /// Raw session value for this mode.
    pub fn as_raw(self) -> u8 {
        match self {
            RepeatMode::Off => 0,
            RepeatMode::One => 1,
            RepeatMode::All => 2,
        }
    }

    /// Next mode in the user-facing cycle: off, all, one, off.
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// A locally indexed audio file, ready to be queued.
///
/// Produced by the library scanner; a list of these is the queue handed to
/// the playback session. Field values are whatever the scan observed and are
/// never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalSong {
    /// Stable identifier within the scan index.
    pub id: u64,
    /// Track title (falls back to the file name).
    pub title: String,
    /// Artist name, `"Unknown"` when untagged.
    pub artist: String,
    /// Album name, `"Unknown"` when untagged.
    pub album: String,
    /// Duration in milliseconds, 0 when the probe could not determine it.
    pub duration_ms: u64,
    /// Opaque locator for the media content (`file://` URI).
    pub content_uri: String,
    /// Optional locator for artwork (sidecar file or embedded cover).
    pub art_uri: Option<String>,
}

/// The currently loaded item as reported by the playback session.
///
/// Replaced wholesale on every item transition; never patched in place.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    /// Session-assigned identifier.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Artist name.
    pub artist: String,
    /// Optional artwork locator.
    pub art_url: Option<String>,
    /// Album name, if known.
    pub album: Option<String>,
    /// Duration in milliseconds, 0 when unknown.
    pub duration_ms: u64,
}

impl Track {
    /// Build the session-facing track for a queued song.
    pub fn from_song(song: &LocalSong) -> Self {
        Self {
            id: song.id.to_string(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            art_url: song.art_uri.clone(),
            album: Some(song.album.clone()),
            duration_ms: song.duration_ms,
        }
    }
}
