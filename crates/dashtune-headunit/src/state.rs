//! View-facing playback snapshot.

use dashtune_types::{LocalSong, RepeatMode, Track};

/// Single coalesced snapshot of playback state consumed by presentation.
///
/// Each field is fed by its own session channel; the snapshot is atomic per
/// field update, not across fields, so a position update may briefly sit next
/// to a stale track until the next emission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerViewState {
    /// Currently loaded track, if any.
    pub current_track: Option<Track>,
    /// True while playback is actively running.
    pub is_playing: bool,
    /// Playback position in milliseconds; reset on track change.
    pub position_ms: u64,
    /// Queue in scan order; never reordered by the view layer.
    pub queue: Vec<LocalSong>,
    /// Whether shuffle ordering is active.
    pub shuffle_enabled: bool,
    /// Active repeat mode.
    pub repeat_mode: RepeatMode,
    /// True while a library load is in flight.
    pub is_loading: bool,
    /// Message of the last failed operation, cleared on the next load.
    pub error: Option<String>,
}
