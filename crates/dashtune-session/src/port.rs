//! Playback port abstraction consumed by the view-state layer.
//!
//! Implementations expose session state as watch channels and accept
//! transport commands; commands sent before the session is ready must be
//! queued, never dropped.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use dashtune_types::{LocalSong, RepeatMode, Track};

/// Capability surface of a playback session.
///
/// The five observable channels always hold the latest value; subscribing
/// late yields the current state immediately. Commands may suspend until the
/// underlying session is able to accept them.
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Currently loaded item, `None` when the queue is empty.
    fn current_track(&self) -> watch::Receiver<Option<Track>>;
    /// Whether playback is actively running.
    fn is_playing(&self) -> watch::Receiver<bool>;
    /// Playback position in milliseconds, monotonic while playing.
    fn position_ms(&self) -> watch::Receiver<u64>;
    /// Whether shuffle ordering is active.
    fn shuffle_enabled(&self) -> watch::Receiver<bool>;
    /// Active repeat mode.
    fn repeat_mode(&self) -> watch::Receiver<RepeatMode>;

    /// Resume playback of the current item.
    async fn play(&self) -> Result<()>;
    /// Pause playback, keeping the current item and position.
    async fn pause(&self) -> Result<()>;
    /// Advance to the next item in play order.
    async fn skip_next(&self) -> Result<()>;
    /// Restart the current item or move to the previous one.
    async fn skip_previous(&self) -> Result<()>;
    /// Seek within the current item.
    async fn seek_to(&self, position_ms: u64) -> Result<()>;
    /// Jump to a queue index and start playing it.
    async fn play_by_index(&self, index: usize) -> Result<()>;
    /// Enable or disable shuffle ordering.
    async fn set_shuffle(&self, enabled: bool) -> Result<()>;
    /// Set the repeat mode.
    async fn set_repeat(&self, mode: RepeatMode) -> Result<()>;
    /// Replace the active queue and prepare its first item.
    async fn set_media_items(&self, songs: Vec<LocalSong>) -> Result<()>;
}
