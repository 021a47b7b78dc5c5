//! Hand-rolled fakes shared by the controller and dispatch tests.

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::watch;

use dashtune_session::port::PlaybackPort;
use dashtune_types::{LocalSong, RepeatMode, Track};

/// One recorded port invocation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PortCall {
    Play,
    Pause,
    SkipNext,
    SkipPrev,
    SeekTo(u64),
    PlayByIndex(usize),
    SetShuffle(bool),
    SetRepeat(RepeatMode),
    SetMediaItems(Vec<LocalSong>),
}

/// Scriptable playback port: records every command and lets tests drive the
/// five observable channels directly.
pub(crate) struct FakePort {
    pub(crate) track_tx: watch::Sender<Option<Track>>,
    pub(crate) playing_tx: watch::Sender<bool>,
    pub(crate) position_tx: watch::Sender<u64>,
    pub(crate) shuffle_tx: watch::Sender<bool>,
    pub(crate) repeat_tx: watch::Sender<RepeatMode>,
    calls: Mutex<Vec<PortCall>>,
    failure: Mutex<Option<String>>,
}

impl FakePort {
    pub(crate) fn new() -> Self {
        Self {
            track_tx: watch::channel(None).0,
            playing_tx: watch::channel(false).0,
            position_tx: watch::channel(0).0,
            shuffle_tx: watch::channel(false).0,
            repeat_tx: watch::channel(RepeatMode::Off).0,
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Make every subsequent command fail with this message.
    pub(crate) fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<PortCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_of(&self, expected: &PortCall) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == expected)
            .count()
    }

    fn record(&self, call: PortCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlaybackPort for FakePort {
    fn current_track(&self) -> watch::Receiver<Option<Track>> {
        self.track_tx.subscribe()
    }

    fn is_playing(&self) -> watch::Receiver<bool> {
        self.playing_tx.subscribe()
    }

    fn position_ms(&self) -> watch::Receiver<u64> {
        self.position_tx.subscribe()
    }

    fn shuffle_enabled(&self) -> watch::Receiver<bool> {
        self.shuffle_tx.subscribe()
    }

    fn repeat_mode(&self) -> watch::Receiver<RepeatMode> {
        self.repeat_tx.subscribe()
    }

    async fn play(&self) -> Result<()> {
        self.record(PortCall::Play)
    }

    async fn pause(&self) -> Result<()> {
        self.record(PortCall::Pause)
    }

    async fn skip_next(&self) -> Result<()> {
        self.record(PortCall::SkipNext)
    }

    async fn skip_previous(&self) -> Result<()> {
        self.record(PortCall::SkipPrev)
    }

    async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.record(PortCall::SeekTo(position_ms))
    }

    async fn play_by_index(&self, index: usize) -> Result<()> {
        self.record(PortCall::PlayByIndex(index))
    }

    async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.record(PortCall::SetShuffle(enabled))
    }

    async fn set_repeat(&self, mode: RepeatMode) -> Result<()> {
        self.record(PortCall::SetRepeat(mode))
    }

    async fn set_media_items(&self, songs: Vec<LocalSong>) -> Result<()> {
        self.record(PortCall::SetMediaItems(songs))
    }
}

/// Build a small queue of distinct songs for tests.
pub(crate) fn sample_songs(count: u64) -> Vec<LocalSong> {
    (1..=count)
        .map(|id| LocalSong {
            id,
            title: format!("Song {id}"),
            artist: format!("Artist {id}"),
            album: format!("Album {id}"),
            duration_ms: 180_000 + id * 1_000,
            content_uri: format!("file:///music/{id}.flac"),
            art_uri: (id % 2 == 0).then(|| format!("file:///music/{id}.jpg")),
        })
        .collect()
}
