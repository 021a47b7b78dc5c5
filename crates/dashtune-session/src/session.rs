//! In-process playback session engine.
//!
//! A single worker task owns the queue, play order, repeat mode, and
//! position clock. Commands arrive over an unbounded channel (queued until
//! the worker drains them, never dropped) and every observable change is
//! published through one of five independent watch channels. Audio output is
//! the host platform's concern; this engine only runs the session state.

use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, watch};

use dashtune_types::{LocalSong, RepeatMode, Track};

use crate::clock::PositionClock;
use crate::play_order::PlayOrder;
use crate::port::PlaybackPort;

/// Position reported while playing is refreshed at this cadence.
pub const DEFAULT_TICK: Duration = Duration::from_millis(500);

/// Skip-previous restarts the current item past this position.
const PREVIOUS_RESTART_THRESHOLD_MS: u64 = 3_000;

#[derive(Debug)]
enum SessionCommand {
    Play,
    Pause,
    SkipNext,
    SkipPrevious,
    SeekTo(u64),
    PlayByIndex(usize),
    SetShuffle(bool),
    SetRepeat(RepeatMode),
    SetQueue(Vec<LocalSong>),
    Shutdown,
}

/// Handle to a running session worker.
///
/// Cloning is cheap; all clones feed the same worker. Dropping every handle
/// (or calling [`SessionPlayer::shutdown`]) ends the worker task.
#[derive(Clone)]
pub struct SessionPlayer {
    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
    current_track: watch::Receiver<Option<Track>>,
    is_playing: watch::Receiver<bool>,
    position_ms: watch::Receiver<u64>,
    shuffle_enabled: watch::Receiver<bool>,
    repeat_mode: watch::Receiver<RepeatMode>,
}

impl SessionPlayer {
    /// Spawn a session worker with the default position tick.
    pub fn spawn() -> Self {
        Self::spawn_with_tick(DEFAULT_TICK)
    }

    /// Spawn a session worker publishing position updates every `tick`.
    pub fn spawn_with_tick(tick: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (track_tx, track_rx) = watch::channel(None);
        let (playing_tx, playing_rx) = watch::channel(false);
        let (position_tx, position_rx) = watch::channel(0);
        let (shuffle_tx, shuffle_rx) = watch::channel(false);
        let (repeat_tx, repeat_rx) = watch::channel(RepeatMode::Off);

        let worker = Worker {
            queue: Vec::new(),
            order: PlayOrder::linear(0),
            current: None,
            playing: false,
            shuffle: false,
            repeat: RepeatMode::Off,
            clock: PositionClock::new(),
            rng: StdRng::from_entropy(),
            track_tx,
            playing_tx,
            position_tx,
            shuffle_tx,
            repeat_tx,
        };
        tokio::spawn(worker.run(cmd_rx, tick));

        Self {
            cmd_tx,
            current_track: track_rx,
            is_playing: playing_rx,
            position_ms: position_rx,
            shuffle_enabled: shuffle_rx,
            repeat_mode: repeat_rx,
        }
    }

    /// Ask the worker to exit; in-flight commands ahead of this are applied.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown);
    }

    fn send(&self, cmd: SessionCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow!("playback session is closed"))
    }
}

#[async_trait]
impl PlaybackPort for SessionPlayer {
    fn current_track(&self) -> watch::Receiver<Option<Track>> {
        self.current_track.clone()
    }

    fn is_playing(&self) -> watch::Receiver<bool> {
        self.is_playing.clone()
    }

    fn position_ms(&self) -> watch::Receiver<u64> {
        self.position_ms.clone()
    }

    fn shuffle_enabled(&self) -> watch::Receiver<bool> {
        self.shuffle_enabled.clone()
    }

    fn repeat_mode(&self) -> watch::Receiver<RepeatMode> {
        self.repeat_mode.clone()
    }

    async fn play(&self) -> Result<()> {
        self.send(SessionCommand::Play)
    }

    async fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause)
    }

    async fn skip_next(&self) -> Result<()> {
        self.send(SessionCommand::SkipNext)
    }

    async fn skip_previous(&self) -> Result<()> {
        self.send(SessionCommand::SkipPrevious)
    }

    async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.send(SessionCommand::SeekTo(position_ms))
    }

    async fn play_by_index(&self, index: usize) -> Result<()> {
        self.send(SessionCommand::PlayByIndex(index))
    }

    async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.send(SessionCommand::SetShuffle(enabled))
    }

    async fn set_repeat(&self, mode: RepeatMode) -> Result<()> {
        self.send(SessionCommand::SetRepeat(mode))
    }

    async fn set_media_items(&self, songs: Vec<LocalSong>) -> Result<()> {
        self.send(SessionCommand::SetQueue(songs))
    }
}

struct Worker {
    queue: Vec<LocalSong>,
    order: PlayOrder,
    current: Option<usize>,
    playing: bool,
    shuffle: bool,
    repeat: RepeatMode,
    clock: PositionClock,
    rng: StdRng,
    track_tx: watch::Sender<Option<Track>>,
    playing_tx: watch::Sender<bool>,
    position_tx: watch::Sender<u64>,
    shuffle_tx: watch::Sender<bool>,
    repeat_tx: watch::Sender<RepeatMode>,
}

impl Worker {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>, tick: Duration) {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if !self.apply(cmd) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => self.on_tick(),
            }
        }
        tracing::debug!("session worker stopped");
    }

    /// Apply one command; returns `false` when the worker should exit.
    fn apply(&mut self, cmd: SessionCommand) -> bool {
        tracing::debug!(?cmd, "session command");
        match cmd {
            SessionCommand::Play => self.on_play(),
            SessionCommand::Pause => self.on_pause(),
            SessionCommand::SkipNext => self.on_skip_next(),
            SessionCommand::SkipPrevious => self.on_skip_previous(),
            SessionCommand::SeekTo(ms) => self.on_seek(ms),
            SessionCommand::PlayByIndex(index) => self.on_play_by_index(index),
            SessionCommand::SetShuffle(enabled) => self.on_set_shuffle(enabled),
            SessionCommand::SetRepeat(mode) => self.on_set_repeat(mode),
            SessionCommand::SetQueue(songs) => self.on_set_queue(songs),
            SessionCommand::Shutdown => return false,
        }
        true
    }

    fn on_play(&mut self) {
        if self.current.is_none() {
            tracing::warn!("play requested with no loaded item");
            return;
        }
        if !self.playing {
            self.playing = true;
            self.clock.start();
            let _ = self.playing_tx.send(true);
        }
    }

    fn on_pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.clock.pause();
            let _ = self.playing_tx.send(false);
            let _ = self.position_tx.send(self.clock.position_ms());
        }
    }

    fn on_skip_next(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        // Manual skips ignore repeat-one; only repeat-all wraps.
        match self.order.next_after(current, self.repeat == RepeatMode::All) {
            Some(next) => self.load_item(next),
            None => tracing::debug!("skip next at end of queue"),
        }
    }

    fn on_skip_previous(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        if self.clock.position_ms() > PREVIOUS_RESTART_THRESHOLD_MS {
            self.on_seek(0);
            return;
        }
        match self
            .order
            .previous_before(current, self.repeat == RepeatMode::All)
        {
            Some(previous) => self.load_item(previous),
            None => self.on_seek(0),
        }
    }

    fn on_seek(&mut self, position_ms: u64) {
        let Some(current) = self.current else {
            return;
        };
        let duration = self.queue[current].duration_ms;
        let clamped = if duration > 0 {
            position_ms.min(duration)
        } else {
            position_ms
        };
        self.clock.reset_to(clamped);
        let _ = self.position_tx.send(clamped);
    }

    fn on_play_by_index(&mut self, index: usize) {
        if index >= self.queue.len() {
            tracing::warn!(index, queue_len = self.queue.len(), "play index out of range");
            return;
        }
        self.load_item(index);
        if !self.playing {
            self.playing = true;
            self.clock.start();
            let _ = self.playing_tx.send(true);
        }
    }

    fn on_set_shuffle(&mut self, enabled: bool) {
        self.shuffle = enabled;
        self.order = if enabled {
            PlayOrder::shuffled(self.queue.len(), self.current, &mut self.rng)
        } else {
            PlayOrder::linear(self.queue.len())
        };
        let _ = self.shuffle_tx.send(enabled);
    }

    fn on_set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
        let _ = self.repeat_tx.send(mode);
    }

    fn on_set_queue(&mut self, songs: Vec<LocalSong>) {
        tracing::info!(count = songs.len(), "queue replaced");
        self.queue = songs;
        self.order = if self.shuffle {
            PlayOrder::shuffled(self.queue.len(), None, &mut self.rng)
        } else {
            PlayOrder::linear(self.queue.len())
        };
        // Prepare the first item without starting playback.
        if self.playing {
            self.playing = false;
            let _ = self.playing_tx.send(false);
        }
        self.clock.pause();
        match self.order.first() {
            Some(first) => self.load_item(first),
            None => {
                self.current = None;
                self.clock.reset_to(0);
                let _ = self.track_tx.send(None);
                let _ = self.position_tx.send(0);
            }
        }
    }

    /// Make `index` the current item at position zero, keeping the
    /// playing/paused state.
    fn load_item(&mut self, index: usize) {
        self.current = Some(index);
        self.clock.reset_to(0);
        let _ = self.track_tx.send(Some(Track::from_song(&self.queue[index])));
        let _ = self.position_tx.send(0);
    }

    fn on_tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(current) = self.current else {
            return;
        };
        let position = self.clock.position_ms();
        let duration = self.queue[current].duration_ms;
        if duration > 0 && position >= duration {
            self.on_item_end(current, duration);
        } else {
            let _ = self.position_tx.send(position);
        }
    }

    fn on_item_end(&mut self, current: usize, duration: u64) {
        match self.repeat {
            RepeatMode::One => self.load_item(current),
            mode => match self.order.next_after(current, mode == RepeatMode::All) {
                Some(next) => self.load_item(next),
                None => {
                    // End of queue with repeat off: hold at the final frame.
                    self.playing = false;
                    self.clock.pause();
                    self.clock.reset_to(duration);
                    let _ = self.playing_tx.send(false);
                    let _ = self.position_tx.send(duration);
                }
            },
        }
    }
}
