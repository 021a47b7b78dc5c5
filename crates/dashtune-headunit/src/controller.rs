//! Player view-state controller.
//!
//! Single authority for the view-facing snapshot: subscribes to the playback
//! port's five observable channels, folds each into one `PlayerViewState`
//! via atomic per-field updates, and translates UI events into session
//! intents. The published state stream never errors and never completes
//! while the controller is alive; failures surface through the snapshot's
//! `error` field instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinSet;

use dashtune_session::port::PlaybackPort;
use dashtune_types::{RepeatMode, Track};

use crate::intent::{self, PlayerEvent, PlayerIntent};
use crate::library::LibraryScanner;
use crate::state::PlayerViewState;

/// Bridges the push-based session state source and the pull/observe-based
/// presentation layer. All spawned work lives in one task set whose lifetime
/// is the controller's own; dropping the controller cancels everything.
pub struct PlayerController {
    state_tx: Arc<watch::Sender<PlayerViewState>>,
    port: Arc<dyn PlaybackPort>,
    scanner: Arc<dyn LibraryScanner>,
    load_in_flight: Arc<AtomicBool>,
    tasks: Mutex<JoinSet<()>>,
}

impl PlayerController {
    /// Construct the controller and start the five channel subscriptions.
    pub fn new(port: Arc<dyn PlaybackPort>, scanner: Arc<dyn LibraryScanner>) -> Self {
        let (state_tx, _) = watch::channel(PlayerViewState {
            is_loading: true,
            ..PlayerViewState::default()
        });
        let state_tx = Arc::new(state_tx);

        let mut tasks = JoinSet::new();
        tasks.spawn(fold_channel(
            port.current_track(),
            state_tx.clone(),
            |state, track: Option<Track>| state.current_track = track,
        ));
        tasks.spawn(fold_channel(
            port.is_playing(),
            state_tx.clone(),
            |state, playing: bool| state.is_playing = playing,
        ));
        tasks.spawn(fold_channel(
            port.position_ms(),
            state_tx.clone(),
            |state, position: u64| state.position_ms = position,
        ));
        tasks.spawn(fold_channel(
            port.shuffle_enabled(),
            state_tx.clone(),
            |state, enabled: bool| state.shuffle_enabled = enabled,
        ));
        tasks.spawn(fold_channel(
            port.repeat_mode(),
            state_tx.clone(),
            |state, mode: RepeatMode| state.repeat_mode = mode,
        ));

        Self {
            state_tx,
            port,
            scanner,
            load_in_flight: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(tasks),
        }
    }

    /// Continuously updated view of the playback snapshot.
    pub fn state(&self) -> watch::Receiver<PlayerViewState> {
        self.state_tx.subscribe()
    }

    /// Scan the local library and hand the result to the session as the
    /// active queue. Calls arriving while a load is in flight are ignored.
    pub fn load_local_music(&self) {
        if self.load_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("library load already in flight; ignoring");
            return;
        }
        self.state_tx.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let port = self.port.clone();
        let scanner = self.scanner.clone();
        let state_tx = self.state_tx.clone();
        let in_flight = self.load_in_flight.clone();
        self.spawn(async move {
            let result = async {
                let songs = scanner.scan().await?;
                port.set_media_items(songs.clone()).await?;
                anyhow::Ok(songs)
            }
            .await;
            match result {
                Ok(songs) => {
                    tracing::info!(count = songs.len(), "local library loaded");
                    state_tx.send_modify(|state| {
                        state.is_loading = false;
                        state.queue = songs;
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "local library load failed");
                    state_tx.send_modify(|state| {
                        state.is_loading = false;
                        state.error = Some(e.to_string());
                    });
                }
            }
            in_flight.store(false, Ordering::SeqCst);
        });
    }

    /// Translate a UI event against the current snapshot and dispatch it.
    /// Fire-and-forget: the caller gets no result; a failed port call lands
    /// in the snapshot's `error` field.
    pub fn handle_event(&self, event: PlayerEvent) {
        let port = self.port.clone();
        let state_tx = self.state_tx.clone();
        self.spawn(async move {
            let intent = translate(&state_tx.borrow(), event);
            if let Err(e) = intent::dispatch_intent(port.as_ref(), intent).await {
                tracing::warn!(error = %e, ?event, "player command failed");
                state_tx.send_modify(|state| state.error = Some(e.to_string()));
            }
        });
    }

    fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        let mut tasks = self.tasks.lock().unwrap();
        // Reap finished entries so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }
}

/// Map one event onto one intent given the current snapshot.
fn translate(state: &PlayerViewState, event: PlayerEvent) -> PlayerIntent {
    match event {
        PlayerEvent::PlayPauseClicked => {
            if state.is_playing {
                PlayerIntent::Pause
            } else {
                PlayerIntent::Play
            }
        }
        PlayerEvent::SkipNextClicked => PlayerIntent::SkipNext,
        PlayerEvent::SkipPrevClicked => PlayerIntent::SkipPrev,
        PlayerEvent::SeekTo(position_ms) => PlayerIntent::SeekTo(position_ms),
        PlayerEvent::PlayByIndex(index) => PlayerIntent::PlayByIndex(index),
        PlayerEvent::ToggleShuffle => PlayerIntent::SetShuffle(!state.shuffle_enabled),
        PlayerEvent::CycleRepeat => PlayerIntent::SetRepeat(state.repeat_mode.cycled()),
    }
}

/// Fold every emission of one session channel into its snapshot field.
///
/// The first iteration folds the channel's current value so a late subscriber
/// still starts from session truth.
async fn fold_channel<T, F>(
    mut rx: watch::Receiver<T>,
    state_tx: Arc<watch::Sender<PlayerViewState>>,
    fold: F,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn(&mut PlayerViewState, T) + Send + 'static,
{
    loop {
        let value = rx.borrow_and_update().clone();
        state_tx.send_modify(|state| fold(state, value));
        if rx.changed().await.is_err() {
            break;
        }
    }
}
