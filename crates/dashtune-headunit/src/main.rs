mod config;
mod controller;
mod drive_side;
mod intent;
mod library;
mod state;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dashtune_session::session::SessionPlayer;

use crate::config::HeadUnitConfig;
use crate::controller::PlayerController;
use crate::drive_side::DriveSideStore;
use crate::library::FsLibraryScanner;
use crate::state::PlayerViewState;

#[derive(Parser, Debug)]
#[command(name = "dashtune-headunit")]
struct Args {
    /// Media library root directory
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Optional head-unit config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dashtune_headunit=info")),
        )
        .init();

    let cfg = match args.config.as_ref() {
        Some(path) => HeadUnitConfig::load(path)?,
        None => HeadUnitConfig::default(),
    };
    let media_dir = match args.media_dir {
        Some(dir) => dir,
        None => config::media_dir_from_config(&cfg)?,
    };
    let prefs_path = config::prefs_path_from_config(&cfg, args.config.as_deref());
    let tick = config::tick_from_config(&cfg);

    tracing::info!(
        media_dir = %media_dir.display(),
        prefs = %prefs_path.display(),
        "starting dashtune-headunit"
    );

    let mut drive_side = DriveSideStore::open(prefs_path)?;
    if let Err(e) = drive_side.watch_file() {
        tracing::warn!(error = %e, "drive-side preference watching unavailable");
    }
    tracing::info!(
        left_hand_drive = drive_side.is_left_hand_drive(),
        "drive side resolved"
    );

    let session = SessionPlayer::spawn_with_tick(tick);
    let scanner = FsLibraryScanner::new(media_dir);
    let controller = PlayerController::new(Arc::new(session.clone()), Arc::new(scanner));
    controller.load_local_music();

    let (quit_tx, mut quit_rx) = tokio::sync::watch::channel(false);
    let _ = ctrlc::set_handler(move || {
        let _ = quit_tx.send(true);
    });

    let mut state_rx = controller.state();
    let mut side_rx = drive_side.subscribe();
    let mut last = state_rx.borrow().clone();
    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                log_transitions(&last, &state);
                last = state;
            }
            changed = side_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                tracing::info!(
                    left_hand_drive = *side_rx.borrow_and_update(),
                    "drive side changed"
                );
            }
            _ = quit_rx.changed() => break,
        }
    }

    tracing::info!("shutting down");
    session.shutdown();
    Ok(())
}

/// Log the view-state transitions worth surfacing on a headless unit.
fn log_transitions(last: &PlayerViewState, state: &PlayerViewState) {
    if state.current_track != last.current_track || state.is_playing != last.is_playing {
        let title = state
            .current_track
            .as_ref()
            .map(|t| t.title.as_str())
            .unwrap_or("-");
        tracing::info!(track = title, playing = state.is_playing, "playback state");
    }
    if state.queue.len() != last.queue.len() {
        tracing::info!(queue = state.queue.len(), "queue updated");
    }
    if state.shuffle_enabled != last.shuffle_enabled || state.repeat_mode != last.repeat_mode {
        tracing::info!(
            shuffle = state.shuffle_enabled,
            repeat = state.repeat_mode.as_raw(),
            "playback options"
        );
    }
    if state.error != last.error {
        if let Some(error) = state.error.as_deref() {
            tracing::warn!(error, "player error");
        }
    }
}
