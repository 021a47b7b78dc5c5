//! User events, session intents, and the dispatch mapping.
//!
//! Events are what the presentation layer emits; intents are what the
//! playback session understands. Translation between the two happens in the
//! controller (it needs the current snapshot for the toggle cases); dispatch
//! here is a stateless 1:1 forwarding with no retries.

use anyhow::Result;

use dashtune_session::port::PlaybackPort;
use dashtune_types::RepeatMode;

/// UI-originated playback events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Toggle between play and pause.
    PlayPauseClicked,
    /// Advance to the next item.
    SkipNextClicked,
    /// Restart or step back one item.
    SkipPrevClicked,
    /// Seek within the current item (milliseconds).
    SeekTo(u64),
    /// Start playing the queue entry at this index.
    PlayByIndex(usize),
    /// Flip shuffle ordering.
    ToggleShuffle,
    /// Advance the repeat mode one step in its cycle.
    CycleRepeat,
}

/// Session-facing command derived from one event; created per dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerIntent {
    Play,
    Pause,
    SkipNext,
    SkipPrev,
    SeekTo(u64),
    PlayByIndex(usize),
    SetShuffle(bool),
    SetRepeat(RepeatMode),
}

/// Forward one intent to exactly one port call and await its completion.
pub async fn dispatch_intent(port: &dyn PlaybackPort, intent: PlayerIntent) -> Result<()> {
    match intent {
        PlayerIntent::Play => port.play().await,
        PlayerIntent::Pause => port.pause().await,
        PlayerIntent::SkipNext => port.skip_next().await,
        PlayerIntent::SkipPrev => port.skip_previous().await,
        PlayerIntent::SeekTo(position_ms) => port.seek_to(position_ms).await,
        PlayerIntent::PlayByIndex(index) => port.play_by_index(index).await,
        PlayerIntent::SetShuffle(enabled) => port.set_shuffle(enabled).await,
        PlayerIntent::SetRepeat(mode) => port.set_repeat(mode).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakePort, PortCall};

    #[tokio::test]
    async fn each_intent_maps_to_one_port_call() {
        let port = FakePort::new();
        let cases = [
            (PlayerIntent::Play, PortCall::Play),
            (PlayerIntent::Pause, PortCall::Pause),
            (PlayerIntent::SkipNext, PortCall::SkipNext),
            (PlayerIntent::SkipPrev, PortCall::SkipPrev),
            (PlayerIntent::SeekTo(45_000), PortCall::SeekTo(45_000)),
            (PlayerIntent::PlayByIndex(2), PortCall::PlayByIndex(2)),
            (PlayerIntent::SetShuffle(true), PortCall::SetShuffle(true)),
            (
                PlayerIntent::SetRepeat(RepeatMode::All),
                PortCall::SetRepeat(RepeatMode::All),
            ),
        ];

        for (intent, expected) in cases {
            dispatch_intent(&port, intent).await.unwrap();
            assert_eq!(port.calls().last(), Some(&expected));
        }
        assert_eq!(port.calls().len(), 8);
    }

    #[tokio::test]
    async fn dispatch_propagates_port_failure() {
        let port = FakePort::new();
        port.fail_with("session offline");

        let err = dispatch_intent(&port, PlayerIntent::Play).await.unwrap_err();
        assert_eq!(err.to_string(), "session offline");
    }
}
