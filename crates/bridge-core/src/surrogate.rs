//! Reassembles characters outside the BMP that the host delivers as two
//! separate `vk::PACKET` events, one per UTF-16 code unit.
//!
//! The test phase and the delivery phase each get their own automata, and
//! within a phase key-down and key-up are tracked independently: a complete
//! unrelated keystroke may legally arrive between a high surrogate's down and
//! its matching up.

use tracing::debug;

use crate::key::KeyEvent;
use crate::unicode::{combine_surrogates, is_high_surrogate, is_low_surrogate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurrogateAction {
    /// Not a packet key; handle it as usual.
    DoDefault,
    /// Handle as a character key carrying this scalar value.
    DoDefaultWithCodepoint(u32),
    /// First half of a pair; eat it and wait for the second.
    ConsumeSilently,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Stream {
    #[default]
    Idle,
    WaitingForLow(u16),
}

impl Stream {
    fn feed(&mut self, unit: u16) -> SurrogateAction {
        if is_high_surrogate(unit) {
            if let Stream::WaitingForLow(stale) = *self {
                debug!(stale, unit, "high surrogate while waiting for low; dropping stale half");
            }
            *self = Stream::WaitingForLow(unit);
            return SurrogateAction::ConsumeSilently;
        }

        if is_low_surrogate(unit) {
            return match std::mem::take(self) {
                Stream::WaitingForLow(high) => {
                    SurrogateAction::DoDefaultWithCodepoint(combine_surrogates(high, unit))
                }
                Stream::Idle => {
                    debug!(unit, "low surrogate without a pending high surrogate");
                    SurrogateAction::DoDefaultWithCodepoint(u32::from(unit))
                }
            };
        }

        // A BMP unit leaves any pending half alone.
        SurrogateAction::DoDefaultWithCodepoint(u32::from(unit))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PhaseState {
    down: Stream,
    up: Stream,
}

impl PhaseState {
    fn feed(&mut self, event: &KeyEvent) -> SurrogateAction {
        let Some(unit) = event.unit.filter(|_| event.is_packet()) else {
            return SurrogateAction::DoDefault;
        };
        if event.is_down {
            self.down.feed(unit)
        } else {
            self.up.feed(unit)
        }
    }
}

#[derive(Debug, Default)]
pub struct SurrogatePairReconstructor {
    test: PhaseState,
    delivery: PhaseState,
}

impl SurrogatePairReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_test_key_event(&mut self, event: &KeyEvent) -> SurrogateAction {
        self.test.feed(event)
    }

    pub fn on_key_event(&mut self, event: &KeyEvent) -> SurrogateAction {
        self.delivery.feed(event)
    }

    pub fn is_waiting(&self) -> bool {
        [
            self.test.down,
            self.test.up,
            self.delivery.down,
            self.delivery.up,
        ]
        .iter()
        .any(|s| matches!(s, Stream::WaitingForLow(_)))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
