//! Per-session driver turning host key events and engine Outputs into
//! composition/candidate buffers and an ordered notification batch.
//!
//! `InputContext` owns all state of one input session and is driven strictly
//! in host order, one call per delivered key event. Nothing here is shared
//! between sessions.

mod engine;
mod key_handlers;
mod response;
mod update;

#[cfg(test)]
mod tests;

pub use engine::{ConversionEngine, EngineContext, EngineError};
pub use response::{ClientAction, KeyResponse, TestKeyResponse};

use tracing::debug;

use bridge_core::candidate::CandidateSnapshot;
use bridge_core::composition::{CompositionLimits, CompositionSnapshot};
use bridge_core::deletion::DeletionEmulator;
use bridge_core::input_state::InputState;
use bridge_core::key::HostKeyboard;
use bridge_core::message::{MessageKind, NotificationMessage};
use bridge_core::settings::{settings, Settings};
use bridge_core::surrogate::SurrogatePairReconstructor;
use bridge_core::visibility::UiVisibilityTracker;

/// Limits copied out of `Settings` when the session starts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContextConfig {
    pub(crate) limits: CompositionLimits,
    pub(crate) max_deletion: usize,
    pub(crate) max_follow_ups: usize,
}

impl ContextConfig {
    fn from_settings(s: &Settings) -> Self {
        Self {
            limits: s.composition_limits(),
            max_deletion: s.deletion.max_count,
            max_follow_ups: s.callback.max_follow_ups,
        }
    }
}

/// State of one input session.
pub struct InputContext {
    engine: Box<dyn ConversionEngine + Send>,
    keyboard: Box<dyn HostKeyboard + Send>,
    config: ContextConfig,

    surrogate: SurrogatePairReconstructor,
    deleter: DeletionEmulator,

    composition: CompositionSnapshot,
    candidates: CandidateSnapshot,
    visibility: UiVisibilityTracker,
    input_state: InputState,
}

impl InputContext {
    /// Session using the global settings.
    pub fn new(
        engine: Box<dyn ConversionEngine + Send>,
        keyboard: Box<dyn HostKeyboard + Send>,
    ) -> Self {
        Self::with_settings(engine, keyboard, settings())
    }

    pub fn with_settings(
        engine: Box<dyn ConversionEngine + Send>,
        keyboard: Box<dyn HostKeyboard + Send>,
        settings: &Settings,
    ) -> Self {
        Self {
            engine,
            keyboard,
            config: ContextConfig::from_settings(settings),
            surrogate: SurrogatePairReconstructor::new(),
            deleter: DeletionEmulator::new(settings.deletion.release_modifiers),
            composition: CompositionSnapshot::default(),
            candidates: CandidateSnapshot::default(),
            visibility: UiVisibilityTracker::new(),
            input_state: InputState::default(),
        }
    }

    /// Current composition buffer, for host-initiated queries.
    pub fn composition(&self) -> &CompositionSnapshot {
        &self.composition
    }

    /// Current candidate buffer, for host-initiated queries.
    pub fn candidates(&self) -> &CandidateSnapshot {
        &self.candidates
    }

    pub fn visibility(&self) -> &UiVisibilityTracker {
        &self.visibility
    }

    pub fn input_state(&self) -> InputState {
        self.input_state
    }

    pub fn is_composing(&self) -> bool {
        self.composition.is_composing()
    }

    pub fn is_deletion_ongoing(&self) -> bool {
        self.deleter.is_ongoing()
    }

    pub fn on_focus(&mut self) {
        self.visibility.on_focus();
    }

    /// Focus loss breaks any packet-key stream; a high surrogate still
    /// waiting for its low half is dropped.
    pub fn on_blur(&mut self) {
        self.visibility.on_blur();
        if self.surrogate.is_waiting() {
            debug!("dropping unpaired high surrogate on blur");
        }
        self.surrogate.reset();
    }

    /// Host told us which UI surfaces we may draw ourselves.
    pub fn on_set_context(&mut self, allowed: u32) {
        self.visibility.on_set_context(allowed);
    }

    /// The host forwarded `message` to the bridge's own UI window; confirm the
    /// speculative visibility test started when it was dispatched.
    pub fn confirm_forwarded(&mut self, message: &NotificationMessage) {
        match message.kind {
            MessageKind::CompositionStarted => self.visibility.on_start_composition(),
            MessageKind::CompositionUpdated => self.visibility.on_composition(),
            MessageKind::CompositionEnded => self.visibility.on_end_composition(),
            MessageKind::CandidateOpened => self.visibility.on_candidate_open(),
            MessageKind::CandidateChanged => self.visibility.on_candidate_change(),
            MessageKind::CandidateClosed => self.visibility.on_candidate_close(message.param_b),
            MessageKind::OpenStatusChanged
            | MessageKind::ConversionModeChanged
            | MessageKind::ReconversionRequested
            | MessageKind::UiRefresh => {}
        }
    }

    fn end_deletion(&mut self) {
        self.deleter.end(self.keyboard.as_mut());
    }
}

impl Drop for InputContext {
    fn drop(&mut self) {
        // Give back any modifiers released for an unfinished deletion.
        if self.deleter.is_ongoing() {
            self.end_deletion();
        }
    }
}
