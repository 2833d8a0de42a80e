use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bridge_session::InputContext;
use tracing::debug;

use super::host::{BridgeEngine, BridgeKeyboard, ForeignEngine, ForeignKeyboard};
use super::types::{
    BridgeCandidates, BridgeComposition, BridgeInputState, BridgeKeyEvent, BridgeKeyResponse,
    BridgeMessage, BridgeOutput, BridgeTestKeyResponse, BridgeVisibility,
};

/// One input session, bound to one host input context.
#[derive(uniffi::Object)]
pub struct BridgeSession {
    context: Mutex<InputContext>,
}

impl BridgeSession {
    fn context(&self) -> MutexGuard<'_, InputContext> {
        // A panic mid-update leaves the snapshots of the previous update, which
        // are still consistent.
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[uniffi::export]
impl BridgeSession {
    #[uniffi::constructor]
    pub(super) fn new(engine: Arc<dyn BridgeEngine>, keyboard: Arc<dyn BridgeKeyboard>) -> Arc<Self> {
        let context = InputContext::new(
            Box::new(ForeignEngine(engine)),
            Box::new(ForeignKeyboard(keyboard)),
        );
        debug!("bridge session created");
        Arc::new(Self {
            context: Mutex::new(context),
        })
    }

    fn on_test_key(&self, event: BridgeKeyEvent) -> BridgeTestKeyResponse {
        self.context().on_test_key(event.into()).into()
    }

    fn on_key(&self, event: BridgeKeyEvent) -> BridgeKeyResponse {
        self.context().on_key(event.into()).into()
    }

    /// Apply an Output the host obtained from the engine itself.
    fn update_context(&self, output: BridgeOutput) -> BridgeKeyResponse {
        self.context().update_context(output.into()).into()
    }

    fn on_focus(&self) {
        self.context().on_focus();
    }

    fn on_blur(&self) {
        self.context().on_blur();
    }

    fn on_set_context(&self, allowed: u32) {
        self.context().on_set_context(allowed);
    }

    fn confirm_forwarded(&self, message: BridgeMessage) {
        self.context().confirm_forwarded(&message.into());
    }

    fn composition(&self) -> BridgeComposition {
        self.context().composition().into()
    }

    fn candidates(&self) -> BridgeCandidates {
        self.context().candidates().into()
    }

    fn input_state(&self) -> BridgeInputState {
        self.context().input_state().into()
    }

    fn visibility(&self) -> BridgeVisibility {
        let context = self.context();
        let v = context.visibility();
        BridgeVisibility {
            composition_window: v.is_composition_window_visible(),
            candidate_window: v.is_candidate_window_visible(),
            suggest_window: v.is_suggest_window_visible(),
        }
    }

    fn is_composing(&self) -> bool {
        self.context().is_composing()
    }

    fn is_deletion_ongoing(&self) -> bool {
        self.context().is_deletion_ongoing()
    }
}
