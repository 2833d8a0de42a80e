use tracing::{debug, debug_span, warn};

use bridge_core::deletion::DeletionAction;
use bridge_core::key::{KeyEvent, LogicalKey};
use bridge_core::output::Output;
use bridge_core::surrogate::SurrogateAction;

use super::engine::EngineContext;
use super::response::{ClientAction, KeyResponse, TestKeyResponse};
use super::InputContext;

/// Outcome of offering a key to an in-flight deletion.
enum Routed {
    Handled(ClientAction, bool),
    ApplyPending,
    Continue { aborted: bool },
}

impl InputContext {
    /// Test phase: decide whether the host should eat `event` and deliver it
    /// again in the delivery phase. Engine state is never changed here.
    pub fn on_test_key(&mut self, event: KeyEvent) -> TestKeyResponse {
        let event = event.in_test_phase();
        let _span = debug_span!("on_test_key", ?event).entered();

        let aborted = match self.route_through_deleter(&event) {
            Routed::Handled(action, consumed) => return TestKeyResponse::new(action, consumed),
            // The apply step only ever matches a delivery-phase event.
            Routed::ApplyPending => return TestKeyResponse::new(ClientAction::ConsumeSilently, true),
            Routed::Continue { aborted } => aborted,
        };

        let codepoint = match self.surrogate.on_test_key_event(&event) {
            SurrogateAction::ConsumeSilently => {
                return TestKeyResponse::new(ClientAction::ConsumeSilently, true)
            }
            SurrogateAction::DoDefaultWithCodepoint(cp) => Some(cp),
            SurrogateAction::DoDefault => None,
        };

        let key = self.logical_key(&event, codepoint);
        let context = self.engine_context(true);
        let consumed = match self.engine.evaluate(&key, &context) {
            Ok(output) => output.consumed,
            Err(e) => {
                warn!(error = %e, "engine failed in test phase");
                false
            }
        };
        TestKeyResponse::new(default_action(aborted, codepoint), consumed)
    }

    /// Delivery phase: run `event` through deletion, surrogate reassembly and
    /// the engine, and materialize the resulting Output.
    pub fn on_key(&mut self, event: KeyEvent) -> KeyResponse {
        let event = event.in_delivery_phase();
        let _span = debug_span!("on_key", ?event).entered();

        let aborted = match self.route_through_deleter(&event) {
            Routed::Handled(action, consumed) => return KeyResponse::action_only(action, consumed),
            Routed::ApplyPending => return self.apply_pending_edit(),
            Routed::Continue { aborted } => aborted,
        };

        let codepoint = match self.surrogate.on_key_event(&event) {
            SurrogateAction::ConsumeSilently => {
                return KeyResponse::action_only(ClientAction::ConsumeSilently, true)
            }
            SurrogateAction::DoDefaultWithCodepoint(cp) => Some(cp),
            SurrogateAction::DoDefault => None,
        };

        let key = self.logical_key(&event, codepoint);
        let context = self.engine_context(false);
        let output = match self.engine.evaluate(&key, &context) {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "engine failed; passing key through");
                return KeyResponse::action_only(default_action(aborted, codepoint), false);
            }
        };
        // Unconsumed and empty: the engine has nothing to say about this key,
        // which is not the same as asking to clear the composition.
        if output == Output::default() {
            return KeyResponse::action_only(default_action(aborted, codepoint), false);
        }

        let mut response = self.update_context(output);
        response.action = default_action(aborted, codepoint);
        response
    }

    fn route_through_deleter(&mut self, event: &KeyEvent) -> Routed {
        if !self.deleter.is_ongoing() {
            return Routed::Continue { aborted: false };
        }
        match self
            .deleter
            .on_key_event(event.vkey, event.is_down, event.is_test_phase)
        {
            // A key from before the first backspace. The deferred edit must be
            // the next edit applied, so the engine does not see this one.
            DeletionAction::DoDefault => {
                debug!(vkey = event.vkey, "key passed through while deletion is armed");
                Routed::Handled(ClientAction::DoDefault, false)
            }
            DeletionAction::ForwardToHost => Routed::Handled(ClientAction::ForwardToHost, false),
            DeletionAction::ConsumeSilently => Routed::Handled(ClientAction::ConsumeSilently, true),
            DeletionAction::ApplyPendingNow => Routed::ApplyPending,
            DeletionAction::EndDeletion => {
                self.end_deletion();
                debug!("deletion complete");
                Routed::Handled(ClientAction::ConsumeSilently, true)
            }
            DeletionAction::AbortThenDoDefault => {
                warn!(vkey = event.vkey, "deletion aborted by unexpected key");
                self.end_deletion();
                Routed::Continue { aborted: true }
            }
        }
    }

    fn logical_key(&self, event: &KeyEvent, codepoint: Option<u32>) -> LogicalKey {
        LogicalKey {
            vkey: event.vkey,
            codepoint: codepoint.and_then(char::from_u32),
            is_down: event.is_down,
            modifiers: self.keyboard.modifiers(),
        }
    }

    fn engine_context(&self, is_test_phase: bool) -> EngineContext {
        EngineContext {
            is_test_phase,
            state: self.input_state,
            composing: self.composition.is_composing(),
        }
    }
}

fn default_action(aborted: bool, codepoint: Option<u32>) -> ClientAction {
    match (aborted, codepoint) {
        (true, _) => ClientAction::AbortThenDoDefault,
        (false, Some(cp)) => ClientAction::DoDefaultWithCodepoint(cp),
        (false, None) => ClientAction::DoDefault,
    }
}
