mod simulator;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bridge_core::key::{HostKeyboard, KeyEvent, LogicalKey, ModifierState, SyntheticKey};
use bridge_core::output::{Output, SessionCommand};
use bridge_core::settings::{parse_settings_toml, Settings, DEFAULT_SETTINGS_TOML};

use super::engine::{ConversionEngine, EngineContext, EngineError};
use super::{InputContext, KeyResponse};

/// Everything the scripted engine was asked, and what it will answer next.
#[derive(Debug, Default)]
pub(super) struct EngineLog {
    pub outputs: VecDeque<Output>,
    pub follow_ups: VecDeque<Output>,
    pub evaluated: Vec<(LogicalKey, EngineContext)>,
    pub resolved: Vec<SessionCommand>,
    pub fail: bool,
}

/// Engine answering delivery-phase keys from a queue of Outputs. In the test
/// phase it only peeks at the next Output's `consumed` flag.
#[derive(Clone, Default)]
pub(super) struct ScriptedEngine(pub Arc<Mutex<EngineLog>>);

impl ConversionEngine for ScriptedEngine {
    fn evaluate(&mut self, key: &LogicalKey, context: &EngineContext) -> Result<Output, EngineError> {
        let mut log = self.0.lock().unwrap();
        log.evaluated.push((*key, *context));
        if log.fail {
            return Err(EngineError::Unavailable("scripted failure".to_string()));
        }
        if context.is_test_phase {
            let consumed = log.outputs.front().is_some_and(|o| o.consumed);
            return Ok(Output {
                consumed,
                ..Output::default()
            });
        }
        Ok(log.outputs.pop_front().unwrap_or_default())
    }

    fn resolve(&mut self, command: &SessionCommand) -> Result<Output, EngineError> {
        let mut log = self.0.lock().unwrap();
        log.resolved.push(command.clone());
        log.follow_ups
            .pop_front()
            .ok_or_else(|| EngineError::Rejected(format!("{command:?}")))
    }
}

#[derive(Debug, Default)]
pub(super) struct KeyboardLog {
    pub modifiers: ModifierState,
    pub sent: Vec<SyntheticKey>,
    pub refuse: bool,
}

#[derive(Clone, Default)]
pub(super) struct RecordingKeyboard(pub Arc<Mutex<KeyboardLog>>);

impl HostKeyboard for RecordingKeyboard {
    fn modifiers(&self) -> ModifierState {
        self.0.lock().unwrap().modifiers
    }

    fn set_modifiers(&mut self, state: ModifierState) {
        self.0.lock().unwrap().modifiers = state;
    }

    fn send_input(&mut self, keys: &[SyntheticKey]) -> bool {
        let mut log = self.0.lock().unwrap();
        if log.refuse {
            return false;
        }
        log.sent.extend_from_slice(keys);
        true
    }
}

pub(super) fn default_settings() -> Settings {
    parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap()
}

/// An `InputContext` with handles on its scripted engine and keyboard.
pub(super) struct Harness {
    pub ctx: InputContext,
    pub engine: ScriptedEngine,
    pub keyboard: RecordingKeyboard,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(&default_settings())
    }

    pub fn with_settings(settings: &Settings) -> Self {
        let engine = ScriptedEngine::default();
        let keyboard = RecordingKeyboard::default();
        let ctx = InputContext::with_settings(
            Box::new(engine.clone()),
            Box::new(keyboard.clone()),
            settings,
        );
        Self {
            ctx,
            engine,
            keyboard,
        }
    }

    pub fn script(&self, output: Output) {
        self.engine.0.lock().unwrap().outputs.push_back(output);
    }

    pub fn script_follow_up(&self, output: Output) {
        self.engine.0.lock().unwrap().follow_ups.push_back(output);
    }

    pub fn hold_modifiers(&self, modifiers: ModifierState) {
        self.keyboard.0.lock().unwrap().modifiers = modifiers;
    }

    pub fn modifiers(&self) -> ModifierState {
        self.keyboard.0.lock().unwrap().modifiers
    }

    pub fn take_injected(&self) -> Vec<SyntheticKey> {
        std::mem::take(&mut self.keyboard.0.lock().unwrap().sent)
    }

    /// Deliver `event` the way the host does: test phase first, then the
    /// delivery phase only if the test phase consumed it.
    pub fn press(&mut self, event: KeyEvent) -> Option<KeyResponse> {
        let test = self.ctx.on_test_key(event);
        if !test.consumed {
            return None;
        }
        Some(self.ctx.on_key(event))
    }

    /// Key down then key up.
    pub fn stroke(&mut self, vkey: u8) -> Option<KeyResponse> {
        let down = self.press(KeyEvent::new(vkey, true));
        self.press(KeyEvent::new(vkey, false));
        down
    }
}
