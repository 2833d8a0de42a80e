use bridge_core::input_state::InputState;
use bridge_core::key::LogicalKey;
use bridge_core::output::{Output, SessionCommand};

/// What the engine knows about the session when evaluating a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineContext {
    /// Test-phase queries must not change engine state; only
    /// `Output::consumed` is read from the answer.
    pub is_test_phase: bool,
    pub state: InputState,
    pub composing: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine rejected the request: {0}")]
    Rejected(String),
}

/// The external conversion engine.
pub trait ConversionEngine {
    fn evaluate(&mut self, key: &LogicalKey, context: &EngineContext) -> Result<Output, EngineError>;

    /// Run a follow-up command the engine attached to an earlier Output.
    fn resolve(&mut self, command: &SessionCommand) -> Result<Output, EngineError>;
}
