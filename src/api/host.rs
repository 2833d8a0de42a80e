//! Engine and keyboard implemented on the foreign side.
//!
//! Both are called synchronously while the owning session is locked, so an
//! implementation must not call back into that session.

use std::sync::Arc;

use bridge_core::key::{HostKeyboard, LogicalKey, ModifierState, SyntheticKey};
use bridge_core::output::{Output, SessionCommand};
use bridge_session::{ConversionEngine, EngineContext, EngineError};

use super::types::{
    BridgeCommand, BridgeEngineContext, BridgeError, BridgeLogicalKey, BridgeModifiers,
    BridgeOutput, BridgeSyntheticKey,
};

#[uniffi::export(with_foreign)]
pub trait BridgeEngine: Send + Sync {
    fn evaluate(
        &self,
        key: BridgeLogicalKey,
        context: BridgeEngineContext,
    ) -> Result<BridgeOutput, BridgeError>;

    fn resolve(&self, command: BridgeCommand) -> Result<BridgeOutput, BridgeError>;
}

#[uniffi::export(with_foreign)]
pub trait BridgeKeyboard: Send + Sync {
    fn modifiers(&self) -> BridgeModifiers;

    fn set_modifiers(&self, modifiers: BridgeModifiers);

    /// Returns false when the host refused the batch.
    fn send_input(&self, keys: Vec<BridgeSyntheticKey>) -> bool;
}

pub(super) struct ForeignEngine(pub Arc<dyn BridgeEngine>);

fn engine_error(e: BridgeError) -> EngineError {
    match e {
        BridgeError::Engine { msg } | BridgeError::InvalidData { msg } => EngineError::Rejected(msg),
        other => EngineError::Unavailable(other.to_string()),
    }
}

impl ConversionEngine for ForeignEngine {
    fn evaluate(&mut self, key: &LogicalKey, context: &EngineContext) -> Result<Output, EngineError> {
        self.0
            .evaluate(key.into(), context.into())
            .map(Output::from)
            .map_err(engine_error)
    }

    fn resolve(&mut self, command: &SessionCommand) -> Result<Output, EngineError> {
        self.0
            .resolve(command.into())
            .map(Output::from)
            .map_err(engine_error)
    }
}

pub(super) struct ForeignKeyboard(pub Arc<dyn BridgeKeyboard>);

impl HostKeyboard for ForeignKeyboard {
    fn modifiers(&self) -> ModifierState {
        self.0.modifiers().into()
    }

    fn set_modifiers(&mut self, state: ModifierState) {
        self.0.set_modifiers(state.into());
    }

    fn send_input(&mut self, keys: &[SyntheticKey]) -> bool {
        self.0
            .send_input(keys.iter().map(BridgeSyntheticKey::from).collect())
    }
}
