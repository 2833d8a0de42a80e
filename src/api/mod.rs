//! UniFFI export layer for the input bridge.
//!
//! Each public type here maps to a generated foreign class, struct, enum, or
//! callback interface.

mod host;
mod session;
mod types;

pub use host::{BridgeEngine, BridgeKeyboard};
pub use session::BridgeSession;
pub use types::{
    BridgeAnnotation, BridgeCandidate, BridgeCandidateCategory, BridgeCandidateList,
    BridgeCandidates, BridgeClientAction, BridgeCommand, BridgeComposition,
    BridgeCompositionAttribute, BridgeConversionMode, BridgeDeletionRange, BridgeEngineContext,
    BridgeError, BridgeInputState, BridgeKeyEvent, BridgeKeyResponse, BridgeLogicalKey,
    BridgeMessage, BridgeMessageKind, BridgeModifiers, BridgeOutput, BridgePreedit,
    BridgeResultText, BridgeSegment, BridgeStatus, BridgeSyntheticKey, BridgeTestKeyResponse,
    BridgeVisibility,
};

use std::path::Path;

// ---------------------------------------------------------------------------
// Top-level functions
// ---------------------------------------------------------------------------

#[uniffi::export]
fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Load settings from a TOML file. Must run before the first session is created.
#[uniffi::export]
fn settings_load_config(path: String) -> Result<(), BridgeError> {
    let content = std::fs::read_to_string(&path).map_err(|e| BridgeError::Io {
        msg: format!("{path}: {e}"),
    })?;
    bridge_core::settings::init_custom(content)
        .map_err(|e| BridgeError::InvalidData { msg: e.to_string() })?;
    Ok(())
}

#[uniffi::export]
fn settings_default_config() -> String {
    bridge_core::settings::DEFAULT_SETTINGS_TOML.to_string()
}

/// Host conversion-mode bitmask for `mode`.
#[uniffi::export]
fn conversion_mode_bits(mode: BridgeConversionMode) -> u32 {
    bridge_core::input_state::ConversionMode::from(mode).to_host_bits()
}

/// Start writing JSON traces under `log_dir`. A no-op unless built with the
/// `trace` feature.
#[uniffi::export]
fn trace_init(log_dir: String) -> Result<(), BridgeError> {
    crate::trace_init::init_tracing(Path::new(&log_dir)).map_err(|e| BridgeError::Io {
        msg: format!("{log_dir}: {e}"),
    })
}
