//! Input-method bridge: turns host key events and conversion-engine output
//! into the composition and candidate buffers a host reads, plus an ordered
//! batch of notifications.
//!
//! The state machines live in `bridge-core` and the per-session driver in
//! `bridge-session`; this crate exports them over UniFFI.

uniffi::setup_scaffolding!();

pub mod api;
mod trace_init;

pub use bridge_core::settings;
pub use bridge_session::{ClientAction, InputContext, KeyResponse, TestKeyResponse};
