//! Leaf components of the key-event-to-composition-state bridge.
//!
//! Everything here is a pure state machine or value builder; the per-session
//! driver that wires them together lives in `bridge-session`.

pub mod candidate;
pub mod composition;
pub mod deletion;
pub mod input_state;
pub mod key;
pub mod message;
pub mod output;
pub mod sequencer;
pub mod settings;
pub mod surrogate;
pub mod unicode;
pub mod visibility;
