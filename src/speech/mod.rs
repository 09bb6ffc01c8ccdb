//! Speech synthesis system

pub mod adapter;
pub mod backends;
pub mod synth;

pub use adapter::{effective_rate, SynthFactory, SynthesisAdapter, SYNTH_VOLUME};
pub use synth::{create_synth, BackendKind, BackendVoice, Synth, SynthSettings};
