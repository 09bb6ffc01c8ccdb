//! Voicecraft - text-to-speech over HTTP
//!
//! Turns text into WAV audio through a platform speech engine, with voice
//! personas, speed control, and a sample-rate based pitch shift. Generated
//! files are tracked and swept away periodically.

pub mod artifacts;
pub mod audio;
pub mod error;
pub mod platform;
pub mod server;
pub mod service;
pub mod speech;
pub mod state;
pub mod voices;

pub use error::{Result, VoicecraftError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "voicecraft";
