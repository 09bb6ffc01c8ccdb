//! Platform-specific speech backends

// espeak-ng subprocess backend (Linux, macOS, WSL)
pub mod espeak;

// Windows SAPI backend through PowerShell (Windows, WSL)
pub mod sapi;
