//! Platform detection utilities

use std::fs;

/// Environment classes that decide which speech engine to try
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    /// Linux running under Windows Subsystem for Linux
    Wsl,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// Classify the running system
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "linux" if is_wsl() => Platform::Wsl,
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            _ => Platform::Other,
        }
    }

    /// Whether Windows SAPI can be reached from here
    pub fn has_sapi(self) -> bool {
        matches!(self, Platform::Windows | Platform::Wsl)
    }
}

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks /proc/version for a Microsoft kernel, then the distro variable
/// WSL sets in every session.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_matches_target() {
        let platform = Platform::detect();
        if cfg!(windows) {
            assert_eq!(platform, Platform::Windows);
        } else if cfg!(target_os = "macos") {
            assert_eq!(platform, Platform::MacOs);
        } else if cfg!(target_os = "linux") {
            assert!(matches!(platform, Platform::Linux | Platform::Wsl));
        }
    }

    #[test]
    fn test_sapi_reachability() {
        assert!(Platform::Windows.has_sapi());
        assert!(Platform::Wsl.has_sapi());
        assert!(!Platform::Linux.has_sapi());
        assert!(!Platform::MacOs.has_sapi());
    }
}
