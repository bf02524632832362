//! Platform and OS detection predicates.

use std::fmt;

use crate::lov::SharedLov;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-like systems.
    Linux,
    /// Apple macOS.
    Mac,
    /// Microsoft Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Mac => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Detected operating system.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self { os: detect_os() }
    }

    /// Create a platform with explicit values (for testing).
    #[cfg(test)]
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Whether the platform is Linux.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// Whether the platform is macOS.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::Mac
    }

    /// Whether the platform is Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Whether the platform is Unix-like (Linux or macOS).
    #[must_use]
    pub fn is_unix(&self) -> bool {
        !self.is_windows()
    }

    /// Register the `os` enumeration class on a shared LoV registry, so
    /// platform-valued attributes can be validated and defaulted.
    pub fn register_lov(lov: &SharedLov) -> usize {
        lov.register(
            "os",
            &[
                ("linux", "Linux and other Unix-like systems"),
                ("macos", "Apple macOS"),
                ("windows", "Microsoft Windows"),
            ],
        )
    }
}

fn detect_os() -> Os {
    if cfg!(target_os = "windows") {
        Os::Windows
    } else if cfg!(target_os = "macos") {
        Os::Mac
    } else {
        // Default to Linux for other Unix-like systems
        Os::Linux
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn platform_detect_returns_valid() {
        let p = Platform::detect();
        assert!(p.is_linux() || p.is_macos() || p.is_windows());
    }

    #[test]
    fn predicates_are_exclusive() {
        let p = Platform::new(Os::Linux);
        assert!(p.is_linux());
        assert!(p.is_unix());
        assert!(!p.is_windows());
        assert!(!p.is_macos());

        let p = Platform::new(Os::Windows);
        assert!(p.is_windows());
        assert!(!p.is_unix());
    }

    #[test]
    fn os_display() {
        assert_eq!(Os::Linux.to_string(), "linux");
        assert_eq!(Os::Mac.to_string(), "macos");
        assert_eq!(Os::Windows.to_string(), "windows");
    }

    #[test]
    fn register_lov_publishes_os_class() {
        let lov = SharedLov::new();
        assert_eq!(Platform::register_lov(&lov), 3);
        assert_eq!(
            lov.keys("os").unwrap(),
            vec!["linux", "macos", "windows"]
        );
        assert!(lov.lookup("os", "macos").unwrap().contains("macOS"));
    }
}
