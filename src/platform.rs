//! Host platform detection and the program names that depend on it.
use std::fmt;

/// Node.js launchers that ship as `.cmd` shims on Windows.
const NODE_SHIMS: &[&str] = &["npm", "npx"];

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux, macOS and other Unix-like systems.
    Unix,
    /// Microsoft Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix => write!(f, "unix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            os: if cfg!(target_os = "windows") {
                Os::Windows
            } else {
                Os::Unix
            },
        }
    }

    /// Create a platform with explicit values (for testing).
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Whether this is Windows.
    #[must_use]
    pub const fn is_windows(&self) -> bool {
        matches!(self.os, Os::Windows)
    }

    /// Name to spawn for `program`.
    ///
    /// On Windows `npm` and `npx` are batch shims that `CreateProcess` only
    /// finds with their `.cmd` suffix; everything else is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsobf_cli::platform::{Os, Platform};
    ///
    /// assert_eq!(Platform::new(Os::Windows).program("npx"), "npx.cmd");
    /// assert_eq!(Platform::new(Os::Windows).program("node"), "node");
    /// assert_eq!(Platform::new(Os::Unix).program("npx"), "npx");
    /// ```
    #[must_use]
    pub fn program(&self, program: &str) -> String {
        if self.is_windows() && NODE_SHIMS.contains(&program) {
            format!("{program}.cmd")
        } else {
            program.to_string()
        }
    }
}
