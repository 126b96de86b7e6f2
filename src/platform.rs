//! Host Platform Detection
//!
//! Classifies the host from its OS identifier string. Hook installation only
//! happens on POSIX-like hosts (Linux and macOS), everything else is skipped.

use std::{fmt, sync::LazyLock};

use regex::Regex;

static POSIX_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)linux|mac os|macos").expect("POSIX token regex is valid")
});

/// Classification of the host running the hook tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    /// Linux or macOS: Unix permission bits and a `chmod` utility are available.
    Posix,
    /// Any other host. Hook installation is a no-op there.
    Other,
}

impl HostPlatform {
    /// Whether hook scripts can be installed on this platform.
    #[must_use]
    pub const fn supports_hooks(self) -> bool {
        matches!(self, Self::Posix)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => write!(f, "POSIX-like"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Checks whether an OS identifier names Linux or macOS.
///
/// The match is a case-insensitive substring search for `linux`, `mac os`
/// and `macos`, so `"Linux"`, `"Mac OS X"` and `"macos"` all qualify.
///
/// # Examples
///
/// ```
/// use hookup::platform::is_linux_or_macos;
///
/// assert!(is_linux_or_macos("Mac OS X"));
/// assert!(!is_linux_or_macos("Windows 11"));
/// ```
#[must_use]
pub fn is_linux_or_macos(os_identifier: &str) -> bool {
    POSIX_TOKENS.is_match(os_identifier)
}

/// Classifies an OS identifier into a [`HostPlatform`].
#[must_use]
pub fn classify(os_identifier: &str) -> HostPlatform {
    if is_linux_or_macos(os_identifier) {
        HostPlatform::Posix
    } else {
        HostPlatform::Other
    }
}

/// Returns the OS identifier of the running host.
///
/// `override_name` (the `os_name` setting) wins over the compiled-in value.
#[must_use]
pub fn current_os_identifier(override_name: Option<&str>) -> String {
    override_name.map_or_else(|| std::env::consts::OS.to_string(), str::to_string)
}
