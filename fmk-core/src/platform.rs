// SPDX-License-Identifier: AGPL-3.0-or-later
//! Platform-specific abstractions

use std::io;

/// Platform capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Mounted volumes and their usage can be enumerated
    pub volume_info: bool,
}

impl PlatformCapabilities {
    pub fn detect() -> Self {
        Self {
            volume_info: cfg!(any(
                target_os = "linux",
                target_os = "macos",
                target_os = "windows",
                target_os = "freebsd"
            )),
        }
    }

    pub fn minimal() -> Self {
        Self { volume_info: false }
    }
}

/// Whether a rename failed because source and target are on different devices
pub fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = libc::EXDEV;
    // ERROR_NOT_SAME_DEVICE
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17;
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    err.raw_os_error() == Some(CROSS_DEVICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_has_no_volumes() {
        assert!(!PlatformCapabilities::minimal().volume_info);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_detect_linux() {
        assert!(PlatformCapabilities::detect().volume_info);
    }

    #[test]
    fn test_is_cross_device() {
        assert!(!is_cross_device(&io::Error::new(io::ErrorKind::Other, "x")));
        #[cfg(unix)]
        assert!(is_cross_device(&io::Error::from_raw_os_error(libc::EXDEV)));
    }
}
