//! Host tags attached to timing points.

/// Who and where a phase ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentTags {
    pub user: String,
    pub os: String,
    pub os_version: String,
}

impl EnvironmentTags {
    /// Detect tags for the current process.
    pub fn detect() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            user,
            os: std::env::consts::OS.to_string(),
            os_version: os_release().unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[cfg(unix)]
fn os_release() -> Option<String> {
    // SAFETY: utsname is plain old data; an all-zero value is valid and
    // uname only writes NUL-terminated strings into its fixed-size fields.
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut uts) } != 0 {
        return None;
    }
    // SAFETY: release is NUL-terminated after a successful uname call.
    let release = unsafe { std::ffi::CStr::from_ptr(uts.release.as_ptr()) };
    Some(release.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn os_release() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_fills_every_tag() {
        let tags = EnvironmentTags::detect();
        assert!(!tags.user.is_empty());
        assert_eq!(tags.os, std::env::consts::OS);
        assert!(!tags.os_version.is_empty());
    }
}
