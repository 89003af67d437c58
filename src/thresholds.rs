//! Resource thresholds and limits configuration
//!
//! Supplies the critical/warning/safe tiers for each environment profile and
//! the file size categories callers use to pick a handling strategy.

use crate::constants::{DEV_ENV_VAR, GB, MB};
use crate::models::{EnvironmentProfile, ResourceThresholds};
use serde::{Deserialize, Serialize};

/// Desktop/production thresholds
pub const DEFAULT_THRESHOLDS: ResourceThresholds = ResourceThresholds {
    critical_memory: 100 * MB,
    critical_cpu: 95.0,
    critical_storage: 500 * MB,

    warning_memory: 500 * MB,
    warning_cpu: 80.0,
    warning_storage: GB,

    safe_memory: GB,
    safe_cpu: 60.0,
    safe_storage: 2 * GB,
};

/// Development thresholds (more lenient)
pub const DEV_THRESHOLDS: ResourceThresholds = ResourceThresholds {
    critical_memory: 50 * MB,
    critical_cpu: 98.0,
    critical_storage: 100 * MB,

    warning_memory: 200 * MB,
    warning_cpu: 90.0,
    warning_storage: 500 * MB,

    safe_memory: 500 * MB,
    safe_cpu: 70.0,
    safe_storage: GB,
};

/// Mobile device thresholds (stricter)
pub const MOBILE_THRESHOLDS: ResourceThresholds = ResourceThresholds {
    critical_memory: 50 * MB,
    critical_cpu: 90.0,
    critical_storage: 200 * MB,

    warning_memory: 200 * MB,
    warning_cpu: 70.0,
    warning_storage: 500 * MB,

    safe_memory: 500 * MB,
    safe_cpu: 50.0,
    safe_storage: GB,
};

/// User-agent substrings that identify a mobile device
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Thresholds for `profile`
pub fn get_thresholds(profile: EnvironmentProfile) -> ResourceThresholds {
    match profile {
        EnvironmentProfile::Mobile => MOBILE_THRESHOLDS,
        EnvironmentProfile::Development => DEV_THRESHOLDS,
        EnvironmentProfile::Desktop => DEFAULT_THRESHOLDS,
    }
}

impl EnvironmentProfile {
    /// Classify a host from its user-agent string and build mode.
    ///
    /// A mobile user agent wins over the development flag; anything
    /// ambiguous lands on the stricter desktop tier.
    pub fn detect(user_agent: Option<&str>, development: bool) -> Self {
        let is_mobile = user_agent
            .map(|ua| {
                let ua = ua.to_ascii_lowercase();
                MOBILE_MARKERS.iter().any(|marker| ua.contains(marker))
            })
            .unwrap_or(false);

        if is_mobile {
            EnvironmentProfile::Mobile
        } else if development {
            EnvironmentProfile::Development
        } else {
            EnvironmentProfile::Desktop
        }
    }

    /// Classify the machine this process runs on
    pub fn from_host() -> Self {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            return EnvironmentProfile::Mobile;
        }
        let development = std::env::var(DEV_ENV_VAR)
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);
        Self::detect(None, development)
    }

    pub fn thresholds(&self) -> ResourceThresholds {
        get_thresholds(*self)
    }
}

/// File size categories for different handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSizeCategory {
    /// < 1MB - no checks needed
    Tiny,
    /// < 10MB - basic checks
    Small,
    /// < 50MB - standard checks
    Medium,
    /// < 200MB - strict checks
    Large,
    /// < 1GB - very strict checks
    Huge,
    /// everything larger
    Massive,
}

impl FileSizeCategory {
    pub fn of(size_bytes: u64) -> Self {
        match size_bytes {
            s if s < MB => FileSizeCategory::Tiny,
            s if s < 10 * MB => FileSizeCategory::Small,
            s if s < 50 * MB => FileSizeCategory::Medium,
            s if s < 200 * MB => FileSizeCategory::Large,
            s if s < GB => FileSizeCategory::Huge,
            _ => FileSizeCategory::Massive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
    const DESKTOP_UA: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36";

    #[test]
    fn test_every_profile_satisfies_ordering() {
        for profile in [
            EnvironmentProfile::Mobile,
            EnvironmentProfile::Desktop,
            EnvironmentProfile::Development,
        ] {
            get_thresholds(profile)
                .validate()
                .unwrap_or_else(|e| panic!("{} thresholds invalid: {}", profile, e));
        }
    }

    #[test]
    fn test_mobile_user_agent_wins_over_development_flag() {
        assert_eq!(EnvironmentProfile::detect(Some(IPHONE_UA), true), EnvironmentProfile::Mobile);
    }

    #[test]
    fn test_development_flag_selects_lenient_profile() {
        assert_eq!(EnvironmentProfile::detect(Some(DESKTOP_UA), true), EnvironmentProfile::Development);
    }

    #[test]
    fn test_ambiguous_detection_defaults_to_desktop() {
        assert_eq!(EnvironmentProfile::detect(None, false), EnvironmentProfile::Desktop);
        assert_eq!(EnvironmentProfile::detect(Some(""), false), EnvironmentProfile::Desktop);
    }

    #[test]
    fn test_marker_match_is_case_insensitive() {
        assert_eq!(
            EnvironmentProfile::detect(Some("Opera Mini/8.0 ANDROID"), false),
            EnvironmentProfile::Mobile
        );
    }

    #[test]
    fn test_mobile_is_stricter_than_desktop_on_cpu() {
        assert!(MOBILE_THRESHOLDS.critical_cpu < DEFAULT_THRESHOLDS.critical_cpu);
        assert!(DEV_THRESHOLDS.critical_cpu > DEFAULT_THRESHOLDS.critical_cpu);
    }

    #[test]
    fn test_file_size_category_boundaries() {
        assert_eq!(FileSizeCategory::of(0), FileSizeCategory::Tiny);
        assert_eq!(FileSizeCategory::of(MB - 1), FileSizeCategory::Tiny);
        assert_eq!(FileSizeCategory::of(MB), FileSizeCategory::Small);
        assert_eq!(FileSizeCategory::of(50 * MB), FileSizeCategory::Large);
        assert_eq!(FileSizeCategory::of(GB - 1), FileSizeCategory::Huge);
        assert_eq!(FileSizeCategory::of(4 * GB), FileSizeCategory::Massive);
    }
}
