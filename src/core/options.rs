//! Typed build options.
//!
//! Raw option values come from config files, environment variables and the
//! command line. None of them are rejected: each validation function returns
//! either the validated value or the option's documented default.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::platform::Platform;
use crate::util::config::BuildSettings;

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BuildType {
    #[default]
    Release,
    Debug,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// All build types CMake understands.
    pub const ALL: [BuildType; 4] = [
        BuildType::Release,
        BuildType::Debug,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Release => "Release",
            BuildType::Debug => "Debug",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }

    /// Exact, case-sensitive match; anything else is `Release`.
    pub fn validate(input: &str) -> BuildType {
        input.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown build type `{}`, using Release", input);
            BuildType::Release
        })
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "invalid build type '{}'; expected Release, Debug, RelWithDebInfo or MinSizeRel",
                    s
                )
            })
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An on/off CMake option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Switch::On => "ON",
            Switch::Off => "OFF",
        }
    }

    /// Normalize a raw on/off value, falling back to `default`.
    pub fn normalize(input: &str, default: Switch) -> Switch {
        match input.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Switch::On,
            "off" | "false" | "no" | "0" => Switch::Off,
            _ => {
                tracing::warn!("unrecognized switch value `{}`, using {}", input, default);
                default
            }
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_CXX_STANDARD: i64 = 11;

/// Standards passed through to `CMAKE_CXX_STANDARD`.
pub const SUPPORTED_CXX_STANDARDS: [i64; 3] = [11, 14, 17];

/// Lowest standard accepted off Windows.
const MIN_UNIX_CXX_STANDARD: i64 = 14;

pub const DEFAULT_JOBS: usize = 4;

/// Effective C++ standard for `requested`, or `None` to leave it to CMake.
///
/// Off Windows anything below 14 is raised to 14. Only 11, 14 and 17 are
/// ever emitted.
pub fn effective_cxx_standard(requested: i64, platform: &Platform) -> Option<i64> {
    let standard = if requested < MIN_UNIX_CXX_STANDARD && !platform.is_windows() {
        MIN_UNIX_CXX_STANDARD
    } else {
        requested
    };

    SUPPORTED_CXX_STANDARDS.contains(&standard).then_some(standard)
}

/// A path/compiler override, if it carries a real value.
///
/// Empty strings and the quoted-empty sentinels `""` and `''` mean unset.
pub fn valid_override(value: &str) -> Option<&str> {
    match value {
        "" | "\"\"" | "''" => None,
        v => Some(v),
    }
}

/// Validated configuration for one `build-ext` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    pub build_type: BuildType,
    pub use_mpi: Switch,
    pub timemory_exceptions: Switch,
    /// Only meaningful off Windows.
    pub build_examples: Switch,
    pub cxx_standard: i64,
    pub mpicc: String,
    pub mpicxx: String,
    pub cmake_prefix_path: String,
    pub cmake_include_path: String,
    pub cmake_library_path: String,
    /// Parallel jobs for non-Windows builds.
    pub jobs: usize,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        BuildConfiguration {
            build_type: BuildType::Release,
            use_mpi: Switch::On,
            timemory_exceptions: Switch::Off,
            build_examples: Switch::On,
            cxx_standard: DEFAULT_CXX_STANDARD,
            mpicc: String::new(),
            mpicxx: String::new(),
            cmake_prefix_path: String::new(),
            cmake_include_path: String::new(),
            cmake_library_path: String::new(),
            jobs: DEFAULT_JOBS,
        }
    }
}

impl BuildConfiguration {
    /// Validate raw settings, substituting defaults for anything unusable.
    pub fn from_settings(settings: &BuildSettings) -> Self {
        let defaults = BuildConfiguration::default();
        let switch = |raw: &Option<String>, default: Switch| {
            raw.as_deref()
                .map_or(default, |value| Switch::normalize(value, default))
        };
        let string = |raw: &Option<String>| raw.clone().unwrap_or_default();

        let jobs = match settings.jobs {
            Some(0) => {
                tracing::warn!("jobs must be at least 1, using {}", DEFAULT_JOBS);
                DEFAULT_JOBS
            }
            Some(n) => n,
            None => defaults.jobs,
        };

        BuildConfiguration {
            build_type: settings
                .build_type
                .as_deref()
                .map_or(defaults.build_type, BuildType::validate),
            use_mpi: switch(&settings.use_mpi, defaults.use_mpi),
            timemory_exceptions: switch(
                &settings.timemory_exceptions,
                defaults.timemory_exceptions,
            ),
            build_examples: switch(&settings.build_examples, defaults.build_examples),
            cxx_standard: settings.cxx_standard.unwrap_or(defaults.cxx_standard),
            mpicc: string(&settings.mpicc),
            mpicxx: string(&settings.mpicxx),
            cmake_prefix_path: string(&settings.cmake_prefix_path),
            cmake_include_path: string(&settings.cmake_include_path),
            cmake_library_path: string(&settings.cmake_library_path),
            jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::System;

    fn linux() -> Platform {
        Platform::new(System::Linux, true)
    }

    fn windows() -> Platform {
        Platform::new(System::Windows, true)
    }

    #[test]
    fn test_build_type_accepts_known_values() {
        for t in BuildType::ALL {
            assert_eq!(BuildType::validate(t.as_str()), t);
        }
    }

    #[test]
    fn test_build_type_falls_back_to_release() {
        assert_eq!(BuildType::validate("debug"), BuildType::Release);
        assert_eq!(BuildType::validate("Profile"), BuildType::Release);
        assert_eq!(BuildType::validate(""), BuildType::Release);
    }

    #[test]
    fn test_switch_normalize() {
        assert_eq!(Switch::normalize("on", Switch::Off), Switch::On);
        assert_eq!(Switch::normalize("ON", Switch::Off), Switch::On);
        assert_eq!(Switch::normalize("false", Switch::On), Switch::Off);
        assert_eq!(Switch::normalize(" 0 ", Switch::On), Switch::Off);
        assert_eq!(Switch::normalize("maybe", Switch::On), Switch::On);
        assert_eq!(Switch::normalize("maybe", Switch::Off), Switch::Off);
    }

    #[test]
    fn test_cxx_standard_raised_off_windows() {
        assert_eq!(effective_cxx_standard(11, &linux()), Some(14));
        assert_eq!(effective_cxx_standard(3, &linux()), Some(14));
        assert_eq!(effective_cxx_standard(-1, &linux()), Some(14));
        assert_eq!(effective_cxx_standard(14, &linux()), Some(14));
        assert_eq!(effective_cxx_standard(17, &linux()), Some(17));
    }

    #[test]
    fn test_cxx_standard_unsupported_is_omitted() {
        assert_eq!(effective_cxx_standard(20, &linux()), None);
        assert_eq!(effective_cxx_standard(15, &linux()), None);
        assert_eq!(effective_cxx_standard(98, &windows()), None);
        assert_eq!(effective_cxx_standard(3, &windows()), None);
    }

    #[test]
    fn test_cxx_standard_windows_keeps_11() {
        assert_eq!(effective_cxx_standard(11, &windows()), Some(11));
        assert_eq!(effective_cxx_standard(17, &windows()), Some(17));
    }

    #[test]
    fn test_valid_override() {
        assert_eq!(valid_override(""), None);
        assert_eq!(valid_override("\"\""), None);
        assert_eq!(valid_override("''"), None);
        assert_eq!(valid_override("/usr/bin/mpicc"), Some("/usr/bin/mpicc"));
    }

    #[test]
    fn test_from_settings_defaults() {
        let config = BuildConfiguration::from_settings(&BuildSettings::default());

        assert_eq!(config, BuildConfiguration::default());
        assert_eq!(config.use_mpi, Switch::On);
        assert_eq!(config.timemory_exceptions, Switch::Off);
        assert_eq!(config.cxx_standard, 11);
    }

    #[test]
    fn test_from_settings_normalizes() {
        let settings = BuildSettings {
            build_type: Some("Fast".to_string()),
            use_mpi: Some("off".to_string()),
            timemory_exceptions: Some("sometimes".to_string()),
            jobs: Some(0),
            cxx_standard: Some(17),
            ..BuildSettings::default()
        };
        let config = BuildConfiguration::from_settings(&settings);

        assert_eq!(config.build_type, BuildType::Release);
        assert_eq!(config.use_mpi, Switch::Off);
        assert_eq!(config.timemory_exceptions, Switch::Off);
        assert_eq!(config.jobs, DEFAULT_JOBS);
        assert_eq!(config.cxx_standard, 17);
    }
}
