use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Which outputs a decode run produces.
///
/// ```text
/// ┌────────────┬──────┬──────────────────────────────────────────────┐
/// │ Field      │ Flag │ Output                                       │
/// ├────────────┼──────┼──────────────────────────────────────────────┤
/// │ pulseview  │ -p   │ per-channel samples packaged as <base>.sr    │
/// │ motor_csv  │ -c   │ <base>_motor_data.csv                        │
/// │ spot_csv   │ -s   │ <base>_spot_values.csv                       │
/// │ json       │ -j   │ <base>.json, both header blocks verbatim     │
/// └────────────┴──────┴──────────────────────────────────────────────┘
/// ```
///
/// Selecting nothing selects everything, the same as `-a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputSelection {
    pub pulseview: bool,
    pub motor_csv: bool,
    pub spot_csv: bool,
    pub json: bool,
}

impl OutputSelection {
    pub const ALL: Self = Self {
        pulseview: true,
        motor_csv: true,
        spot_csv: true,
        json: true,
    };

    /// Resolve individual flags plus the "all" switch.
    #[must_use]
    pub fn from_flags(pulseview: bool, motor_csv: bool, spot_csv: bool, json: bool, all: bool) -> Self {
        let picked = Self {
            pulseview,
            motor_csv,
            spot_csv,
            json,
        };
        if all || picked.is_empty() { Self::ALL } else { picked }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.pulseview || self.motor_csv || self.spot_csv || self.json)
    }

    /// Whether any selected output needs the record stream decoded.
    #[must_use]
    pub fn needs_records(&self) -> bool {
        self.pulseview || self.motor_csv || self.spot_csv
    }
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self::ALL
    }
}

/// Destination file names derived from one base path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub base: PathBuf,
    pub motor_csv: PathBuf,
    pub spot_csv: PathBuf,
    pub json: PathBuf,
    pub pulseview: PathBuf,
}

impl OutputPaths {
    #[must_use]
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            motor_csv: with_suffix(&base, "_motor_data.csv"),
            spot_csv: with_suffix(&base, "_spot_values.csv"),
            json: with_suffix(&base, ".json"),
            pulseview: with_suffix(&base, ".sr"),
            base,
        }
    }

    /// Default base for a source log: the source path with its final
    /// extension removed.
    #[must_use]
    pub fn base_for_source(source: &Path) -> PathBuf {
        source.with_extension("")
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_means_everything() {
        assert_eq!(
            OutputSelection::from_flags(false, false, false, false, false),
            OutputSelection::ALL
        );
        assert_eq!(
            OutputSelection::from_flags(false, true, false, false, true),
            OutputSelection::ALL
        );
    }

    #[test]
    fn explicit_flags_are_kept() {
        let json_only = OutputSelection::from_flags(false, false, false, true, false);
        assert!(json_only.json);
        assert!(!json_only.motor_csv);
        assert!(!json_only.needs_records());
    }

    #[test]
    fn names_derive_from_base() {
        let paths = OutputPaths::from_base("/data/run.7");
        assert_eq!(paths.motor_csv, Path::new("/data/run.7_motor_data.csv"));
        assert_eq!(paths.spot_csv, Path::new("/data/run.7_spot_values.csv"));
        assert_eq!(paths.json, Path::new("/data/run.7.json"));
        assert_eq!(paths.pulseview, Path::new("/data/run.7.sr"));
    }

    #[test]
    fn source_extension_is_dropped() {
        assert_eq!(OutputPaths::base_for_source(Path::new("logs/m1.bin")), Path::new("logs/m1"));
        assert_eq!(OutputPaths::base_for_source(Path::new("capture")), Path::new("capture"));
    }
}
