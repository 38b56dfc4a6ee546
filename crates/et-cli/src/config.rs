//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use et_core::{Epic, EpicError, EpicSet, Granularity};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pre-compiled regex for `±HH:MM` offsets.
static OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-])(\d{2}):?(\d{2})$").unwrap());

/// Application configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default bucket size when `--granularity` is not given.
    #[serde(default)]
    pub granularity: Granularity,

    /// Fixed UTC offset for bucket boundaries and floating times (e.g. `-08:00`).
    /// The system time zone is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,

    /// The epics to report on.
    #[serde(default)]
    pub epics: Vec<Epic>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("granularity", &self.granularity)
            .field("utc_offset", &self.utc_offset)
            .field("epics", &self.epics.len())
            .finish()
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ET_*)
        figment = figment.merge(Env::prefixed("ET_"));

        figment.extract()
    }

    /// Builds the validated epic set: unique names, non-blank keywords that compile.
    pub fn epic_set(&self) -> Result<EpicSet, EpicError> {
        EpicSet::try_from(self.epics.clone())
    }

    /// Parses `utc_offset`, if set.
    pub fn fixed_offset(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset.as_deref().map(parse_offset).transpose()
    }

    /// Human-readable name of the time zone reports are computed in.
    pub fn zone_label(&self) -> Result<String> {
        Ok(match self.fixed_offset()? {
            Some(offset) => format!("UTC{offset}"),
            None => iana_time_zone::get_timezone().unwrap_or_else(|_| "local".to_string()),
        })
    }
}

/// Parses `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `±HHMM`.
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).context("invalid UTC offset");
    }
    let caps = OFFSET_RE
        .captures(s)
        .with_context(|| format!("invalid UTC offset: {s} (expected e.g. -08:00)"))?;
    let hours: i32 = caps[2].parse().context("invalid offset hours")?;
    let minutes: i32 = caps[3].parse().context("invalid offset minutes")?;
    let seconds = (hours * 60 + minutes) * 60;
    let seconds = if &caps[1] == "-" { -seconds } else { seconds };
    FixedOffset::east_opt(seconds).with_context(|| format!("UTC offset out of range: {s}"))
}

/// Returns the platform-specific config directory for et.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("et"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_et() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "et");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.granularity, Granularity::Day);
        assert!(config.epics.is_empty());
        assert_eq!(config.fixed_offset().unwrap(), None);
    }

    #[test]
    fn test_load_epics_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"
granularity = "week"
utc_offset = "-08:00"

[[epics]]
name = "Alpha"
keyword = "alpha"

[[epics]]
name = "Delta"
keyword = "Delta"
case_sensitive = true
match_location = true
color = "#ff0000"
"##
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();

        assert_eq!(config.granularity, Granularity::Week);
        assert_eq!(config.zone_label().unwrap(), "UTC-08:00");
        let epics = config.epic_set().unwrap();
        assert_eq!(epics.len(), 2);
        let delta = epics.get("Delta").unwrap();
        assert!(delta.case_sensitive);
        assert!(delta.match_title && delta.match_description && delta.match_location);
        assert_eq!(delta.color, "#ff0000");
    }

    #[test]
    fn test_duplicate_epics_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"
[[epics]]
name = "Alpha"
keyword = "alpha"

[[epics]]
name = "Alpha"
keyword = "beta"
"##
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert!(matches!(
            config.epic_set(),
            Err(EpicError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("-08:00").unwrap().local_minus_utc(), -8 * 3600);
        assert_eq!(parse_offset("+0530").unwrap().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!(parse_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("PST").is_err());
        assert!(parse_offset("+25:00").is_err());
    }
}
