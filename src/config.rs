use crate::m3u::ChannelFields;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Defaults for both tools, loaded from `--config`.
///
/// Command-line values win over profile values; list options given on the
/// command line replace the profile's list and boolean flags are OR-ed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub epg: EpgProfile,
    pub m3u: M3uProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpgProfile {
    pub channels: Option<PathBuf>,
    pub m3u: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub exclude_files: Vec<PathBuf>,
    pub days_past: Option<u32>,
    pub days_future: Option<u32>,
    pub start: Option<NaiveDate>,
    pub nodesc: bool,
    pub basic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct M3uProfile {
    pub exclude: Vec<String>,
    pub include: Vec<String>,
    pub min_length: Option<usize>,
    pub include_groups: Vec<String>,
    pub logo: Option<String>,
    pub channel_start: Option<u64>,
    pub channel_fields: Option<ChannelFields>,
    /// `[["OLD", "NEW"], ...]`
    pub replace: Vec<(String, String)>,
    pub ignore_case: bool,
}

/// The command-line list when one was given, otherwise the profile's
pub fn prefer_list<T: Clone>(cli: &[T], profile: &[T]) -> Vec<T> {
    if cli.is_empty() { profile.to_vec() } else { cli.to_vec() }
}

pub fn load_config(path: Option<&Path>) -> Result<FilterConfig, ConfigError> {
    match path {
        Some(path) => load_config_from_path(path),
        None => Ok(FilterConfig::default()),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FilterConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<FilterConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_tables() {
        let config: FilterConfig = toml::from_str(
            r#"
            [epg]
            channels = "keep.txt"
            exclude = ["100-120", "foo.uk"]
            days_future = 7
            start = "2024-01-01"
            nodesc = true

            [m3u]
            min_length = 3
            channel_fields = "tvg-chno"
            replace = [["HD", ""], ["FHD", "HD"]]
            unknown_key = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.epg.channels, Some(PathBuf::from("keep.txt")));
        assert_eq!(config.epg.days_future, Some(7));
        assert_eq!(config.epg.days_past, None);
        assert_eq!(config.epg.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(config.epg.nodesc && !config.epg.basic);
        assert_eq!(config.m3u.min_length, Some(3));
        assert_eq!(config.m3u.channel_fields, Some(ChannelFields::TvgChno));
        assert_eq!(config.m3u.replace[1], ("FHD".to_string(), "HD".to_string()));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: FilterConfig = toml::from_str("").unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_config(Some(Path::new("/nonexistent/profile.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn command_line_lists_replace_profile_lists() {
        let profile = vec!["a".to_string()];
        assert_eq!(prefer_list(&[], &profile), profile);
        assert_eq!(prefer_list(&["b".to_string()], &profile), vec!["b".to_string()]);
    }
}
