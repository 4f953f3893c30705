use crate::cli::OutputFormat;
use crate::epg::EpgSummary;
use crate::m3u::M3uSummary;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

/// Ids listed in full before the preview is shortened
const PREVIEW_LIMIT: usize = 10;
const PREVIEW_EDGE: usize = 5;

/// A run summary that can be printed as a two-column table or as JSON
pub trait RunSummary: Serialize {
    fn title(&self) -> &'static str;

    /// Label/value rows in display order
    fn rows(&self) -> Vec<(&'static str, String)>;
}

impl RunSummary for EpgSummary {
    fn title(&self) -> &'static str {
        "EPG FILTER SUMMARY"
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Channels read", self.channels_read.to_string()),
            ("Channels kept", self.channels_kept.to_string()),
            ("Programmes read", self.programmes_read.to_string()),
            ("Programmes kept", self.programmes_kept.to_string()),
            ("Dropped by channel", self.dropped_by_channel.to_string()),
            ("Dropped by date", self.dropped_by_date.to_string()),
            ("Dropped, bad timestamp", self.dropped_bad_timestamp.to_string()),
            ("Malformed records skipped", self.malformed_skipped.to_string()),
        ];
        if let Some(window) = &self.window {
            rows.push(("Date window", window.clone()));
        }
        if let Some(missing) = &self.missing_channels {
            let value = if missing.is_empty() {
                "none".to_string()
            } else {
                format!("{} ({})", missing.len(), preview_ids(missing))
            };
            rows.push(("Missing channels", value));
        }
        rows
    }
}

impl RunSummary for M3uSummary {
    fn title(&self) -> &'static str {
        "M3U FILTER SUMMARY"
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Entries read", self.entries_read.to_string()),
            ("Entries kept", self.entries_kept.to_string()),
            ("Dropped by include-groups", self.dropped_by_include_groups.to_string()),
            ("Dropped by include", self.dropped_by_include.to_string()),
            ("Dropped by exclude", self.dropped_by_exclude.to_string()),
            ("Dropped by min-length", self.dropped_by_min_length.to_string()),
            ("Malformed entries skipped", self.malformed_skipped.to_string()),
        ];
        if self.replacements > 0 {
            rows.push(("Replacement pairs", self.replacements.to_string()));
            rows.push(("Replacements reverted", self.replacement_failures.to_string()));
        }
        if let Some(logo) = &self.logo {
            rows.push(("Logo", logo.clone()));
        }
        if let Some(range) = &self.channel_numbers {
            rows.push(("Channel numbers", format!("{}-{}", range.first, range.last)));
        }
        rows
    }
}

/// Shortens a sorted id list to its first and last few entries
pub fn preview_ids(ids: &[String]) -> String {
    if ids.len() <= PREVIEW_LIMIT {
        return ids.join(", ");
    }
    let head = ids[..PREVIEW_EDGE].join(", ");
    let tail = ids[ids.len() - PREVIEW_EDGE..].join(", ");
    format!("{head}, ..., {tail}")
}

pub fn format_summary_text<S: RunSummary>(summary: &S) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
    for (label, value) in summary.rows() {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }

    format!("{}\n{table}\n", summary.title().bold().bright_white())
}

pub fn format_summary_json<S: RunSummary>(summary: &S) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// Prints the summary to stdout in the requested format
pub fn print_summary<S: RunSummary>(summary: &S, format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Text => print!("{}", format_summary_text(summary)),
        OutputFormat::Json => println!("{}", format_summary_json(summary)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::m3u::NumberRange;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("ch{i:02}")).collect()
    }

    #[test]
    fn short_lists_are_shown_whole() {
        assert_eq!(preview_ids(&ids(3)), "ch01, ch02, ch03");
        assert_eq!(preview_ids(&ids(10)).matches(", ").count(), 9);
    }

    #[test]
    fn long_lists_show_both_ends() {
        assert_eq!(
            preview_ids(&ids(12)),
            "ch01, ch02, ch03, ch04, ch05, ..., ch08, ch09, ch10, ch11, ch12"
        );
    }

    #[test]
    fn json_omits_unset_optionals() {
        let summary = M3uSummary {
            entries_read: 2,
            entries_kept: 1,
            ..M3uSummary::default()
        };
        let json: serde_json::Value = serde_json::from_str(&format_summary_json(&summary).unwrap()).unwrap();
        assert_eq!(json["entries_kept"], 1);
        assert!(json.get("logo").is_none());
        assert!(json.get("channel_numbers").is_none());
    }

    #[test]
    fn text_lists_channel_range() {
        colored::control::set_override(false);
        let summary = M3uSummary {
            channel_numbers: Some(NumberRange { first: 100, last: 101 }),
            ..M3uSummary::default()
        };
        let text = format_summary_text(&summary);
        assert!(text.starts_with("M3U FILTER SUMMARY"));
        assert!(text.contains("100-101"));
    }

    #[test]
    fn epg_rows_report_missing_channels() {
        let summary = EpgSummary {
            missing_channels: Some(vec!["x.uk".to_string()]),
            ..EpgSummary::default()
        };
        let rows = summary.rows();
        assert!(rows.contains(&("Missing channels", "1 (x.uk)".to_string())));
    }
}
