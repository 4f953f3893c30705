use super::CommonArgs;
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

/// Filter an XMLTV guide by channel list, playlist membership and date range
#[derive(Debug, Clone, Parser)]
#[command(name = "epg-filter", author, version, about, long_about = None)]
pub struct EpgArgs {
    /// XMLTV guide to read
    #[arg(short, long)]
    pub input: PathBuf,

    /// Newline-delimited channel ids to keep
    #[arg(short, long)]
    pub channels: Option<PathBuf>,

    /// M3U playlist whose tvg-id values are kept
    #[arg(short, long)]
    pub m3u: Option<PathBuf>,

    /// Where to write the filtered guide
    #[arg(short, long)]
    pub output: PathBuf,

    /// Days after the start date to keep (also -df)
    #[arg(long, value_name = "DAYS")]
    pub days_future: Option<u32>,

    /// Days before the start date to keep (also -dp)
    #[arg(long, value_name = "DAYS")]
    pub days_past: Option<u32>,

    /// Anchor date of the window [default: today]
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Channel ids to drop; accepts comma lists and numeric ranges like 100-120
    #[arg(short = 'x', long, num_args = 1.., action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Newline-delimited channel ids to drop (also -xf)
    #[arg(long, value_name = "PATH", action = ArgAction::Append)]
    pub exclude_file: Vec<PathBuf>,

    /// Remove description elements
    #[arg(long)]
    pub nodesc: bool,

    /// Keep only programme attributes and titles
    #[arg(long)]
    pub basic: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}
