use super::CommonArgs;
use crate::m3u::ChannelFields;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Filter and rewrite the entries of an M3U playlist
#[derive(Debug, Clone, Parser)]
#[command(name = "m3u-filter", author, version, about, long_about = None)]
pub struct M3uArgs {
    /// Playlist to read
    pub input_file: PathBuf,

    /// Where to write the filtered playlist
    pub output_file: PathBuf,

    /// Drop entries whose #EXTINF line contains any of these strings
    #[arg(short, long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Keep only entries whose tvg-name contains one of these strings
    #[arg(short, long, num_args = 1..)]
    pub include: Vec<String>,

    /// Drop entries whose tvg-name is shorter than this
    #[arg(short, long)]
    pub min_length: Option<usize>,

    /// Keep only entries whose group-title is one of these
    #[arg(short = 'g', long, num_args = 1..)]
    pub include_groups: Vec<String>,

    /// Set tvg-logo on every kept entry
    #[arg(short, long, value_name = "URL")]
    pub logo: Option<String>,

    /// Number kept entries starting from this value
    #[arg(short, long)]
    pub channel_start: Option<u64>,

    /// Attribute(s) receiving the channel number [default: tvg-id]
    #[arg(short = 'f', long, value_enum)]
    pub channel_fields: Option<ChannelFields>,

    /// Replace OLD with NEW in each kept #EXTINF line; repeatable
    #[arg(short, long, num_args = 2, value_names = ["OLD", "NEW"], action = ArgAction::Append)]
    pub replace: Vec<String>,

    /// Match include, exclude and include-groups case-insensitively
    #[arg(short = 'I', long)]
    pub ignore_case: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl M3uArgs {
    /// The `--replace` values as (OLD, NEW) pairs in the order given
    pub fn replace_pairs(&self) -> Vec<(String, String)> {
        self.replace
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_flag_surface() {
        let args = M3uArgs::try_parse_from([
            "m3u-filter", "in.m3u", "out.m3u", "-e", "XXX", "Adult", "-i", "HD", "-m", "3", "-g", "News",
            "Sport", "-l", "http://logo", "-c", "100", "-f", "both", "-r", "A", "B", "-r", "B", "C", "-I",
        ])
        .unwrap();
        assert_eq!(args.input_file, PathBuf::from("in.m3u"));
        assert_eq!(args.output_file, PathBuf::from("out.m3u"));
        assert_eq!(args.exclude, vec!["XXX", "Adult"]);
        assert_eq!(args.include, vec!["HD"]);
        assert_eq!(args.min_length, Some(3));
        assert_eq!(args.include_groups, vec!["News", "Sport"]);
        assert_eq!(args.channel_start, Some(100));
        assert_eq!(args.channel_fields, Some(ChannelFields::Both));
        assert_eq!(
            args.replace_pairs(),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "C".to_string())
            ]
        );
        assert!(args.ignore_case);
    }

    #[test]
    fn replace_needs_two_values() {
        assert!(M3uArgs::try_parse_from(["m3u-filter", "in", "out", "-r", "A"]).is_err());
    }

    #[test]
    fn unknown_channel_field_is_rejected() {
        assert!(M3uArgs::try_parse_from(["m3u-filter", "in", "out", "-f", "name"]).is_err());
    }
}
