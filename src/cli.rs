mod epg;
mod m3u;

use clap::{Args, Parser, ValueEnum};
pub use epg::EpgArgs;
pub use m3u::M3uArgs;
use std::ffi::OsString;
use std::path::PathBuf;

/// Multi-letter single-dash flags accepted for compatibility
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-df", "--days-future"),
    ("-dp", "--days-past"),
    ("-xf", "--exclude-file"),
];

/// Output format of the run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Flags shared by both tools
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// TOML profile supplying default options
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Format of the summary printed after a run
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and skip the summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Rewrites `-df 7` and `-df=7` style flags into their long forms.
///
/// Arguments after a bare `--` are left alone.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            for (legacy, long) in LEGACY_FLAGS {
                if text == *legacy {
                    return OsString::from(*long);
                }
                if let Some(value) = text.strip_prefix(legacy).and_then(|rest| rest.strip_prefix('=')) {
                    return OsString::from(format!("{long}={value}"));
                }
            }
            arg
        })
        .collect()
}

pub fn epg_parse() -> EpgArgs {
    EpgArgs::parse_from(normalize_legacy_flags(std::env::args_os()))
}

pub fn m3u_parse() -> M3uArgs {
    M3uArgs::parse()
}
