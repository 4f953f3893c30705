use env_logger::{Builder, Target};
use log::{LevelFilter, debug};

/// Environment variable holding a level or `module=level` filter list
pub const LOG_ENV_VAR: &str = "IPTV_FILTER_LOG";

fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Level requested on the command line, if any
pub fn cli_level(verbose: u8, quiet: bool) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (true, _) => Some(LevelFilter::Error),
        (false, 0) => None,
        (false, 1) => Some(LevelFilter::Debug),
        (false, _) => Some(LevelFilter::Trace),
    }
}

/// Applies a filter string such as `warn` or `info,iptv_filter::epg=trace`
fn apply_filter(builder: &mut Builder, filter: &str) {
    for directive in filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match directive.split_once('=') {
            Some((module, level)) => {
                builder.filter_module(module.trim(), parse_level(level));
            }
            None => {
                builder.filter_level(parse_level(directive));
            }
        }
    }
}

/// Initialises the global logger, writing to stderr.
///
/// Priority: `-q`, then `-v`, then [`LOG_ENV_VAR`], then `info`.
pub fn init_logger(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();
    builder.target(Target::Stderr).format_timestamp(None);

    match (cli_level(verbose, quiet), std::env::var(LOG_ENV_VAR).ok()) {
        (Some(level), _) => {
            builder.filter_level(level);
        }
        (None, Some(filter)) => apply_filter(&mut builder, &filter),
        (None, None) => {
            builder.filter_level(LevelFilter::Info);
        }
    }

    // A logger may already be installed when running under a test harness.
    if builder.try_init().is_ok() {
        debug!("Log level {}", log::max_level());
    }
}
