pub mod cli;
pub mod config;
pub mod epg;
pub mod error;
pub mod logging;
pub mod m3u;
pub mod report;

use crate::config::{EpgProfile, M3uProfile, load_config, prefer_list};
use crate::epg::{
    ChannelSelector, DateWindow, EpgOptions, Exclusion, StripOptions, expand_exclusion, read_id_file,
};
use crate::m3u::{EntryFilter, M3uOptions, Rewriter};
use anyhow::Context;
use chrono::NaiveDate;
use log::{info, warn};
pub use cli::{EpgArgs, M3uArgs, OutputFormat};
pub use error::{FilterError, RecordError};
use std::path::Path;

fn read_playlist_ids(path: &Path) -> Result<Vec<String>, FilterError> {
    let content = std::fs::read_to_string(path).map_err(|source| FilterError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(m3u::tvg_ids(&content).into_iter().collect())
}

/// Resolves EPG options from the command line and profile.
///
/// Fails when a keep-set source is given but yields no ids.
pub fn build_epg_options(args: &EpgArgs, profile: &EpgProfile, today: NaiveDate) -> Result<EpgOptions, FilterError> {
    let channels = args.channels.as_ref().or(profile.channels.as_ref());
    let playlist = args.m3u.as_ref().or(profile.m3u.as_ref());

    let mut selector = ChannelSelector::new();
    if channels.is_some() || playlist.is_some() {
        let mut keep = Vec::new();
        if let Some(path) = channels {
            let ids = read_id_file(path)?;
            info!("Loaded {} channel ids from {}", ids.len(), path.display());
            keep.extend(ids);
        }
        if let Some(path) = playlist {
            let ids = read_playlist_ids(path)?;
            info!("Loaded {} tvg-ids from {}", ids.len(), path.display());
            keep.extend(ids);
        }
        if keep.is_empty() {
            let sources: Vec<String> = channels
                .into_iter()
                .chain(playlist)
                .map(|path| path.display().to_string())
                .collect();
            return Err(FilterError::EmptyChannelSource {
                path: sources.join(", "),
            });
        }
        selector = selector.keep(keep);
    }

    let mut deny = Vec::new();
    for expression in prefer_list(&args.exclude, &profile.exclude) {
        deny.extend(expand_exclusion(&expression));
    }
    for path in prefer_list(&args.exclude_file, &profile.exclude_files) {
        let lines = read_id_file(&path)?;
        deny.extend(lines.iter().flat_map(|line| expand_exclusion(line)));
    }
    if !deny.is_empty() {
        let ranges = deny.iter().filter(|item| matches!(item, Exclusion::Range(_))).count();
        info!("Excluding {} channel ids and {ranges} id ranges", deny.len() - ranges);
    }
    selector = selector.exclude(deny);

    let window = DateWindow::from_options(
        args.days_past.or(profile.days_past),
        args.days_future.or(profile.days_future),
        args.start.or(profile.start),
        today,
    )?;

    Ok(EpgOptions {
        selector,
        window,
        strip: StripOptions {
            nodesc: args.nodesc || profile.nodesc,
            basic: args.basic || profile.basic,
        },
    })
}

/// Resolves M3U options from the command line and profile
pub fn build_m3u_options(args: &M3uArgs, profile: &M3uProfile) -> M3uOptions {
    let filter = EntryFilter::new()
        .with_groups(prefer_list(&args.include_groups, &profile.include_groups))
        .including(prefer_list(&args.include, &profile.include))
        .excluding(prefer_list(&args.exclude, &profile.exclude))
        .min_length(args.min_length.or(profile.min_length))
        .ignore_case(args.ignore_case || profile.ignore_case);

    let replacements = prefer_list(&args.replace_pairs(), &profile.replace);
    for (old, _) in &replacements {
        if old.is_empty() {
            warn!("Ignoring replacement with an empty search string");
        }
    }

    let rewriter = Rewriter {
        replacements,
        logo: args.logo.clone().or_else(|| profile.logo.clone()),
        channel_start: args.channel_start.or(profile.channel_start),
        channel_fields: args.channel_fields.or(profile.channel_fields).unwrap_or_default(),
    };

    M3uOptions { filter, rewriter }
}

/// Entry point of the `epg-filter` binary
pub fn run_epg() -> anyhow::Result<()> {
    let args = cli::epg_parse();
    logging::init_logger(args.common.verbose, args.common.quiet);

    let config = load_config(args.common.config.as_deref())?;
    let today = chrono::Local::now().date_naive();
    let options = build_epg_options(&args, &config.epg, today).context("Invalid channel or date options")?;

    let summary = epg::filter_file(&args.input, &args.output, &options)
        .with_context(|| format!("Failed to filter guide '{}'", args.input.display()))?;

    if !args.common.quiet {
        report::print_summary(&summary, args.common.format)?;
    }
    Ok(())
}

/// Entry point of the `m3u-filter` binary
pub fn run_m3u() -> anyhow::Result<()> {
    let args = cli::m3u_parse();
    logging::init_logger(args.common.verbose, args.common.quiet);

    let config = load_config(args.common.config.as_deref())?;
    let options = build_m3u_options(&args, &config.m3u);

    let summary = m3u::filter_file(&args.input_file, &args.output_file, &options)
        .with_context(|| format!("Failed to filter playlist '{}'", args.input_file.display()))?;

    if !args.common.quiet {
        report::print_summary(&summary, args.common.format)?;
    }
    Ok(())
}
