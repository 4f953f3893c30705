//! M3U playlist filtering
//!
//! A playlist is parsed into `#EXTINF`/URL pairs, run through a fixed chain of
//! predicates ([`EntryFilter`]) and then through a fixed chain of rewrites
//! ([`Rewriter`]) before being written back out in its original order.

pub mod extinf;
pub mod filter;
pub mod playlist;
pub mod rewrite;

pub use extinf::{ExtInf, Placement};
pub use filter::{EntryFilter, Predicate};
pub use playlist::{Entry, Playlist, tvg_ids};
pub use rewrite::{ChannelFields, RewriteOutcome, Rewriter};

use crate::error::FilterError;
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

/// Everything needed to filter one playlist
#[derive(Debug, Clone, Default)]
pub struct M3uOptions {
    pub filter: EntryFilter,
    pub rewriter: Rewriter,
}

/// First and last channel number assigned in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberRange {
    pub first: u64,
    pub last: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct M3uSummary {
    pub entries_read: usize,
    pub entries_kept: usize,
    pub dropped_by_include_groups: usize,
    pub dropped_by_include: usize,
    pub dropped_by_exclude: usize,
    pub dropped_by_min_length: usize,
    pub malformed_skipped: usize,
    pub replacements: usize,
    pub replacement_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_numbers: Option<NumberRange>,
}

impl M3uSummary {
    fn record_drop(&mut self, predicate: Predicate) {
        match predicate {
            Predicate::IncludeGroups => self.dropped_by_include_groups += 1,
            Predicate::Include => self.dropped_by_include += 1,
            Predicate::Exclude => self.dropped_by_exclude += 1,
            Predicate::MinLength => self.dropped_by_min_length += 1,
        }
    }
}

/// Filters and rewrites a parsed playlist.
///
/// Entry order is preserved and rewrites only ever see kept entries.
pub fn filter_playlist(playlist: &Playlist, options: &M3uOptions) -> (Playlist, M3uSummary) {
    let mut summary = M3uSummary {
        entries_read: playlist.entries.len(),
        malformed_skipped: playlist.skipped.len(),
        replacements: options.rewriter.replacements.len(),
        logo: options.rewriter.logo.clone(),
        ..M3uSummary::default()
    };

    let kept: Vec<Entry> = playlist
        .entries
        .iter()
        .filter(|entry| match options.filter.rejection(entry) {
            Some(predicate) => {
                debug!("Dropping '{}' ({predicate})", entry.name());
                summary.record_drop(predicate);
                false
            }
            None => true,
        })
        .cloned()
        .collect();

    let outcome = options.rewriter.rewrite(kept);
    summary.entries_kept = outcome.entries.len();
    summary.replacement_failures = outcome.replacement_failures;
    summary.channel_numbers = outcome
        .numbered
        .map(|(first, last)| NumberRange { first, last });

    let filtered = Playlist {
        header: playlist.header.clone(),
        entries: outcome.entries,
        skipped: Vec::new(),
    };
    (filtered, summary)
}

/// Reads `input`, filters it and writes the result to `output`.
///
/// Nothing is written unless the whole playlist was processed.
pub fn filter_file(input: &Path, output: &Path, options: &M3uOptions) -> Result<M3uSummary, FilterError> {
    let content = std::fs::read_to_string(input).map_err(|source| FilterError::Io {
        path: input.display().to_string(),
        source,
    })?;

    let playlist = Playlist::parse(&content);
    info!(
        "Read {} entries from {}",
        playlist.entries.len(),
        input.display()
    );

    let rewriter = &options.rewriter;
    if !rewriter.is_noop() {
        info!(
            "Rewriting kept entries ({} replacements, logo: {}, numbering from: {})",
            rewriter.replacements.len(),
            rewriter.logo.as_deref().unwrap_or("unchanged"),
            rewriter
                .channel_start
                .map_or_else(|| "off".to_string(), |start| start.to_string())
        );
    }

    let (filtered, summary) = filter_playlist(&playlist, options);
    std::fs::write(output, filtered.render()).map_err(|source| FilterError::Output { source })?;
    info!("Output written to: {}", output.display());

    Ok(summary)
}
