//! XMLTV guide filtering
//!
//! The guide is parsed into channel and programme records, each record is
//! checked against the [`ChannelSelector`] and (for programmes) the optional
//! [`DateWindow`], survivors are stripped according to [`StripOptions`], and
//! the result is written back with the input's document-level structure.

pub mod document;
pub mod selection;
pub mod strip;
pub mod window;
pub mod writer;

pub use document::{Channel, Programme, Record, XmlNode, XmltvDocument};
pub use selection::{ChannelSelector, Exclusion, expand_exclusion, parse_id_lines, read_id_file};
pub use strip::StripOptions;
pub use window::{DateWindow, parse_xmltv_timestamp};
pub use writer::write_document;

use crate::error::FilterError;
use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;

/// Everything needed to filter one guide
#[derive(Debug, Clone, Default)]
pub struct EpgOptions {
    pub selector: ChannelSelector,
    pub window: Option<DateWindow>,
    pub strip: StripOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EpgSummary {
    pub channels_read: usize,
    pub channels_kept: usize,
    pub programmes_read: usize,
    pub programmes_kept: usize,
    pub dropped_by_channel: usize,
    pub dropped_by_date: usize,
    pub dropped_bad_timestamp: usize,
    pub malformed_skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    /// Keep-set ids with no `<channel>` in the input, sorted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_channels: Option<Vec<String>>,
}

/// Why a programme was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Keep,
    Channel,
    Date,
    BadTimestamp,
}

fn judge(programme: &Programme, options: &EpgOptions) -> Verdict {
    if !options.selector.is_eligible(programme.channel()) {
        return Verdict::Channel;
    }
    let Some(window) = &options.window else {
        return Verdict::Keep;
    };
    match parse_xmltv_timestamp(programme.start()) {
        Ok(start) if window.contains(start) => Verdict::Keep,
        Ok(_) => Verdict::Date,
        Err(err) => {
            warn!("Dropping programme on '{}': {err}", programme.channel());
            Verdict::BadTimestamp
        }
    }
}

/// Filters a parsed guide, keeping the relative order of surviving records.
pub fn filter_document(document: &XmltvDocument, options: &EpgOptions) -> (XmltvDocument, EpgSummary) {
    let mut summary = EpgSummary {
        malformed_skipped: document.skipped.len(),
        window: options.window.map(|window| window.to_string()),
        ..EpgSummary::default()
    };
    let mut records = Vec::with_capacity(document.records.len());

    for record in &document.records {
        match record {
            Record::Channel(channel) => {
                summary.channels_read += 1;
                if options.selector.is_eligible(channel.id()) {
                    summary.channels_kept += 1;
                    records.push(Record::Channel(options.strip.channel(channel)));
                } else {
                    debug!("Dropping channel '{}'", channel.id());
                }
            }
            Record::Programme(programme) => {
                summary.programmes_read += 1;
                match judge(programme, options) {
                    Verdict::Keep => {
                        summary.programmes_kept += 1;
                        records.push(Record::Programme(options.strip.programme(programme)));
                    }
                    Verdict::Channel => summary.dropped_by_channel += 1,
                    Verdict::Date => summary.dropped_by_date += 1,
                    Verdict::BadTimestamp => summary.dropped_bad_timestamp += 1,
                }
            }
        }
    }

    summary.missing_channels = options.selector.keep_set().map(|keep| {
        let present: std::collections::BTreeSet<&str> = document.channels().map(Channel::id).collect();
        keep.iter()
            .filter(|id| !present.contains(id.as_str()))
            .cloned()
            .collect()
    });

    let filtered = XmltvDocument {
        doctype: document.doctype.clone(),
        root_attributes: document.root_attributes.clone(),
        records,
        skipped: Vec::new(),
    };
    (filtered, summary)
}

/// Reads `input`, filters it and writes the result to `output`.
///
/// Nothing is written unless the whole guide was parsed and filtered.
pub fn filter_file(input: &Path, output: &Path, options: &EpgOptions) -> Result<EpgSummary, FilterError> {
    let content = std::fs::read_to_string(input).map_err(|source| FilterError::Io {
        path: input.display().to_string(),
        source,
    })?;

    let document = XmltvDocument::parse(&content)?;
    info!(
        "Read {} channels and {} programmes from {}",
        document.channels().count(),
        document.programmes().count(),
        input.display()
    );
    if let Some(window) = &options.window {
        info!("Keeping programmes starting {window}");
    }
    if !options.strip.is_noop() {
        info!(
            "Stripping content (nodesc: {}, basic: {})",
            options.strip.nodesc, options.strip.basic
        );
    }

    let (filtered, summary) = filter_document(&document, options);
    let xml = write_document(&filtered)?;
    std::fs::write(output, xml).map_err(|source| FilterError::Output { source })?;
    info!("Output written to: {}", output.display());

    Ok(summary)
}
