use super::extinf::{ATTR_GROUP_TITLE, ATTR_TVG_CHNO, ATTR_TVG_ID, ATTR_TVG_LOGO, Placement};
use super::playlist::Entry;
use clap::ValueEnum;
use log::warn;
use serde::{Deserialize, Serialize};

/// Which attribute(s) receive the running channel number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelFields {
    #[default]
    TvgId,
    TvgChno,
    Both,
}

impl ChannelFields {
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            ChannelFields::TvgId => &[ATTR_TVG_ID],
            ChannelFields::TvgChno => &[ATTR_TVG_CHNO],
            ChannelFields::Both => &[ATTR_TVG_ID, ATTR_TVG_CHNO],
        }
    }
}

/// Rewrites applied to kept entries: replacements, then logo, then numbering
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    pub replacements: Vec<(String, String)>,
    pub logo: Option<String>,
    pub channel_start: Option<u64>,
    pub channel_fields: ChannelFields,
}

/// Entries after rewriting plus what happened along the way
#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
    pub entries: Vec<Entry>,
    /// First and last channel number handed out
    pub numbered: Option<(u64, u64)>,
    /// Entries whose replacements were discarded because they broke the header
    pub replacement_failures: usize,
}

impl Rewriter {
    pub fn is_noop(&self) -> bool {
        self.replacements.is_empty() && self.logo.is_none() && self.channel_start.is_none()
    }

    /// Rewrites entries in output order.
    ///
    /// The channel counter advances once per entry passed in, so callers hand
    /// over only the entries that survived filtering.
    pub fn rewrite(&self, entries: Vec<Entry>) -> RewriteOutcome {
        let mut outcome = RewriteOutcome {
            entries: Vec::with_capacity(entries.len()),
            ..RewriteOutcome::default()
        };
        let mut next_number = self.channel_start;
        let mut exhausted = false;

        for entry in entries {
            let entry = match apply_replacements(&entry, &self.replacements) {
                Some(replaced) => replaced,
                None => {
                    outcome.replacement_failures += 1;
                    entry
                }
            };

            let entry = match &self.logo {
                Some(logo) => apply_logo(&entry, logo),
                None => entry,
            };

            let entry = match next_number {
                Some(number) => {
                    let first = outcome.numbered.map_or(number, |(first, _)| first);
                    outcome.numbered = Some((first, number));
                    next_number = number.checked_add(1);
                    assign_channel_number(&entry, number, self.channel_fields)
                }
                None if self.channel_start.is_some() => {
                    if !exhausted {
                        warn!(
                            "Channel numbers exhausted at {}; '{}' and later entries keep their fields",
                            u64::MAX,
                            entry.name()
                        );
                        exhausted = true;
                    }
                    entry
                }
                None => entry,
            };

            outcome.entries.push(entry);
        }

        outcome
    }
}

/// Returns `None` when the substituted header is no longer an `#EXTINF` line
pub fn apply_replacements(entry: &Entry, pairs: &[(String, String)]) -> Option<Entry> {
    if pairs.is_empty() {
        return Some(entry.clone());
    }
    match entry.header().with_replacements(pairs) {
        Ok(header) => Some(entry.with_header(header)),
        Err(err) => {
            warn!(
                "Keeping original header for '{}': replacements produced {err}",
                entry.name()
            );
            None
        }
    }
}

pub fn apply_logo(entry: &Entry, logo: &str) -> Entry {
    entry.with_header(entry.header().with_attribute(
        ATTR_TVG_LOGO,
        logo,
        Placement::Before(ATTR_GROUP_TITLE),
    ))
}

pub fn assign_channel_number(entry: &Entry, number: u64, fields: ChannelFields) -> Entry {
    let value = number.to_string();
    let header = fields.keys().iter().fold(entry.header().clone(), |header, key| {
        header.with_attribute(key, &value, Placement::AfterDuration)
    });
    entry.with_header(header)
}
