use super::extinf::{ATTR_GROUP_TITLE, ATTR_TVG_ID, ATTR_TVG_NAME, EXTINF_PREFIX, ExtInf};
use crate::error::RecordError;
use log::{trace, warn};
use std::collections::BTreeSet;

pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// One playlist record: an `#EXTINF` header and its stream URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    header: ExtInf,
    url: String,
}

impl Entry {
    pub fn new(header: ExtInf, url: impl Into<String>) -> Self {
        Self {
            header,
            url: url.into(),
        }
    }

    pub fn header(&self) -> &ExtInf {
        &self.header
    }

    /// The raw header line, used for substring exclusion
    pub fn header_line(&self) -> &str {
        self.header.line()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.header.attribute(key)
    }

    pub fn tvg_id(&self) -> Option<&str> {
        self.attribute(ATTR_TVG_ID)
    }

    pub fn tvg_name(&self) -> Option<&str> {
        self.attribute(ATTR_TVG_NAME)
    }

    pub fn group_title(&self) -> Option<&str> {
        self.attribute(ATTR_GROUP_TITLE)
    }

    /// Same URL, different header
    pub fn with_header(&self, header: ExtInf) -> Entry {
        Entry {
            header,
            url: self.url.clone(),
        }
    }
}

/// A parsed extended M3U playlist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    /// The leading `#EXTM3U` line, kept verbatim
    pub header: Option<String>,
    pub entries: Vec<Entry>,
    /// Records that were dropped while parsing
    pub skipped: Vec<RecordError>,
}

impl Playlist {
    /// Parses playlist text into entries.
    ///
    /// An `#EXTINF` line pairs with the next non-blank line when that line is
    /// not itself a directive. Everything else is ignored.
    pub fn parse(content: &str) -> Playlist {
        let lines: Vec<&str> = strip_bom(content).lines().collect();
        let mut playlist = Playlist::default();
        let mut idx = 0;

        while idx < lines.len() {
            let line_number = idx + 1;
            let line = lines[idx].trim();
            idx += 1;

            if line.is_empty() {
                continue;
            }

            if line.starts_with(PLAYLIST_HEADER) {
                if playlist.header.is_none() && playlist.entries.is_empty() {
                    playlist.header = Some(lines[line_number - 1].trim_end().to_string());
                } else {
                    trace!("Ignoring repeated playlist header on line {line_number}");
                }
                continue;
            }

            if !line.starts_with(EXTINF_PREFIX) {
                trace!("Ignoring line {line_number}: {line}");
                continue;
            }

            let mut url_idx = idx;
            while url_idx < lines.len() && lines[url_idx].trim().is_empty() {
                url_idx += 1;
            }

            match lines.get(url_idx).map(|l| l.trim()) {
                Some(url) if !url.starts_with('#') => {
                    match ExtInf::parse(line) {
                        Ok(header) => playlist.entries.push(Entry::new(header, url)),
                        Err(err) => {
                            warn!("Skipping entry on line {line_number}: {err}");
                            playlist.skipped.push(err);
                        }
                    }
                    idx = url_idx + 1;
                }
                _ => {
                    let err = RecordError::MissingUrl {
                        line: line_number,
                    };
                    warn!("Skipping entry: {err}");
                    playlist.skipped.push(err);
                }
            }
        }

        playlist
    }

    /// Serialises the playlist header and entries, one line each
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(header);
            out.push('\n');
        }
        for entry in &self.entries {
            out.push_str(entry.header_line());
            out.push('\n');
            out.push_str(entry.url());
            out.push('\n');
        }
        out
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Collects every non-empty `tvg-id` from the `#EXTINF` lines of a playlist,
/// including headers that have no URL after them.
pub fn tvg_ids(content: &str) -> BTreeSet<String> {
    strip_bom(content)
        .lines()
        .filter(|line| line.trim_start().starts_with(EXTINF_PREFIX))
        .filter_map(|line| ExtInf::parse(line).ok())
        .filter_map(|header| header.attribute(ATTR_TVG_ID).map(str::to_string))
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "#EXTM3U url-tvg=\"http://epg\"\n\
#EXTINF:-1 tvg-id=\"a\" tvg-name=\"Alpha\" group-title=\"News\",Alpha\n\
http://stream/a\n\
\n\
#EXTINF:-1 tvg-id=\"b\" tvg-name=\"Beta\",Beta\n\
#EXTVLCOPT:http-user-agent=x\n\
#EXTINF:-1 tvg-id=\"c\" tvg-name=\"Gamma\",Gamma\n\
\n\
http://stream/c\n\
# a comment\n\
http://stray\n";

    #[test]
    fn byte_order_mark_does_not_hide_header() {
        let content = "\u{feff}#EXTM3U x-tvg-url=\"u\"\n#EXTINF:-1 tvg-id=\"a.uk\" tvg-name=\"A\",A\nhttp://a\n";
        let playlist = Playlist::parse(content);
        assert_eq!(playlist.header.as_deref(), Some("#EXTM3U x-tvg-url=\"u\""));
        assert_eq!(playlist.entries.len(), 1);
        assert!(playlist.render().starts_with("#EXTM3U x-tvg-url"));
        assert!(tvg_ids(content).contains("a.uk"));

        let bare = "\u{feff}#EXTINF:-1 tvg-id=\"b.uk\",B\nhttp://b\n";
        assert_eq!(Playlist::parse(bare).entries.len(), 1);
        assert!(tvg_ids(bare).contains("b.uk"));
    }

    #[test]
    fn parses_pairs_and_header() {
        let playlist = Playlist::parse(SAMPLE);
        assert_eq!(playlist.header.as_deref(), Some("#EXTM3U url-tvg=\"http://epg\""));
        assert_eq!(playlist.entries.len(), 2);
        assert_eq!(playlist.entries[0].tvg_id(), Some("a"));
        assert_eq!(playlist.entries[0].url(), "http://stream/a");
        assert_eq!(playlist.entries[1].tvg_name(), Some("Gamma"));
        assert_eq!(playlist.entries[1].url(), "http://stream/c");
        assert_eq!(playlist.skipped, vec![RecordError::MissingUrl { line: 5 }]);
    }

    #[test]
    fn trailing_header_without_url_is_skipped() {
        let playlist = Playlist::parse("#EXTM3U\n#EXTINF:-1,Only\n");
        assert!(playlist.entries.is_empty());
        assert_eq!(playlist.skipped.len(), 1);
    }

    #[test]
    fn renders_header_then_pairs() {
        let playlist = Playlist::parse(SAMPLE);
        let rendered = playlist.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("#EXTM3U"));
        assert_eq!(lines[2], "http://stream/a");
        assert_eq!(lines[4], "http://stream/c");
    }

    #[test]
    fn playlist_without_header() {
        let playlist = Playlist::parse("#EXTINF:-1,One\nhttp://one\n");
        assert!(playlist.header.is_none());
        assert_eq!(playlist.render(), "#EXTINF:-1,One\nhttp://one\n");
    }

    #[test]
    fn collects_tvg_ids_from_all_headers() {
        let ids = tvg_ids(SAMPLE);
        let expected: BTreeSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, expected);
    }
}
