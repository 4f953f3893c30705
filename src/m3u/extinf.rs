use crate::error::RecordError;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

pub const EXTINF_PREFIX: &str = "#EXTINF:";

pub const ATTR_TVG_ID: &str = "tvg-id";
pub const ATTR_TVG_CHNO: &str = "tvg-chno";
pub const ATTR_TVG_NAME: &str = "tvg-name";
pub const ATTR_TVG_LOGO: &str = "tvg-logo";
pub const ATTR_GROUP_TITLE: &str = "group-title";

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z0-9_.:-]+)="([^"]*)""#).expect("valid attribute regex")
});

/// A single `key="value"` pair and where it sits in the header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
    span: Range<usize>,
}

/// Where a missing attribute is inserted into the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Right after the `#EXTINF:<duration>` token
    AfterDuration,
    /// Right before the named attribute, or before the display-name comma
    /// when that attribute is absent
    Before(&'static str),
}

/// A parsed `#EXTINF` header line.
///
/// The line text is the source of truth: attributes and the display name are
/// views into it, and every edit produces a new header by splicing the line
/// and parsing it again. Formatting the parser does not understand survives
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtInf {
    line: String,
    duration_end: usize,
    name_comma: Option<usize>,
    attributes: Vec<Attribute>,
    name: String,
}

impl ExtInf {
    /// Parse a header line. Surrounding whitespace is discarded.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(EXTINF_PREFIX) else {
            return Err(RecordError::NotExtInf(line.to_string()));
        };

        let duration_len = rest
            .find(|c: char| c.is_whitespace() || c == ',')
            .unwrap_or(rest.len());
        let duration_end = EXTINF_PREFIX.len() + duration_len;
        let name_comma = find_unquoted_comma(line, duration_end);
        let region_end = name_comma.unwrap_or(line.len());

        let attributes = ATTRIBUTE_RE
            .captures_iter(&line[duration_end..region_end])
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Attribute {
                    key: caps[1].to_string(),
                    value: caps[2].to_string(),
                    span: duration_end + whole.start()..duration_end + whole.end(),
                })
            })
            .collect();

        let name = name_comma
            .map(|comma| line[comma + 1..].trim().to_string())
            .unwrap_or_default();

        Ok(ExtInf {
            line: line.to_string(),
            duration_end,
            name_comma,
            attributes,
            name,
        })
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// The display name following the attribute list
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> &str {
        &self.line[EXTINF_PREFIX.len()..self.duration_end]
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|attr| (attr.key.as_str(), attr.value.as_str()))
    }

    /// Value of the first attribute named `key`, matched case-insensitively
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.find(key).map(|attr| attr.value.as_str())
    }

    fn find(&self, key: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.key.eq_ignore_ascii_case(key))
    }

    /// Returns a header with `key` set to `value`.
    ///
    /// An existing attribute is overwritten in place; otherwise the pair is
    /// inserted according to `placement`.
    pub fn with_attribute(&self, key: &str, value: &str, placement: Placement) -> ExtInf {
        let pair = format!("{key}=\"{}\"", value.replace('"', "'"));
        let mut line = self.line.clone();

        if let Some(existing) = self.find(key) {
            line.replace_range(existing.span.clone(), &pair);
        } else {
            match placement {
                Placement::AfterDuration => {
                    line.insert_str(self.duration_end, &format!(" {pair}"));
                }
                Placement::Before(anchor) => {
                    if let Some(anchor) = self.find(anchor) {
                        line.insert_str(anchor.span.start, &format!("{pair} "));
                    } else {
                        let at = self.name_comma.unwrap_or(line.len());
                        line.insert_str(at, &format!(" {pair}"));
                    }
                }
            }
        }

        // The prefix is untouched by the splice, so parsing cannot fail here.
        ExtInf::parse(&line).unwrap_or_else(|_| self.clone())
    }

    /// Applies literal `(old, new)` substitutions to the line in order, each
    /// pair operating on the result of the previous one.
    pub fn with_replacements(&self, pairs: &[(String, String)]) -> Result<ExtInf, RecordError> {
        let replaced = pairs
            .iter()
            .filter(|(old, _)| !old.is_empty())
            .fold(self.line.clone(), |line, (old, new)| line.replace(old, new));
        ExtInf::parse(&replaced)
    }
}

fn find_unquoted_comma(line: &str, from: usize) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, ch) in line[from..].char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(from + idx),
            _ => {}
        }
    }
    None
}
