use crate::error::FilterError;
use log::warn;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;

/// One item of an exclusion expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Id(String),
    /// Every decimal id from the start to the end, inclusive
    Range(RangeInclusive<u64>),
}

/// Which channel ids are eligible for output.
///
/// An id is eligible when it is in the keep-set (or there is no keep-set)
/// and it is not in the deny-set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSelector {
    keep: Option<BTreeSet<String>>,
    deny: BTreeSet<String>,
    deny_ranges: Vec<RangeInclusive<u64>>,
}

impl ChannelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds ids to the keep-set, creating it on first use
    pub fn keep<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep
            .get_or_insert_with(BTreeSet::new)
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn deny<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds parsed exclusion items to the deny-set
    pub fn exclude<I>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = Exclusion>,
    {
        for exclusion in exclusions {
            match exclusion {
                Exclusion::Id(id) => {
                    self.deny.insert(id);
                }
                Exclusion::Range(range) => self.deny_ranges.push(range),
            }
        }
        self
    }

    pub fn is_eligible(&self, channel_id: &str) -> bool {
        let kept = self
            .keep
            .as_ref()
            .is_none_or(|keep| keep.is_empty() || keep.contains(channel_id));
        kept && !self.is_denied(channel_id)
    }

    fn is_denied(&self, channel_id: &str) -> bool {
        if self.deny.contains(channel_id) {
            return true;
        }
        canonical_number(channel_id)
            .is_some_and(|n| self.deny_ranges.iter().any(|range| range.contains(&n)))
    }

    /// The keep-set, if one was given and it is non-empty
    pub fn keep_set(&self) -> Option<&BTreeSet<String>> {
        self.keep.as_ref().filter(|keep| !keep.is_empty())
    }
}

/// Channel ids from a newline-delimited list, skipping blanks and `#` comments
pub fn parse_id_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn read_id_file(path: &Path) -> Result<Vec<String>, FilterError> {
    let content = std::fs::read_to_string(path).map_err(|source| FilterError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_id_lines(&content))
}

/// Parses one exclusion expression.
///
/// Items are comma separated. `N-M` with digits on both sides covers every
/// integer id in between; anything else, including ids containing `-`, is
/// taken literally.
pub fn expand_exclusion(expression: &str) -> Vec<Exclusion> {
    let mut exclusions = Vec::new();

    for item in expression.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match numeric_range(item) {
            Some((low, high)) if low > high => warn!("Ignoring inverted exclusion range '{item}'"),
            Some((low, high)) => exclusions.push(Exclusion::Range(low..=high)),
            None => exclusions.push(Exclusion::Id(item.to_string())),
        }
    }

    exclusions
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn numeric_range(item: &str) -> Option<(u64, u64)> {
    let (low, high) = item.split_once('-')?;
    let (low, high) = (low.trim(), high.trim());
    if !all_digits(low) || !all_digits(high) {
        return None;
    }
    Some((low.parse().ok()?, high.parse().ok()?))
}

/// The id as a number, if it is written exactly as the range would print it
fn canonical_number(id: &str) -> Option<u64> {
    if !all_digits(id) || (id.len() > 1 && id.starts_with('0')) {
        return None;
    }
    id.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keep_set_allows_everything_not_denied() {
        let selector = ChannelSelector::new().deny(["2"]);
        assert!(selector.is_eligible("1"));
        assert!(!selector.is_eligible("2"));
    }

    #[test]
    fn keep_set_restricts() {
        let selector = ChannelSelector::new().keep(["1", "2"]).deny(["2"]);
        assert!(selector.is_eligible("1"));
        assert!(!selector.is_eligible("2"));
        assert!(!selector.is_eligible("3"));
    }

    #[test]
    fn empty_keep_set_behaves_as_absent() {
        let selector = ChannelSelector::new().keep(Vec::<String>::new());
        assert!(selector.is_eligible("anything"));
        assert!(selector.keep_set().is_none());
    }

    #[test]
    fn keep_sources_are_unioned() {
        let selector = ChannelSelector::new().keep(["a"]).keep(["b"]);
        assert!(selector.is_eligible("a"));
        assert!(selector.is_eligible("b"));
        assert_eq!(selector.keep_set().map(BTreeSet::len), Some(2));
    }

    #[test]
    fn id_lines_skip_comments_and_blanks() {
        let ids = parse_id_lines("# header\n bbc1.uk \n\nitv.uk\n#itv2.uk\n");
        assert_eq!(ids, vec!["bbc1.uk", "itv.uk"]);
    }

    #[test]
    fn exclusion_expressions() {
        assert_eq!(expand_exclusion("100-102"), vec![Exclusion::Range(100..=102)]);
        assert_eq!(
            expand_exclusion("5, 7,9-10"),
            vec![
                Exclusion::Id("5".to_string()),
                Exclusion::Id("7".to_string()),
                Exclusion::Range(9..=10)
            ]
        );
        assert_eq!(expand_exclusion("bbc-one.uk"), vec![Exclusion::Id("bbc-one.uk".to_string())]);
        assert!(expand_exclusion("9-3").is_empty());
        assert!(expand_exclusion(" , ").is_empty());
    }

    #[test]
    fn wide_ranges_deny_every_id_inside() {
        let selector = ChannelSelector::new().exclude(expand_exclusion("0-100000"));
        assert!(!selector.is_eligible("0"));
        assert!(!selector.is_eligible("5"));
        assert!(!selector.is_eligible("100000"));
        assert!(selector.is_eligible("100001"));
        assert!(selector.is_eligible("bbc1.uk"));

        let huge = ChannelSelector::new().exclude(expand_exclusion("0-18446744073709551615"));
        assert!(!huge.is_eligible("18446744073709551615"));
    }

    #[test]
    fn range_membership_is_exact() {
        let selector = ChannelSelector::new().exclude(expand_exclusion("5-10"));
        assert!(selector.is_eligible("05"));
        assert!(selector.is_eligible("7.uk"));
        assert!(selector.is_eligible(" 7"));
        assert!(!selector.is_eligible("7"));
    }
}
