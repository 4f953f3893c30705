use super::playlist::Entry;
use serde::Serialize;
use std::fmt;

/// The predicates an entry must pass, in the order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Predicate {
    IncludeGroups,
    Include,
    Exclude,
    MinLength,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::IncludeGroups => write!(f, "include-groups"),
            Predicate::Include => write!(f, "include"),
            Predicate::Exclude => write!(f, "exclude"),
            Predicate::MinLength => write!(f, "min-length"),
        }
    }
}

/// Decides which playlist entries are kept.
///
/// Empty lists and an unset minimum length disable their predicate.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    include_groups: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    min_length: Option<usize>,
    ignore_case: bool,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn including<I, S>(mut self, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = needles.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluding<I, S>(mut self, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = needles.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_length(mut self, min_length: Option<usize>) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// The first predicate the entry fails, or `None` when it is kept
    pub fn rejection(&self, entry: &Entry) -> Option<Predicate> {
        if !self.include_groups.is_empty() {
            let matched = entry.group_title().is_some_and(|group| {
                self.include_groups
                    .iter()
                    .any(|wanted| self.equals(group, wanted))
            });
            if !matched {
                return Some(Predicate::IncludeGroups);
            }
        }

        if !self.include.is_empty() {
            let matched = entry.tvg_name().is_some_and(|name| {
                self.include
                    .iter()
                    .any(|needle| self.contains(name, needle))
            });
            if !matched {
                return Some(Predicate::Include);
            }
        }

        if self
            .exclude
            .iter()
            .any(|needle| self.contains(entry.header_line(), needle))
        {
            return Some(Predicate::Exclude);
        }

        if let Some(min_length) = self.min_length {
            let long_enough = entry
                .tvg_name()
                .is_some_and(|name| name.chars().count() >= min_length);
            if !long_enough {
                return Some(Predicate::MinLength);
            }
        }

        None
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.rejection(entry).is_none()
    }

    fn equals(&self, value: &str, wanted: &str) -> bool {
        if self.ignore_case {
            value.to_lowercase() == wanted.to_lowercase()
        } else {
            value == wanted
        }
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        if self.ignore_case {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        } else {
            haystack.contains(needle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::m3u::extinf::ExtInf;

    fn entry(line: &str) -> Entry {
        Entry::new(ExtInf::parse(line).unwrap(), "http://stream")
    }

    #[test]
    fn groups_match_whole_value_case_sensitive() {
        let news = entry(r#"#EXTINF:-1 tvg-name="A" group-title="News",A"#);
        let filter = EntryFilter::new().with_groups(["News"]);
        assert!(filter.matches(&news));

        let filter = EntryFilter::new().with_groups(["news"]);
        assert_eq!(filter.rejection(&news), Some(Predicate::IncludeGroups));

        let filter = EntryFilter::new().with_groups(["New"]);
        assert!(!filter.matches(&news));
    }

    #[test]
    fn missing_group_is_dropped_when_filtering_groups() {
        let plain = entry(r#"#EXTINF:-1 tvg-name="A",A"#);
        let filter = EntryFilter::new().with_groups(["News"]);
        assert_eq!(filter.rejection(&plain), Some(Predicate::IncludeGroups));
    }

    #[test]
    fn include_checks_tvg_name_only() {
        let e = entry(r#"#EXTINF:-1 tvg-name="Sky Sports" group-title="HD",Sky Sports HD"#);
        assert!(EntryFilter::new().including(["Sports"]).matches(&e));
        assert_eq!(
            EntryFilter::new().including(["HD"]).rejection(&e),
            Some(Predicate::Include)
        );
        assert!(!EntryFilter::new().including(["sports"]).matches(&e));
    }

    #[test]
    fn exclude_scans_whole_header() {
        let e = entry(r#"#EXTINF:-1 tvg-name="Film" group-title="Adult",Film"#);
        assert_eq!(
            EntryFilter::new().excluding(["Adult"]).rejection(&e),
            Some(Predicate::Exclude)
        );
        assert!(EntryFilter::new().excluding(["Kids"]).matches(&e));
    }

    #[test]
    fn min_length_threshold() {
        let e = entry(r#"#EXTINF:-1 tvg-name="ABC",ABC"#);
        assert_eq!(
            EntryFilter::new().min_length(Some(5)).rejection(&e),
            Some(Predicate::MinLength)
        );
        assert!(EntryFilter::new().min_length(Some(2)).matches(&e));
        assert!(EntryFilter::new().min_length(Some(3)).matches(&e));
    }

    #[test]
    fn missing_tvg_name_fails_name_predicates() {
        let e = entry("#EXTINF:-1,Nameless");
        assert!(!EntryFilter::new().including(["Name"]).matches(&e));
        assert!(!EntryFilter::new().min_length(Some(1)).matches(&e));
        assert!(EntryFilter::new().excluding(["zzz"]).matches(&e));
    }

    #[test]
    fn ignore_case_relaxes_matching() {
        let e = entry(r#"#EXTINF:-1 tvg-name="Sky Sports" group-title="News",Sky"#);
        let filter = EntryFilter::new()
            .with_groups(["NEWS"])
            .including(["sports"])
            .ignore_case(true);
        assert!(filter.matches(&e));
        assert!(!EntryFilter::new().excluding(["sky"]).ignore_case(true).matches(&e));
    }

    #[test]
    fn predicates_report_in_fixed_order() {
        let e = entry(r#"#EXTINF:-1 tvg-name="AB" group-title="Other",AB"#);
        let filter = EntryFilter::new()
            .with_groups(["News"])
            .including(["X"])
            .excluding(["AB"])
            .min_length(Some(5));
        assert_eq!(filter.rejection(&e), Some(Predicate::IncludeGroups));
    }
}
