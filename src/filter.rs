//! Predicates that decide which file entries to extract.

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::file::CabFileEntry;

/// Decides whether a file entry should be extracted.
pub trait FileFilter {
    fn matches(&self, entry: &CabFileEntry) -> bool;
}

/// Accepts every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl FileFilter for AcceptAll {
    fn matches(&self, _entry: &CabFileEntry) -> bool {
        true
    }
}

/// Accepts entries whose name is in a fixed set, compared
/// case-insensitively against the full stored name (which may carry a
/// backslash-delimited path).
#[derive(Debug, Clone)]
pub struct NameSetFilter {
    names: Vec<String>,
}

impl NameSetFilter {
    pub fn new<I, S>(names: I) -> NameSetFilter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NameSetFilter {
            names: names
                .into_iter()
                .map(|name| name.into().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl FileFilter for NameSetFilter {
    fn matches(&self, entry: &CabFileEntry) -> bool {
        let name = entry.name().to_ascii_lowercase();
        self.names.iter().any(|candidate| *candidate == name)
    }
}

/// Accepts entries whose full stored name matches a case-insensitive
/// regular expression.  The whole name must match, not just a substring.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    pattern: Regex,
}

impl PatternFilter {
    pub fn new(pattern: &str) -> Result<PatternFilter> {
        let anchored = format!("\\A(?:{})\\z", pattern);
        let pattern = match RegexBuilder::new(&anchored)
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern,
            Err(err) => usage!("invalid file name pattern: {}", err),
        };
        Ok(PatternFilter { pattern })
    }
}

impl FileFilter for PatternFilter {
    fn matches(&self, entry: &CabFileEntry) -> bool {
        self.pattern.is_match(entry.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{AcceptAll, FileFilter, NameSetFilter, PatternFilter};
    use crate::error::CabError;
    use crate::file::test_entry;

    #[test]
    fn accept_all_accepts_everything() {
        assert!(AcceptAll.matches(&test_entry("anything.bin", 1)));
    }

    #[test]
    fn name_set_is_case_insensitive() {
        let filter = NameSetFilter::new(["README.TXT", "dir\\data.bin"]);
        assert!(filter.matches(&test_entry("readme.txt", 1)));
        assert!(filter.matches(&test_entry("Dir\\Data.BIN", 1)));
        assert!(!filter.matches(&test_entry("data.bin", 1)));
    }

    #[test]
    fn pattern_matches_whole_qualified_name() {
        let filter = PatternFilter::new(r".*\.txt").unwrap();
        assert!(filter.matches(&test_entry("README.TXT", 1)));
        assert!(filter.matches(&test_entry("docs\\notes.txt", 1)));
        assert!(!filter.matches(&test_entry("notes.txt.bak", 1)));
    }

    #[test]
    fn pattern_is_anchored() {
        let filter = PatternFilter::new("core").unwrap();
        assert!(filter.matches(&test_entry("core", 1)));
        assert!(!filter.matches(&test_entry("hardcore.dll", 1)));
    }

    #[test]
    fn bad_pattern_is_a_usage_error() {
        let result = PatternFilter::new("(unclosed");
        assert!(matches!(result, Err(CabError::Usage(_))));
    }
}
