//! Exclusion pattern filtering
//!
//! Names matching any configured pattern are invisible to the rest of the
//! engine: they never appear in listings, merges, or diff output.

use regex::Regex;

use crate::error::DiffError;

/// Immutable compiled alternation of exclusion patterns.
///
/// Patterns match against a bare name, anchored at the start only, so
/// `"\\.o$"` excludes object files while `"tmp"` excludes anything whose
/// name begins with "tmp". Multiple patterns combine with logical OR into a
/// single compiled regex.
pub struct ExcludeFilter {
    pattern: Option<Regex>,
}

impl ExcludeFilter {
    /// Compile the configured patterns. An empty set excludes nothing.
    pub fn new(patterns: &[String]) -> Result<Self, DiffError> {
        if patterns.is_empty() {
            return Ok(Self { pattern: None });
        }
        // Validate each pattern individually so the error names the bad one
        // rather than pointing into the joined alternation.
        for pattern in patterns {
            Regex::new(pattern)?;
        }
        let alternation = patterns
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\A(?:{alternation})"))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// True if any configured pattern matches the bare name.
    pub fn excluded(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(name))
    }
}
