//! Structured form of dotted platform versions (`7.2.3`, `7.2-SNAPSHOT`, `1.0.0.RC1`)

use std::sync::LazyLock;

use regex::Regex;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?(?:[.-]([a-zA-Z0-9]+))?$")
        .expect("version pattern is valid")
});

/// A parsed version: `major` merges the first two numeric segments,
/// `minor` is the optional third segment, `qualifier` the optional suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub raw: String,
    pub major: String,
    pub minor: Option<u32>,
    pub qualifier: Option<String>,
}

impl Version {
    /// Parses `raw`, returning None when it doesn't look like a version
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = VERSION_PATTERN.captures(raw)?;

        let major = format!("{}.{}", &captures[1], &captures[2]);
        let minor = match captures.get(3) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        let qualifier = captures.get(4).map(|m| m.as_str().to_string());

        Some(Self {
            raw: raw.to_string(),
            major,
            minor,
            qualifier,
        })
    }

    /// Numeric ordering key of the major line (`"7.10"` -> `(7, 10)`)
    pub fn major_key(&self) -> (u64, u64) {
        let mut parts = self
            .major
            .split('.')
            .map(|part| part.parse::<u64>().unwrap_or(0));
        (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
    }
}
