//! "Latest per major line" reduction over raw version lists

use indexmap::{IndexMap, IndexSet};

use crate::model::version::Version;

/// Reduces `versions` to one entry per major line, newest line first.
///
/// Duplicates and unparsable strings are dropped. Within a line the entry with
/// the highest minor wins (first seen on ties); entries without a minor never
/// represent their line, so a line made only of such entries disappears.
pub fn latest_per_major<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: IndexSet<String> = versions
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect();

    let mut by_major: IndexMap<String, Vec<Version>> = IndexMap::new();
    for version in unique.iter().filter_map(|raw| Version::parse(raw)) {
        by_major.entry(version.major.clone()).or_default().push(version);
    }

    let mut latest: Vec<Version> = by_major
        .into_values()
        .filter_map(|line| {
            line.into_iter()
                .filter(|v| v.minor.is_some())
                .reduce(|best, v| if v.minor > best.minor { v } else { best })
        })
        .collect();

    latest.sort_by(|a, b| b.major_key().cmp(&a.major_key()));

    latest.into_iter().map(|v| v.raw).collect()
}
