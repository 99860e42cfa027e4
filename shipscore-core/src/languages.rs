//! Language share of the indexed files, as report context.

use std::collections::BTreeMap;

use tokei::{Config, LanguageType};

use crate::index::FileIndex;
use crate::report::LanguageDistribution;

/// Bucket indexed files by recognized language and return each language's
/// percentage of the recognized total. Advisory context only; an empty map
/// simply means nothing was recognized.
pub fn distribution(index: &FileIndex) -> LanguageDistribution {
    let config = Config::default();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;

    for entry in index.entries() {
        let Some(language) = LanguageType::from_path(&entry.relative_path, &config) else {
            continue;
        };
        total += 1;
        *counts.entry(language.to_string()).or_insert(0) += 1;
    }

    if total == 0 {
        return BTreeMap::new();
    }

    counts
        .into_iter()
        .map(|(language, count)| (language, (count as f64 / total as f64) * 100.0))
        .collect()
}
