//! Keyword frequency aggregation and tier classification

use std::collections::HashMap;

use zelo_common::db::models::FrequencyTier;

use super::keywords::extract_keywords;

/// Keywords with a count of 1 are not recurring and are discarded
const MIN_RECURRENCE_COUNT: i64 = 2;

/// Shortlist size for tracked keywords per asset
const TOP_KEYWORDS: usize = 5;

/// A candidate keyword and how often it occurred across an asset's problem
/// events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: i64,
}

/// Aggregate keyword frequencies across the combined text of an asset's
/// problem events
///
/// Counts token occurrences across the concatenation of each event's
/// title+description, keeps only tokens occurring more than once, and
/// returns the top 5 ranked by count descending. Ties keep first-seen
/// order (stable sort on count only).
///
/// Note the counting is per *occurrence*, not per distinct event: a token
/// repeated within one verbose description also clears the recurrence
/// filter. Whether that is the intended meaning of "recurring" is an open
/// product question; the behavior is kept as shipped.
pub fn aggregate_keywords<'a, I>(texts: I) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, i64> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for text in texts {
        for token in extract_keywords(text) {
            match counts.get_mut(&token) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(token.clone(), 1);
                    first_seen.push(token);
                }
            }
        }
    }

    let mut ranked: Vec<KeywordCount> = first_seen
        .into_iter()
        .map(|keyword| {
            let count = counts[&keyword];
            KeywordCount { keyword, count }
        })
        .filter(|kc| kc.count >= MIN_RECURRENCE_COUNT)
        .collect();

    // Stable sort: equal counts retain first-seen order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_KEYWORDS);
    ranked
}

/// Classify a keyword's occurrence count relative to the asset's total
/// problem-event volume
///
/// `total_problems` must be > 0; callers guarantee this by short-circuiting
/// on assets with no problem events.
pub fn classify_frequency(count: i64, total_problems: i64) -> FrequencyTier {
    let percentage = count as f64 / total_problems as f64 * 100.0;
    if percentage > 50.0 {
        FrequencyTier::VeryFrequent
    } else if percentage > 30.0 {
        FrequencyTier::Frequent
    } else if percentage > 10.0 {
        FrequencyTier::Occasional
    } else {
        FrequencyTier::Rare
    }
}
