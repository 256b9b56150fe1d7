//! Fetch memoization.
//!
//! Repeated recomputation with unchanged parameters must not hit the network,
//! so fetched series are cached by (code, start, end). This is a plain
//! pure-function cache: entries are only ever superseded by a different key,
//! never evicted or aged out.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::Series;

/// Cache key for one remote fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub code: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// In-memory cache of fetched series.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: HashMap<FetchKey, Series>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FetchKey) -> Option<&Series> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: FetchKey, series: Series) {
        self.entries.insert(key, series);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_hits_on_identical_key() {
        let d0 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        let key = FetchKey {
            code: "RSAFS".to_string(),
            start: d0,
            end: d1,
        };

        let mut cache = SeriesCache::new();
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), Series::new("A", "RSAFS"));
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);

        // A different range is a different entry.
        let other = FetchKey {
            end: d0,
            ..key.clone()
        };
        assert!(cache.get(&other).is_none());
    }
}
