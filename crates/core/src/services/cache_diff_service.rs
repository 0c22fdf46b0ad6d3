use chrono::NaiveDate;

use crate::models::price::{PriceBook, PriceIndex, PricePoint, PriceRange};
use crate::models::ticker::DateKey;

/// Works out which part of the required price ranges is not cached yet.
pub struct CacheDiffService;

impl CacheDiffService {
    pub fn new() -> Self {
        Self
    }

    /// Residual ranges still to fetch.
    ///
    /// A cached price on day `L` means everything up to `L` is known, so each
    /// range starts no earlier than `L + 1`. Open ranges end "yesterday".
    /// Ranges left with `start >= end` are dropped, and so are symbols with no
    /// range left.
    pub fn diff(&self, required: &PriceIndex, cached: &[PricePoint], today: NaiveDate) -> PriceIndex {
        let book = PriceBook::merge(cached, &[]);
        let yesterday = DateKey::new(today).previous_day();
        let mut residual = PriceIndex::new();

        for (symbol, ranges) in required {
            let Some(last_cached) = book.latest_date(symbol) else {
                residual.insert(symbol.clone(), ranges.clone());
                continue;
            };

            let remaining: Vec<PriceRange> = ranges
                .iter()
                .filter_map(|range| {
                    let start = range.start.max(last_cached.next_day());
                    let end = range.end.unwrap_or(yesterday);
                    (start < end).then_some(PriceRange::new(start, range.end))
                })
                .collect();

            if !remaining.is_empty() {
                residual.insert(symbol.clone(), remaining);
            }
        }

        residual
    }

    /// Extend `residual` so every symbol still held today gets today's bar.
    ///
    /// The store only keeps closed days, so today's bar is never cached and
    /// has to be requested on every run. Symbols whose residual already has an
    /// open range are left alone: open ranges are fetched through today.
    pub fn with_today(&self, required: &PriceIndex, mut residual: PriceIndex, today: NaiveDate) -> PriceIndex {
        let today = DateKey::new(today);

        for (symbol, ranges) in required {
            let held_today = ranges.last().is_some_and(|r| r.is_open() && r.start <= today);
            if !held_today {
                continue;
            }
            let pending = residual.entry(symbol.clone()).or_default();
            if !pending.iter().any(PriceRange::is_open) {
                pending.push(PriceRange::open(today));
            }
        }

        residual
    }
}

impl Default for CacheDiffService {
    fn default() -> Self {
        Self::new()
    }
}
