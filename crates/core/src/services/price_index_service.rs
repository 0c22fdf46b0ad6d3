use std::collections::BTreeSet;

use crate::models::portfolio::DailySnapshots;
use crate::models::price::{PriceIndex, PriceRange};
use crate::models::ticker::ExternalTicker;

/// Derives, per symbol, the date ranges during which the symbol was held.
pub struct PriceIndexService;

impl PriceIndexService {
    pub fn new() -> Self {
        Self
    }

    /// Walk the dense series in order. A range opens on the first day a
    /// symbol's quantity is > 0 and closes (`end = day`) on the first later day
    /// it is ≤ 0 or missing. Ranges stay open when the series ends while held.
    pub fn build_index(&self, dense: &DailySnapshots) -> PriceIndex {
        let mut index = PriceIndex::new();
        let mut open: BTreeSet<ExternalTicker> = BTreeSet::new();

        for (day, snapshot) in dense {
            for (symbol, quantity) in snapshot.iter() {
                let is_open = open.contains(symbol);
                if quantity > 0.0 && !is_open {
                    index
                        .entry(symbol.clone())
                        .or_default()
                        .push(PriceRange::open(*day));
                    open.insert(symbol.clone());
                }
            }

            let closed: Vec<ExternalTicker> = open
                .iter()
                .filter(|s| snapshot.quantity(s).map_or(true, |q| q <= 0.0))
                .cloned()
                .collect();
            for symbol in closed {
                if let Some(range) = index.get_mut(&symbol).and_then(|r| r.last_mut()) {
                    range.end = Some(*day);
                }
                open.remove(&symbol);
            }
        }

        index
    }
}

impl Default for PriceIndexService {
    fn default() -> Self {
        Self::new()
    }
}
