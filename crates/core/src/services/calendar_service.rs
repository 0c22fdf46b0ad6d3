use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::portfolio::{DailySnapshots, PortfolioDaySnapshot};
use crate::models::ticker::DateKey;

/// Expands per-transaction-day snapshots into one snapshot per calendar day.
pub struct CalendarService;

impl CalendarService {
    pub fn new() -> Self {
        Self
    }

    /// Every day from the first sparse entry through `today` (or the last
    /// sparse entry, if that is later), inclusive.
    ///
    /// Days without transactions repeat the most recent earlier snapshot.
    /// Fails with [`CoreError::EmptyHoldings`] when there is nothing to anchor on.
    pub fn fill(&self, sparse: &DailySnapshots, today: NaiveDate) -> Result<DailySnapshots, CoreError> {
        let (first, _) = sparse.first().ok_or(CoreError::EmptyHoldings)?;
        let last_sparse = sparse.last().map(|(d, _)| *d).unwrap_or(*first);
        let end = DateKey::new(today).max(last_sparse);

        let mut dense = Vec::new();
        let mut pending = sparse.iter().peekable();
        let mut current: Option<&PortfolioDaySnapshot> = None;
        let mut day = *first;

        while day <= end {
            while let Some((_, snapshot)) = pending.next_if(|(d, _)| *d <= day) {
                current = Some(snapshot);
            }
            if let Some(snapshot) = current {
                dense.push((day, snapshot.clone()));
            }
            day = day.next_day();
        }

        Ok(dense)
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}
