//! Rating statistics.

use revdash_core::{Review, Store};

use crate::types::{RatingSummary, StoreRatings, StoreTotals};

/// Per-store and overall rating counts, averages and star histograms.
///
/// Stores with no reviews are left out of `by_store`.
#[must_use]
pub fn rating_summary(reviews: &[Review]) -> RatingSummary {
    let mut summary = RatingSummary::default();
    let mut overall_sum = 0u64;
    let mut store_sums = [0u64; 2];

    for review in reviews {
        let Some(bucket) = usize::from(review.rating).checked_sub(1).filter(|b| *b < 5) else {
            continue;
        };
        let stats = summary.by_store.entry(review.store).or_default();
        stats.count += 1;
        stats.histogram[bucket] += 1;
        store_sums[store_slot(review.store)] += u64::from(review.rating);

        summary.overall.count += 1;
        summary.overall.histogram[bucket] += 1;
        overall_sum += u64::from(review.rating);
    }

    summary.overall.average_rating = average(overall_sum, summary.overall.count);
    for (store, stats) in &mut summary.by_store {
        stats.average_rating = average(store_sums[store_slot(*store)], stats.count);
    }
    summary
}

/// Counts per store, as the dashboard header shows them.
#[must_use]
pub fn store_totals(reviews: &[Review]) -> StoreTotals {
    reviews.iter().fold(StoreTotals::default(), |mut totals, review| {
        totals.total += 1;
        match review.store {
            Store::Play => totals.play += 1,
            Store::AppStore => totals.app_store += 1,
        }
        totals
    })
}

fn store_slot(store: Store) -> usize {
    match store {
        Store::Play => 0,
        Store::AppStore => 1,
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(sum: u64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum as f64 / count as f64)
}

impl StoreRatings {
    /// Share of reviews with `stars` stars, in `[0.0, 1.0]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share(&self, stars: u8) -> f64 {
        let Some(bucket) = usize::from(stars).checked_sub(1).filter(|b| *b < 5) else {
            return 0.0;
        };
        if self.count == 0 {
            return 0.0;
        }
        self.histogram[bucket] as f64 / self.count as f64
    }
}
