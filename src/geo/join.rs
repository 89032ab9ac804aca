//! Left join of region summaries onto boundary polygons.

use crate::analysis::is_unknown;
use crate::geo::{BoundaryFeature, BoundarySet};
use crate::models::{Metric, RegionSummary};
use std::collections::HashMap;
use tracing::debug;

/// A boundary polygon with the counts of its region.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRegion {
    pub feature: BoundaryFeature,
    pub venue_count: u64,
    pub screen_total: u64,
    pub seat_total: u64,
}

impl JoinedRegion {
    /// Returns the value of the given metric for this region.
    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Venues => self.venue_count,
            Metric::Screens => self.screen_total,
            Metric::Seats => self.seat_total,
        }
    }
}

/// Join summaries onto boundaries by official region name.
///
/// Every polygon appears exactly once, in dataset order. Polygons without a
/// matching summary get zero counts. Summaries labelled with the unknown
/// sentinel never match.
pub fn join_with_geometry(
    summaries: &[RegionSummary],
    boundaries: &BoundarySet,
) -> Vec<JoinedRegion> {
    let mut by_name: HashMap<&str, (u64, u64, u64)> = HashMap::new();

    for summary in summaries {
        if is_unknown(&summary.display_label) {
            debug!(
                "Region {:?} has no official name, left off the map",
                summary.raw_label
            );
            continue;
        }

        let entry = by_name.entry(summary.display_label.as_str()).or_default();
        entry.0 += summary.venue_count;
        entry.1 += summary.screen_total;
        entry.2 += summary.seat_total;
    }

    boundaries
        .features
        .iter()
        .map(|feature| {
            let (venue_count, screen_total, seat_total) =
                by_name.get(feature.name.as_str()).copied().unwrap_or_default();

            JoinedRegion {
                feature: feature.clone(),
                venue_count,
                screen_total,
                seat_total,
            }
        })
        .collect()
}
