//! Venue aggregation and statistics.
//!
//! This module provides utilities for aggregating venues by region and
//! computing the summary figures shown in the report.

use crate::analysis::regions::normalize_region;
use crate::models::{
    ActivityTotals, Attribute, Distribution, Metric, RankedVenue, RegionSummary,
    SelectionTotals, Venue, VenueMeasure,
};
use std::collections::{BTreeMap, HashMap};

/// Label used for venues with no value for an attribute.
pub const UNKNOWN_VALUE: &str = "unknown";

#[derive(Debug, Default)]
struct RegionTally {
    venues: u64,
    screens: u64,
    seats: u64,
}

/// Aggregate venues by raw region label.
///
/// Missing labels form their own group. Each group is normalized to its
/// official name, unmapped labels becoming the unknown sentinel. Groups come
/// back ordered by raw label with the missing group first.
pub fn aggregate_by_region(venues: &[Venue]) -> Vec<RegionSummary> {
    let mut grouped: BTreeMap<Option<&str>, RegionTally> = BTreeMap::new();

    for venue in venues {
        let tally = grouped.entry(venue.region.as_deref()).or_default();
        tally.venues += 1;
        tally.screens += venue.screens.unwrap_or(0);
        tally.seats += venue.seats.unwrap_or(0);
    }

    grouped
        .into_iter()
        .map(|(raw, tally)| RegionSummary {
            raw_label: raw.map(String::from),
            display_label: normalize_region(raw).to_string(),
            venue_count: tally.venues,
            screen_total: tally.screens,
            seat_total: tally.seats,
        })
        .collect()
}

/// Rank regions by a metric, highest first.
///
/// Ties are ordered by display label so the table is stable across runs.
pub fn region_table(summaries: &[RegionSummary], metric: Metric) -> Vec<(String, u64)> {
    let mut rows: Vec<(String, u64)> = summaries
        .iter()
        .map(|s| (s.display_label.clone(), s.value(metric)))
        .collect();

    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// Compute national activity totals.
pub fn activity_totals(venues: &[Venue]) -> ActivityTotals {
    let mut totals = ActivityTotals::default();
    let mut change_sum = 0.0;
    let mut change_count = 0usize;

    for venue in venues {
        totals.admissions_2020 += venue.admissions_2020.unwrap_or(0);
        totals.admissions_2019 += venue.admissions_2019.unwrap_or(0);
        totals.sessions_2020 += venue.sessions_2020.unwrap_or(0);

        if let Some(change) = venue.admissions_change {
            change_sum += change;
            change_count += 1;
        }
    }

    if change_count > 0 {
        totals.mean_admissions_change = Some(change_sum / change_count as f64);
    }

    totals
}

/// Get the top N venues by a measure.
pub fn top_venues(venues: &[Venue], measure: VenueMeasure, n: usize) -> Vec<RankedVenue> {
    let mut ranked: Vec<RankedVenue> = venues
        .iter()
        .map(|v| RankedVenue {
            name: v.name.clone(),
            commune: v.commune.clone(),
            value: measure.of(v),
        })
        .collect();

    ranked.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(n);
    ranked
}

/// Count venues per value of an attribute.
pub fn attribute_distribution(venues: &[Venue], attribute: Attribute) -> Distribution {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for venue in venues {
        let label = attribute
            .label_of(venue)
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string());
        *counts.entry(label).or_default() += 1;
    }

    let mut counts: Vec<(String, u64)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Distribution { attribute, counts }
}

/// Keep the venues in the given communes whose name is in the given names.
///
/// An empty list does not filter on that column, so two empty lists keep
/// every venue.
pub fn select_venues<'a>(
    venues: &'a [Venue],
    communes: &[String],
    names: &[String],
) -> Vec<&'a Venue> {
    venues
        .iter()
        .filter(|v| communes.is_empty() || communes.contains(&v.commune))
        .filter(|v| names.is_empty() || names.contains(&v.name))
        .collect()
}

/// Total venues, screens and seats over a selection.
pub fn selection_totals<'a, I>(venues: I) -> SelectionTotals
where
    I: IntoIterator<Item = &'a Venue>,
{
    venues
        .into_iter()
        .fold(SelectionTotals::default(), |mut totals, venue| {
            totals.venue_count += 1;
            totals.screen_total += venue.screens.unwrap_or(0);
            totals.seat_total += venue.seats.unwrap_or(0);
            totals
        })
}

/// Distinct communes present in the table, sorted.
pub fn communes(venues: &[Venue]) -> Vec<String> {
    distinct(venues.iter().map(|v| v.commune.clone()))
}

/// Distinct venue names present in the table, sorted.
pub fn venue_names(venues: &[Venue]) -> Vec<String> {
    distinct(venues.iter().map(|v| v.name.clone()))
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut values: Vec<String> = values.collect();
    values.sort();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::regions::UNKNOWN_REGION;
    use proptest::prelude::*;

    fn create_test_venue(region: Option<&str>, screens: Option<u64>, seats: Option<u64>) -> Venue {
        Venue {
            name: "Test venue".to_string(),
            commune: "Rennes".to_string(),
            region: region.map(String::from),
            screens,
            seats,
            ..Venue::default()
        }
    }

    fn sorted(mut summaries: Vec<RegionSummary>) -> Vec<RegionSummary> {
        summaries.sort_by(|a, b| a.raw_label.cmp(&b.raw_label));
        summaries
    }

    #[test]
    fn test_aggregate_by_region_example() {
        let venues = vec![
            create_test_venue(Some("BRETAGNE"), Some(5), Some(800)),
            create_test_venue(Some("BRETAGNE"), Some(3), Some(400)),
            create_test_venue(None, Some(2), Some(100)),
        ];

        let summaries = sorted(aggregate_by_region(&venues));

        assert_eq!(
            summaries,
            vec![
                RegionSummary {
                    raw_label: None,
                    display_label: UNKNOWN_REGION.to_string(),
                    venue_count: 1,
                    screen_total: 2,
                    seat_total: 100,
                },
                RegionSummary {
                    raw_label: Some("BRETAGNE".to_string()),
                    display_label: "Bretagne".to_string(),
                    venue_count: 2,
                    screen_total: 8,
                    seat_total: 1200,
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_empty_table() {
        assert!(aggregate_by_region(&[]).is_empty());
    }

    #[test]
    fn test_missing_counts_are_zero() {
        let venues = vec![
            create_test_venue(Some("CORSE"), None, Some(120)),
            create_test_venue(Some("CORSE"), Some(1), None),
        ];

        let summaries = aggregate_by_region(&venues);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].screen_total, 1);
        assert_eq!(summaries[0].seat_total, 120);
    }

    #[test]
    fn test_unmapped_label_keeps_raw_label() {
        let venues = vec![create_test_venue(Some("LA REUNION"), Some(4), Some(500))];

        let summaries = aggregate_by_region(&venues);

        assert_eq!(summaries[0].raw_label.as_deref(), Some("LA REUNION"));
        assert_eq!(summaries[0].display_label, UNKNOWN_REGION);
    }

    #[test]
    fn test_region_table_sorted_descending() {
        let venues = vec![
            create_test_venue(Some("CORSE"), Some(1), Some(50)),
            create_test_venue(Some("BRETAGNE"), Some(9), Some(10)),
            create_test_venue(Some("OCCITANIE"), Some(4), Some(900)),
        ];
        let summaries = aggregate_by_region(&venues);

        let by_screens = region_table(&summaries, Metric::Screens);
        assert_eq!(by_screens[0], ("Bretagne".to_string(), 9));
        assert_eq!(by_screens[2], ("Corse".to_string(), 1));

        let by_seats = region_table(&summaries, Metric::Seats);
        assert_eq!(by_seats[0], ("Occitanie".to_string(), 900));
    }

    #[test]
    fn test_activity_totals() {
        let venues = vec![
            Venue {
                admissions_2020: Some(1000),
                admissions_2019: Some(3000),
                sessions_2020: Some(40),
                admissions_change: Some(-60.0),
                ..Venue::default()
            },
            Venue {
                admissions_2020: Some(500),
                admissions_change: Some(-40.0),
                ..Venue::default()
            },
            Venue::default(),
        ];

        let totals = activity_totals(&venues);

        assert_eq!(totals.admissions_2020, 1500);
        assert_eq!(totals.admissions_2019, 3000);
        assert_eq!(totals.sessions_2020, 40);
        assert_eq!(totals.mean_admissions_change, Some(-50.0));
        assert_eq!(activity_totals(&[]).mean_admissions_change, None);
    }

    #[test]
    fn test_top_venues() {
        let venues = vec![
            Venue {
                name: "Small".to_string(),
                seats: Some(90),
                ..Venue::default()
            },
            Venue {
                name: "Large".to_string(),
                seats: Some(2400),
                ..Venue::default()
            },
            Venue {
                name: "Unknown size".to_string(),
                ..Venue::default()
            },
        ];

        let top = top_venues(&venues, VenueMeasure::Seats, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Large");
        assert_eq!(top[1].name, "Small");
    }

    #[test]
    fn test_attribute_distribution() {
        let venues = vec![
            Venue {
                multiplex: Some(true),
                ..Venue::default()
            },
            Venue {
                multiplex: Some(false),
                ..Venue::default()
            },
            Venue {
                multiplex: Some(false),
                ..Venue::default()
            },
            Venue::default(),
        ];

        let dist = attribute_distribution(&venues, Attribute::Multiplex);

        assert_eq!(dist.attribute, Attribute::Multiplex);
        assert_eq!(dist.counts[0], ("No".to_string(), 2));
        assert!(dist.counts.contains(&("Yes".to_string(), 1)));
        assert!(dist.counts.contains(&(UNKNOWN_VALUE.to_string(), 1)));
    }

    fn located(name: &str, commune: &str, screens: u64, seats: u64) -> Venue {
        Venue {
            name: name.to_string(),
            commune: commune.to_string(),
            screens: Some(screens),
            seats: Some(seats),
            ..Venue::default()
        }
    }

    #[test]
    fn test_select_by_commune() {
        let venues = vec![
            located("Le Grand Rex", "Paris", 10, 2000),
            located("Arvor", "Rennes", 3, 300),
        ];

        let selected = select_venues(&venues, &["Paris".to_string()], &[]);
        assert_eq!(selected.len(), 1);

        let totals = selection_totals(selected);
        assert_eq!(totals.venue_count, 1);
        assert_eq!(totals.screen_total, 10);
        assert_eq!(totals.seat_total, 2000);

        assert_eq!(select_venues(&venues, &[], &[]).len(), 2);
    }

    #[test]
    fn test_select_by_venue_name() {
        let venues = vec![
            located("Le Grand Rex", "Paris", 10, 2000),
            located("Arvor", "Rennes", 3, 300),
            located("Gaumont", "Rennes", 12, 2400),
        ];

        let selected = select_venues(&venues, &[], &["Arvor".to_string(), "Gaumont".to_string()]);

        let names: Vec<&str> = selected.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Arvor", "Gaumont"]);
    }

    #[test]
    fn test_select_by_commune_and_venue_name() {
        let venues = vec![
            located("Gaumont", "Paris", 14, 3000),
            located("Arvor", "Rennes", 3, 300),
            located("Gaumont", "Rennes", 12, 2400),
        ];

        let selected = select_venues(&venues, &["Rennes".to_string()], &["Gaumont".to_string()]);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].commune, "Rennes");
        assert_eq!(selection_totals(selected).screen_total, 12);

        let none = select_venues(&venues, &["Paris".to_string()], &["Arvor".to_string()]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_communes_sorted_distinct() {
        let mut a = Venue::default();
        a.commune = "Rennes".to_string();
        let mut b = Venue::default();
        b.commune = "Brest".to_string();
        let venues = vec![a.clone(), b, a];

        assert_eq!(communes(&venues), vec!["Brest", "Rennes"]);
    }

    #[test]
    fn test_venue_names_sorted_distinct() {
        let venues = vec![
            located("Gaumont", "Paris", 14, 3000),
            located("Arvor", "Rennes", 3, 300),
            located("Gaumont", "Rennes", 12, 2400),
        ];

        assert_eq!(venue_names(&venues), vec!["Arvor", "Gaumont"]);
    }

    fn arb_region() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("BRETAGNE".to_string())),
            Just(Some("CORSE".to_string())),
            Just(Some("GRAND EST".to_string())),
            "[A-Z ]{0,12}".prop_map(Some),
        ]
    }

    fn arb_venue() -> impl Strategy<Value = Venue> {
        (
            arb_region(),
            proptest::option::of(0u64..40),
            proptest::option::of(0u64..5000),
        )
            .prop_map(|(region, screens, seats)| Venue {
                name: "Venue".to_string(),
                region,
                screens,
                seats,
                ..Venue::default()
            })
    }

    proptest! {
        #[test]
        fn prop_every_venue_counted_once(venues in proptest::collection::vec(arb_venue(), 0..60)) {
            let summaries = aggregate_by_region(&venues);
            let counted: u64 = summaries.iter().map(|s| s.venue_count).sum();
            prop_assert_eq!(counted, venues.len() as u64);
        }

        #[test]
        fn prop_totals_preserved(venues in proptest::collection::vec(arb_venue(), 0..60)) {
            let summaries = aggregate_by_region(&venues);

            let screens: u64 = summaries.iter().map(|s| s.screen_total).sum();
            let seats: u64 = summaries.iter().map(|s| s.seat_total).sum();

            prop_assert_eq!(screens, venues.iter().map(|v| v.screens.unwrap_or(0)).sum::<u64>());
            prop_assert_eq!(seats, venues.iter().map(|v| v.seats.unwrap_or(0)).sum::<u64>());
        }

        #[test]
        fn prop_aggregation_is_idempotent(venues in proptest::collection::vec(arb_venue(), 0..60)) {
            prop_assert_eq!(
                sorted(aggregate_by_region(&venues)),
                sorted(aggregate_by_region(&venues))
            );
        }

        #[test]
        fn prop_display_label_matches_normalizer(venues in proptest::collection::vec(arb_venue(), 0..60)) {
            for summary in aggregate_by_region(&venues) {
                prop_assert_eq!(
                    summary.display_label.as_str(),
                    normalize_region(summary.raw_label.as_deref())
                );
            }
        }
    }
}
