use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use aeropath_core::{AirlineCatalog, AllianceKey, FlightSegment, ReliabilityTable};

use crate::reliability::is_segment_reliable;

/// Booking classification of a segment or group.
///
/// Unreliability is evaluated first and short-circuits alliance comparison:
/// two unreliable segments group together even when their carriers share an
/// alliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "alliance", rename_all = "snake_case")]
pub enum Classification {
    Unreliable,
    Alliance(AllianceKey),
    /// Reliable but operated by a carrier with no alliance key.
    Unaligned,
}

/// A maximal run of contiguous segment indices sharing one classification.
/// Indices are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentGroup {
    pub start: usize,
    pub end: usize,
    pub classification: Classification,
}

impl SegmentGroup {
    /// Number of segments in the group; a group is never empty.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }

    pub fn is_unreliable(&self) -> bool {
        self.classification == Classification::Unreliable
    }

    /// Airline codes operating within this group.
    pub fn operating_codes(&self, segments: &[FlightSegment]) -> BTreeSet<String> {
        segments[self.start..=self.end]
            .iter()
            .map(|segment| segment.airline_code().to_string())
            .collect()
    }

    /// Route span covered by this group: first origin to last destination.
    pub fn route(&self, segments: &[FlightSegment]) -> (String, String) {
        (
            segments[self.start].origin.clone(),
            segments[self.end].destination.clone(),
        )
    }
}

pub fn classify_segment(
    segment: &FlightSegment,
    reliability: &ReliabilityTable,
    catalog: &AirlineCatalog,
) -> Classification {
    let rule = reliability.rule_for(segment.airline_code());
    if !is_segment_reliable(segment, &rule) {
        return Classification::Unreliable;
    }
    match catalog.alliance_of(segment.airline_code()) {
        Some(key) => Classification::Alliance(key),
        None => Classification::Unaligned,
    }
}

/// Partitions an itinerary into contiguous same-classification runs.
///
/// Single left-to-right scan; a new group opens whenever the derived
/// classification differs by value from the current group's. The result is a
/// contiguous, non-overlapping partition covering every index in original
/// order, and the function is pure.
pub fn group_segments(
    segments: &[FlightSegment],
    reliability: &ReliabilityTable,
    catalog: &AirlineCatalog,
) -> Vec<SegmentGroup> {
    let mut groups: Vec<SegmentGroup> = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        let classification = classify_segment(segment, reliability, catalog);
        match groups.last_mut() {
            Some(current) if current.classification == classification => {
                current.end = index;
            }
            _ => groups.push(SegmentGroup {
                start: index,
                end: index,
                classification,
            }),
        }
    }
    tracing::debug!(segment_count = segments.len(), group_count = groups.len(), "grouped itinerary");
    groups
}

#[cfg(test)]
mod tests {
    use aeropath_core::SeatCounts;

    use super::*;
    use crate::testutil::{airline, segment};

    fn catalog() -> AirlineCatalog {
        AirlineCatalog::new(vec![
            airline("AA", "American", Some(AllianceKey::Oneworld), Some("AAdvantage"), &[], &[]),
            airline("BA", "British Airways", Some(AllianceKey::Oneworld), Some("Executive Club"), &[], &[]),
            airline("LH", "Lufthansa", Some(AllianceKey::StarAlliance), Some("Miles & More"), &[], &[]),
            airline("EK", "Emirates", Some(AllianceKey::Singleton("EK".to_string())), Some("Skywards"), &[], &[]),
        ])
    }

    fn reliable() -> SeatCounts {
        SeatCounts { j: 2, ..Default::default() }
    }

    #[test]
    fn test_same_alliance_reliable_segments_merge() {
        let segments = vec![
            segment("AA100", "JFK", "LHR", reliable()),
            segment("BA200", "LHR", "DXB", reliable()),
        ];
        let groups = group_segments(&segments, &ReliabilityTable::default(), &catalog());
        assert_eq!(
            groups,
            vec![SegmentGroup {
                start: 0,
                end: 1,
                classification: Classification::Alliance(AllianceKey::Oneworld),
            }]
        );
    }

    #[test]
    fn test_unreliable_short_circuits_shared_alliance() {
        // Both carriers are Oneworld, but the second leg has zero counts in
        // every class: the groups must never merge.
        let segments = vec![
            segment("AA100", "JFK", "LHR", reliable()),
            segment("BA200", "LHR", "DXB", SeatCounts::default()),
        ];
        let groups = group_segments(&segments, &ReliabilityTable::default(), &catalog());
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0],
            SegmentGroup {
                start: 0,
                end: 0,
                classification: Classification::Alliance(AllianceKey::Oneworld),
            }
        );
        assert_eq!(
            groups[1],
            SegmentGroup { start: 1, end: 1, classification: Classification::Unreliable }
        );
    }

    #[test]
    fn test_alliance_change_starts_new_group() {
        let segments = vec![
            segment("AA100", "JFK", "LHR", reliable()),
            segment("LH900", "LHR", "FRA", reliable()),
            segment("EK4", "FRA", "DXB", reliable()),
        ];
        let groups = group_segments(&segments, &ReliabilityTable::default(), &catalog());
        let classes: Vec<&Classification> = groups.iter().map(|g| &g.classification).collect();
        assert_eq!(
            classes,
            vec![
                &Classification::Alliance(AllianceKey::Oneworld),
                &Classification::Alliance(AllianceKey::StarAlliance),
                &Classification::Alliance(AllianceKey::Singleton("EK".to_string())),
            ]
        );
    }

    #[test]
    fn test_unknown_carrier_is_unaligned_not_unreliable() {
        let segments = vec![
            segment("ZZ10", "AAA", "BBB", reliable()),
            segment("ZZ11", "BBB", "CCC", reliable()),
        ];
        let groups = group_segments(&segments, &ReliabilityTable::default(), &catalog());
        assert_eq!(
            groups,
            vec![SegmentGroup { start: 0, end: 1, classification: Classification::Unaligned }]
        );
    }

    #[test]
    fn test_partition_law_and_idempotence() {
        let segments = vec![
            segment("AA1", "JFK", "ORD", reliable()),
            segment("AA2", "ORD", "SEA", SeatCounts::default()),
            segment("LH3", "SEA", "FRA", reliable()),
            segment("LH4", "FRA", "VIE", reliable()),
            segment("EK5", "VIE", "DXB", SeatCounts::default()),
        ];
        let table = ReliabilityTable::default();
        let groups = group_segments(&segments, &table, &catalog());

        // Contiguous, non-overlapping, exactly covering [0, n-1].
        assert_eq!(groups[0].start, 0);
        for pair in groups.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
        assert_eq!(groups.last().unwrap().end, segments.len() - 1);

        // Pure function: a second run yields identical output.
        assert_eq!(groups, group_segments(&segments, &table, &catalog()));
    }

    #[test]
    fn test_empty_itinerary_yields_no_groups() {
        let groups = group_segments(&[], &ReliabilityTable::default(), &catalog());
        assert!(groups.is_empty());
    }
}
