use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use aeropath_core::{AirlineCatalog, AirlineRecord, FlightSegment};

use crate::alliance::{bonus_providers, bonus_recipients};
use crate::grouping::{Classification, SegmentGroup};

/// A loyalty program that could plausibly book a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOption {
    pub airline_code: String,
    pub name: String,
    pub loyalty_program_code: Option<String>,
}

impl From<&AirlineRecord> for BookingOption {
    fn from(record: &AirlineRecord) -> Self {
        Self {
            airline_code: record.code.clone(),
            name: record.name.clone(),
            loyalty_program_code: record.loyalty_program_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBookingOptions {
    /// Deduplicated by airline code, sorted by display name.
    pub all: Vec<BookingOption>,
    /// Intersection of every operating carrier's recommended booking
    /// programs, restricted to carriers the live-verification backend
    /// supports. Empty means the group is not offered for verification.
    pub recommended: BTreeSet<String>,
}

/// Candidate booking programs for one group: alliance members of the group's
/// key, bonus providers, and bonus recipients, unioned and deduplicated.
pub fn options_for(
    group: &SegmentGroup,
    segments: &[FlightSegment],
    catalog: &AirlineCatalog,
    supported_programs: &BTreeSet<String>,
) -> GroupBookingOptions {
    let operating_codes = group.operating_codes(segments);

    let mut by_code: BTreeMap<String, BookingOption> = BTreeMap::new();
    if let Classification::Alliance(key) = &group.classification {
        for member in catalog.members_of(key) {
            by_code.entry(member.code.clone()).or_insert_with(|| member.into());
        }
    }
    for provider in bonus_providers(catalog, &operating_codes) {
        by_code.entry(provider.code.clone()).or_insert_with(|| provider.into());
    }
    for recipient in bonus_recipients(catalog, &operating_codes) {
        by_code.entry(recipient.code.clone()).or_insert_with(|| recipient.into());
    }

    let mut all: Vec<BookingOption> = by_code.into_values().collect();
    all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.airline_code.cmp(&b.airline_code)));

    GroupBookingOptions {
        all,
        recommended: recommended_for(&operating_codes, catalog, supported_programs),
    }
}

/// Conservative AND over every operating carrier's recommend set: a single
/// carrier with an empty set empties the whole intersection.
fn recommended_for(
    operating_codes: &BTreeSet<String>,
    catalog: &AirlineCatalog,
    supported_programs: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut intersection: Option<BTreeSet<String>> = None;
    for code in operating_codes {
        let recommend = catalog
            .get(code)
            .map(|record| record.recommend.clone())
            .unwrap_or_default();
        intersection = Some(match intersection {
            None => recommend,
            Some(current) => current.intersection(&recommend).cloned().collect(),
        });
    }
    intersection
        .unwrap_or_default()
        .intersection(supported_programs)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use aeropath_core::{AllianceKey, SeatCounts};

    use super::*;
    use crate::testutil::{airline, segment};

    fn catalog() -> AirlineCatalog {
        AirlineCatalog::new(vec![
            airline("AA", "American", Some(AllianceKey::Oneworld), Some("AAdvantage"), &[], &["AS", "AC"]),
            airline("BA", "British Airways", Some(AllianceKey::Oneworld), Some("Executive Club"), &[], &["AS"]),
            airline("AS", "Alaska", Some(AllianceKey::Oneworld), Some("Mileage Plan"), &["AA"], &["AS"]),
            airline("HA", "Hawaiian", None, Some("HawaiianMiles"), &["AS"], &[]),
            airline("LH", "Lufthansa", Some(AllianceKey::StarAlliance), Some("Miles & More"), &[], &["AC"]),
        ])
    }

    fn supported() -> BTreeSet<String> {
        ["AS".to_string(), "AC".to_string()].into_iter().collect()
    }

    fn reliable() -> SeatCounts {
        SeatCounts { j: 2, ..Default::default() }
    }

    #[test]
    fn test_alliance_members_and_bonus_relations_union() {
        let segments = vec![segment("AA100", "JFK", "LHR", reliable())];
        let group = SegmentGroup {
            start: 0,
            end: 0,
            classification: Classification::Alliance(AllianceKey::Oneworld),
        };
        let options = options_for(&group, &segments, &catalog(), &supported());

        let codes: Vec<&str> = options.all.iter().map(|o| o.airline_code.as_str()).collect();
        // Oneworld members AA, AS, BA; AS is also a bonus provider but must
        // appear exactly once.
        assert_eq!(codes, vec!["AS", "AA", "BA"]);
        // Sorted by display name: Alaska, American, British Airways.
        assert_eq!(options.all[0].name, "Alaska");
    }

    #[test]
    fn test_recommended_is_intersection_restricted_to_supported() {
        let segments = vec![
            segment("AA100", "JFK", "LHR", reliable()),
            segment("BA200", "LHR", "DXB", reliable()),
        ];
        let group = SegmentGroup {
            start: 0,
            end: 1,
            classification: Classification::Alliance(AllianceKey::Oneworld),
        };
        let options = options_for(&group, &segments, &catalog(), &supported());
        // AA recommends {AS, AC}, BA recommends {AS}; intersection {AS}.
        assert_eq!(options.recommended, ["AS".to_string()].into_iter().collect());
    }

    #[test]
    fn test_empty_recommend_set_empties_intersection() {
        let segments = vec![
            segment("AA100", "JFK", "HNL", reliable()),
            segment("HA400", "HNL", "OGG", reliable()),
        ];
        let group = SegmentGroup {
            start: 0,
            end: 1,
            classification: Classification::Unaligned,
        };
        let options = options_for(&group, &segments, &catalog(), &supported());
        assert!(options.recommended.is_empty());
    }

    #[test]
    fn test_unreliable_group_gets_no_alliance_members() {
        let segments = vec![segment("HA400", "HNL", "OGG", SeatCounts::default())];
        let group = SegmentGroup { start: 0, end: 0, classification: Classification::Unreliable };
        let options = options_for(&group, &segments, &catalog(), &supported());
        // Only HA's bonus recipient (AS) survives.
        let codes: Vec<&str> = options.all.iter().map(|o| o.airline_code.as_str()).collect();
        assert_eq!(codes, vec!["AS"]);
    }

    #[test]
    fn test_recommend_outside_supported_is_dropped() {
        let segments = vec![segment("LH900", "FRA", "JFK", reliable())];
        let group = SegmentGroup {
            start: 0,
            end: 0,
            classification: Classification::Alliance(AllianceKey::StarAlliance),
        };
        let narrow: BTreeSet<String> = ["AS".to_string()].into_iter().collect();
        let options = options_for(&group, &segments, &catalog(), &narrow);
        // LH recommends AC, which the narrowed backend does not support.
        assert!(options.recommended.is_empty());
    }
}
