use aeropath_core::{CabinClass, FlightSegment, ReliabilityRule};

/// A cabin class is reliable when its published count reaches the rule's
/// effective minimum for that class.
pub fn is_class_reliable(segment: &FlightSegment, class: CabinClass, rule: &ReliabilityRule) -> bool {
    segment.seat_counts.get(class) >= rule.effective_min(class)
}

/// A segment is reliable when any cabin class is; a fully unreliable segment
/// is treated as a cash/positioning leg.
pub fn is_segment_reliable(segment: &FlightSegment, rule: &ReliabilityRule) -> bool {
    CabinClass::ALL
        .iter()
        .any(|&class| is_class_reliable(segment, class, rule))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use aeropath_core::SeatCounts;

    use super::*;
    use crate::testutil::segment;

    #[test]
    fn test_segment_reliable_when_any_class_passes() {
        let seg = segment("NH1", "HND", "SFO", SeatCounts { j: 2, ..Default::default() });
        let rule = ReliabilityRule { min_count: 2, exemption: BTreeSet::new() };
        assert!(is_class_reliable(&seg, CabinClass::J, &rule));
        assert!(!is_class_reliable(&seg, CabinClass::Y, &rule));
        assert!(is_segment_reliable(&seg, &rule));
    }

    #[test]
    fn test_segment_unreliable_when_no_class_passes() {
        let seg = segment("NH1", "HND", "SFO", SeatCounts::default());
        assert!(!is_segment_reliable(&seg, &ReliabilityRule::default()));
    }

    #[test]
    fn test_exempted_class_only_needs_one_seat() {
        let seg = segment("NH1", "HND", "SFO", SeatCounts { f: 1, ..Default::default() });
        let strict = ReliabilityRule { min_count: 4, exemption: BTreeSet::new() };
        assert!(!is_segment_reliable(&seg, &strict));

        let exempting = ReliabilityRule {
            min_count: 4,
            exemption: [CabinClass::F].into_iter().collect(),
        };
        assert!(is_segment_reliable(&seg, &exempting));
    }

    #[test]
    fn test_weakening_min_count_is_monotone() {
        // Lowering min_count to 1 may only turn unreliable segments reliable,
        // never the reverse.
        for j in 0..4u32 {
            let seg = segment("NH1", "HND", "SFO", SeatCounts { j, ..Default::default() });
            let strict = ReliabilityRule { min_count: 3, exemption: BTreeSet::new() };
            let weak = ReliabilityRule { min_count: 1, exemption: BTreeSet::new() };
            if is_segment_reliable(&seg, &strict) {
                assert!(is_segment_reliable(&seg, &weak));
            }
        }
    }
}
