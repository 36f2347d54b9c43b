pub mod alliance;
pub mod grouping;
pub mod options;
pub mod reliability;

pub use alliance::{bonus_providers, bonus_recipients};
pub use grouping::{classify_segment, group_segments, Classification, SegmentGroup};
pub use options::{options_for, BookingOption, GroupBookingOptions};
pub use reliability::{is_class_reliable, is_segment_reliable};
