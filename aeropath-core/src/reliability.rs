use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::segment::CabinClass;

/// Per-airline policy deciding when published award counts are trustworthy.
///
/// A cabin class is reliable on a segment iff its seat count reaches the
/// effective minimum: 1 for exempted classes, `min_count` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityRule {
    #[serde(default = "default_min_count")]
    pub min_count: u32,
    #[serde(default)]
    pub exemption: BTreeSet<CabinClass>,
}

fn default_min_count() -> u32 {
    1
}

impl Default for ReliabilityRule {
    fn default() -> Self {
        Self {
            min_count: 1,
            exemption: BTreeSet::new(),
        }
    }
}

impl ReliabilityRule {
    pub fn effective_min(&self, class: CabinClass) -> u32 {
        if self.exemption.contains(&class) {
            1
        } else {
            self.min_count
        }
    }
}

/// Airline-code keyed reliability policy table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReliabilityTable {
    rules: HashMap<String, ReliabilityRule>,
}

impl ReliabilityTable {
    pub fn new(rules: HashMap<String, ReliabilityRule>) -> Self {
        Self { rules }
    }

    pub fn insert(&mut self, airline_code: impl Into<String>, rule: ReliabilityRule) {
        self.rules.insert(airline_code.into(), rule);
    }

    /// A missing rule is a policy default (any nonzero count is reliable),
    /// not an error.
    pub fn rule_for(&self, airline_code: &str) -> ReliabilityRule {
        self.rules.get(airline_code).cloned().unwrap_or_default()
    }
}
