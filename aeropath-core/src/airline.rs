use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Partner-network identifier an airline code belongs to. Carriers with no
/// partner network get a singleton key of their own (e.g. "EK", "EY").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AllianceKey {
    Oneworld,
    StarAlliance,
    SkyTeam,
    Singleton(String),
}

impl From<String> for AllianceKey {
    fn from(value: String) -> Self {
        match value.as_str() {
            "oneworld" => AllianceKey::Oneworld,
            "staralliance" => AllianceKey::StarAlliance,
            "skyteam" => AllianceKey::SkyTeam,
            _ => AllianceKey::Singleton(value),
        }
    }
}

impl From<AllianceKey> for String {
    fn from(value: AllianceKey) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AllianceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllianceKey::Oneworld => f.write_str("oneworld"),
            AllianceKey::StarAlliance => f.write_str("staralliance"),
            AllianceKey::SkyTeam => f.write_str("skyteam"),
            AllianceKey::Singleton(code) => f.write_str(code),
        }
    }
}

/// One airline row from the directory, with its loyalty-program relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineRecord {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub alliance: Option<AllianceKey>,
    /// Loyalty program code, when the carrier has a bookable program.
    #[serde(rename = "ffp", default)]
    pub loyalty_program_code: Option<String>,
    /// Airline codes this carrier's program earns bonus miles on.
    #[serde(rename = "bonus", default)]
    pub bonus_earning_on: BTreeSet<String>,
    /// Airline codes this carrier recommends as booking programs for its own
    /// flights.
    #[serde(default)]
    pub recommend: BTreeSet<String>,
}

impl AirlineRecord {
    pub fn has_loyalty_program(&self) -> bool {
        self.loyalty_program_code
            .as_deref()
            .is_some_and(|code| !code.is_empty())
    }
}

/// In-memory airline directory indexed by code.
#[derive(Debug, Clone, Default)]
pub struct AirlineCatalog {
    by_code: HashMap<String, AirlineRecord>,
}

impl AirlineCatalog {
    pub fn new(records: Vec<AirlineRecord>) -> Self {
        let by_code = records
            .into_iter()
            .map(|record| (record.code.clone(), record))
            .collect();
        Self { by_code }
    }

    pub fn get(&self, code: &str) -> Option<&AirlineRecord> {
        self.by_code.get(code)
    }

    pub fn alliance_of(&self, code: &str) -> Option<AllianceKey> {
        self.by_code.get(code).and_then(|record| record.alliance.clone())
    }

    pub fn members_of(&self, key: &AllianceKey) -> Vec<&AirlineRecord> {
        let mut members: Vec<&AirlineRecord> = self
            .by_code
            .values()
            .filter(|record| record.alliance.as_ref() == Some(key))
            .collect();
        members.sort_by(|a, b| a.code.cmp(&b.code));
        members
    }

    pub fn records(&self) -> impl Iterator<Item = &AirlineRecord> {
        self.by_code.values()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
