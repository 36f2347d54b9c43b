use std::collections::HashMap;

use async_trait::async_trait;

use crate::airline::AirlineRecord;

/// Airport/airline directory capability. Failures are recovered by callers
/// (raw IATA codes are shown in place of city names); they are never fatal.
#[async_trait]
pub trait AirportDirectory: Send + Sync {
    /// Resolve IATA airport codes to city names. Codes missing from the
    /// directory are simply absent from the returned map.
    async fn city_names(
        &self,
        iata_codes: &[String],
    ) -> Result<HashMap<String, String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Full airline catalog rows.
    async fn airline_rows(
        &self,
    ) -> Result<Vec<AirlineRecord>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Directory backed by in-memory data loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    cities: HashMap<String, String>,
    airlines: Vec<AirlineRecord>,
}

impl StaticDirectory {
    pub fn new(cities: HashMap<String, String>, airlines: Vec<AirlineRecord>) -> Self {
        Self { cities, airlines }
    }
}

#[async_trait]
impl AirportDirectory for StaticDirectory {
    async fn city_names(
        &self,
        iata_codes: &[String],
    ) -> Result<HashMap<String, String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(iata_codes
            .iter()
            .filter_map(|code| {
                self.cities
                    .get(code)
                    .map(|city| (code.clone(), city.clone()))
            })
            .collect())
    }

    async fn airline_rows(
        &self,
    ) -> Result<Vec<AirlineRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.airlines.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_skips_unknown_codes() {
        let cities = HashMap::from([
            ("SEA".to_string(), "Seattle".to_string()),
            ("NRT".to_string(), "Tokyo".to_string()),
        ]);
        let directory = StaticDirectory::new(cities, Vec::new());

        let resolved = directory
            .city_names(&["SEA".to_string(), "XXX".to_string()])
            .await
            .unwrap();
        assert_eq!(resolved.get("SEA").map(String::as_str), Some("Seattle"));
        assert!(!resolved.contains_key("XXX"));
    }
}
