use std::collections::BTreeSet;

use aeropath_core::{AirlineCatalog, AirlineRecord};

/// Catalog airlines whose program earns bonus miles on any of the given
/// operating codes. An airline matching only itself is not a partner
/// relationship and is excluded.
pub fn bonus_providers<'a>(
    catalog: &'a AirlineCatalog,
    operating_codes: &BTreeSet<String>,
) -> Vec<&'a AirlineRecord> {
    let mut providers: Vec<&AirlineRecord> = catalog
        .records()
        .filter(|record| {
            record
                .bonus_earning_on
                .iter()
                .any(|target| target != &record.code && operating_codes.contains(target))
        })
        .collect();
    providers.sort_by(|a, b| a.code.cmp(&b.code));
    providers
}

/// Airlines named in an operating airline's own bonus-earning list, resolved
/// back to full records. Targets without a bookable loyalty program are
/// useless as booking options and are dropped.
pub fn bonus_recipients<'a>(
    catalog: &'a AirlineCatalog,
    operating_codes: &BTreeSet<String>,
) -> Vec<&'a AirlineRecord> {
    let mut seen = BTreeSet::new();
    let mut recipients = Vec::new();
    for code in operating_codes {
        let Some(operator) = catalog.get(code) else {
            continue;
        };
        for target in &operator.bonus_earning_on {
            if !seen.insert(target.clone()) {
                continue;
            }
            if let Some(record) = catalog.get(target) {
                if record.has_loyalty_program() {
                    recipients.push(record);
                }
            }
        }
    }
    recipients.sort_by(|a, b| a.code.cmp(&b.code));
    recipients
}
