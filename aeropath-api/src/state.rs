use std::collections::BTreeSet;
use std::sync::Arc;

use aeropath_core::{AirlineCatalog, AirportDirectory, ReliabilityTable};
use aeropath_live::Verifier;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<AirlineCatalog>,
    pub reliability: Arc<ReliabilityTable>,
    pub directory: Arc<dyn AirportDirectory>,
    pub verifier: Arc<Verifier>,
    pub supported_programs: BTreeSet<String>,
}
