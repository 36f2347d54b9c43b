use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures_util::future::join_all;
use serde::Serialize;
use uuid::Uuid;

use aeropath_core::FlightSegment;
use aeropath_rules::SegmentGroup;

use crate::cache::{CacheKey, LiveSearchCache};
use crate::client::LiveSearchClient;
use crate::wire::{LiveSearchRequest, LiveSearchResponse};

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cards tracked in the per-card result store before the least recently
/// touched ones are evicted.
pub const DEFAULT_STORE_CAPACITY: usize = 256;

/// Per-card verification lifecycle: `Idle -> Pending -> {Success,
/// PartialFailure}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Idle,
    Pending,
    Success,
    PartialFailure,
}

/// One itinerary card under verification.
#[derive(Debug, Clone)]
pub struct VerificationCard {
    pub id: Uuid,
    /// The itinerary's reference date; per-segment departure dates are
    /// derived from day offsets against the first segment.
    pub reference_date: NaiveDate,
    pub segments: Vec<FlightSegment>,
}

impl VerificationCard {
    pub fn new(reference_date: NaiveDate, segments: Vec<FlightSegment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference_date,
            segments,
        }
    }

    fn depart_date_for(&self, segment_index: usize) -> NaiveDate {
        let base = self.segments[0].departure_date();
        let offset = self.segments[segment_index].departure_date() - base;
        self.reference_date + offset
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("group {0} has no selected program")]
    MissingProgram(usize),
    #[error("selection references unknown group {0}")]
    UnknownGroup(usize),
    #[error("no bookable group selected")]
    NothingSelected,
}

/// Result for one route span, resolved once at the boundary instead of
/// shape-sniffed at every call site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpanOutcome {
    /// One lookup covering several adjacent groups booked with one program.
    Merged {
        program: String,
        groups: Vec<usize>,
        response: LiveSearchResponse,
    },
    Individual {
        program: String,
        group: usize,
        response: LiveSearchResponse,
    },
}

impl SpanOutcome {
    fn covers(&self, group_index: usize) -> bool {
        match self {
            SpanOutcome::Merged { groups, .. } => groups.contains(&group_index),
            SpanOutcome::Individual { group, .. } => *group == group_index,
        }
    }
}

/// One row of the deduplicated render list. A span verified by a multi-group
/// merge appears once, attributed to the first covered group in scan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
    pub group: usize,
    pub span: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub card_id: Uuid,
    pub generation: u64,
    pub state: VerificationState,
    /// Keyed by rendered route span ("SEA-NRT").
    pub results: BTreeMap<String, SpanOutcome>,
    pub display: Vec<DisplayEntry>,
}

struct StoredVerification {
    issued_generation: u64,
    outcome: Option<VerificationOutcome>,
    touched_at: Instant,
}

impl StoredVerification {
    fn new() -> Self {
        Self {
            issued_generation: 0,
            outcome: None,
            touched_at: Instant::now(),
        }
    }
}

/// Orchestrates live-availability verification: merged lookups first,
/// per-group fallback, concurrent fan-out with join-all settling, and a
/// generation guard so a slow older request never overwrites newer results.
pub struct Verifier {
    client: Arc<dyn LiveSearchClient>,
    cache: Arc<LiveSearchCache>,
    lookup_timeout: Duration,
    store: Mutex<HashMap<Uuid, StoredVerification>>,
    store_capacity: usize,
}

impl Verifier {
    pub fn new(client: Arc<dyn LiveSearchClient>, cache: Arc<LiveSearchCache>) -> Self {
        Self::with_timeout(client, cache, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(
        client: Arc<dyn LiveSearchClient>,
        cache: Arc<LiveSearchCache>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            client,
            cache,
            lookup_timeout,
            store: Mutex::new(HashMap::new()),
            store_capacity: DEFAULT_STORE_CAPACITY,
        }
    }

    /// Bound on cards kept in the result store.
    pub fn with_store_capacity(mut self, capacity: usize) -> Self {
        self.store_capacity = capacity;
        self
    }

    /// Last committed outcome for a card, if any.
    pub fn latest(&self, card_id: Uuid) -> Option<VerificationOutcome> {
        let store = self.store.lock().expect("verifier store poisoned");
        store.get(&card_id).and_then(|s| s.outcome.clone())
    }

    /// Current lifecycle state for a card.
    pub fn state(&self, card_id: Uuid) -> VerificationState {
        let store = self.store.lock().expect("verifier store poisoned");
        match store.get(&card_id) {
            None => VerificationState::Idle,
            Some(stored) => match &stored.outcome {
                Some(outcome) if outcome.generation == stored.issued_generation => outcome.state,
                _ => VerificationState::Pending,
            },
        }
    }

    pub async fn verify(
        &self,
        card: &VerificationCard,
        groups: &[SegmentGroup],
        selections: &HashMap<usize, String>,
        seat_count: u32,
    ) -> Result<VerificationOutcome, VerifyError> {
        let selected = validate_selections(groups, selections)?;
        let generation = self.next_generation(card.id);
        tracing::info!(card = %card.id, generation, groups = selected.len(), "verification started");

        // Phase 1: merged lookups for runs of adjacent same-program groups.
        let candidates = merge_candidates(groups, &selected);
        let merged_lookups = candidates.iter().filter(|run| run.len() >= 2).map(|run| {
            let program = run[0].1.clone();
            let indices: Vec<usize> = run.iter().map(|(index, _)| *index).collect();
            async move {
                let outcome = self
                    .merged_lookup(card, groups, &program, &indices, seat_count)
                    .await;
                (indices, program, outcome)
            }
        });

        let mut results: BTreeMap<String, SpanOutcome> = BTreeMap::new();
        let mut covered: Vec<usize> = Vec::new();
        for (indices, _program, outcome) in join_all(merged_lookups).await {
            if let Some((span, outcome)) = outcome {
                covered.extend(&indices);
                let key = result_key(&results, span, indices[0]);
                results.insert(key, outcome);
            }
        }

        // Phase 2: individual lookups for everything not covered by an
        // accepted merge, all in parallel, joined when all settle.
        let individual_lookups = selected
            .iter()
            .filter(|(index, _)| !covered.contains(index))
            .map(|(index, program)| {
                let index = *index;
                let program = program.clone();
                async move {
                    let group = &groups[index];
                    let (from, to) = group.route(&card.segments);
                    let key = CacheKey {
                        program: program.clone(),
                        from,
                        to,
                        depart: card.depart_date_for(group.start),
                        seat_count,
                    };
                    let response = self.fetch(&program, &key).await;
                    (index, program, key, response)
                }
            });

        for (index, program, key, response) in join_all(individual_lookups).await {
            if let Some(response) = response {
                let span = result_key(&results, span_name(&key.from, &key.to), index);
                results.insert(
                    span,
                    SpanOutcome::Individual {
                        program,
                        group: index,
                        response,
                    },
                );
            }
        }

        let display = display_entries(&selected, &results);
        let state = if selected
            .iter()
            .all(|(index, _)| results.values().any(|outcome| outcome.covers(*index)))
        {
            VerificationState::Success
        } else {
            VerificationState::PartialFailure
        };

        let outcome = VerificationOutcome {
            card_id: card.id,
            generation,
            state,
            results,
            display,
        };
        self.commit(outcome.clone());
        Ok(outcome)
    }

    /// One merged lookup; accepted only when some returned option covers
    /// every required flight number. An accepted merge suppresses the
    /// members' individual lookups entirely.
    async fn merged_lookup(
        &self,
        card: &VerificationCard,
        groups: &[SegmentGroup],
        program: &str,
        indices: &[usize],
        seat_count: u32,
    ) -> Option<(String, SpanOutcome)> {
        let first = &groups[indices[0]];
        let last = &groups[*indices.last().expect("non-empty merge candidate")];
        let key = CacheKey {
            program: program.to_string(),
            from: card.segments[first.start].origin.clone(),
            to: card.segments[last.end].destination.clone(),
            depart: card.depart_date_for(first.start),
            seat_count,
        };

        let response = self.fetch(program, &key).await?;
        let required: Vec<&str> = (first.start..=last.end)
            .map(|i| card.segments[i].flight_number.as_str())
            .collect();
        if response.option_covering(required.iter().copied()).is_none() {
            tracing::debug!(span = %key.render(), "merged result misses required flights, falling back");
            return None;
        }

        Some((
            span_name(&key.from, &key.to),
            SpanOutcome::Merged {
                program: program.to_string(),
                groups: indices.to_vec(),
                response,
            },
        ))
    }

    /// Cache-first lookup. Any failure (transport, non-2xx, timeout)
    /// degrades to `None`: the span simply shows no pricing, nothing else
    /// fails.
    async fn fetch(&self, program: &str, key: &CacheKey) -> Option<LiveSearchResponse> {
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!(key = %key.render(), "live-search cache hit");
            return Some(hit);
        }

        let request = LiveSearchRequest {
            from: key.from.clone(),
            to: key.to.clone(),
            depart: key.depart.format("%Y-%m-%d").to_string(),
            adt: key.seat_count,
        };
        match tokio::time::timeout(self.lookup_timeout, self.client.search(program, &request)).await
        {
            Ok(Ok(response)) => {
                self.cache.insert(key, response.clone());
                Some(response)
            }
            Ok(Err(err)) => {
                tracing::warn!(key = %key.render(), error = %err, "live-search lookup failed");
                None
            }
            Err(_) => {
                tracing::warn!(key = %key.render(), timeout = ?self.lookup_timeout, "live-search lookup timed out");
                None
            }
        }
    }

    fn next_generation(&self, card_id: Uuid) -> u64 {
        let mut store = self.store.lock().expect("verifier store poisoned");
        let stored = store.entry(card_id).or_insert_with(StoredVerification::new);
        stored.issued_generation += 1;
        stored.touched_at = Instant::now();
        let generation = stored.issued_generation;
        evict_over_capacity(&mut store, card_id, self.store_capacity);
        generation
    }

    /// Last-write-wins guarded by generation: an outcome older than the one
    /// already committed is discarded.
    fn commit(&self, outcome: VerificationOutcome) {
        let mut store = self.store.lock().expect("verifier store poisoned");
        let stored = store.entry(outcome.card_id).or_insert_with(StoredVerification::new);
        stored.touched_at = Instant::now();
        match &stored.outcome {
            Some(existing) if existing.generation > outcome.generation => {
                tracing::debug!(
                    card = %outcome.card_id,
                    stale = outcome.generation,
                    current = existing.generation,
                    "discarding stale verification outcome"
                );
            }
            _ => stored.outcome = Some(outcome),
        }
    }
}

fn span_name(from: &str, to: &str) -> String {
    format!("{from}-{to}")
}

/// Keeps the per-card store bounded: least recently touched cards beyond
/// `capacity` are dropped, never the card currently being written.
fn evict_over_capacity(
    store: &mut HashMap<Uuid, StoredVerification>,
    current: Uuid,
    capacity: usize,
) {
    while store.len() > capacity {
        let oldest = store
            .iter()
            .filter(|(id, _)| **id != current)
            .min_by_key(|(_, stored)| stored.touched_at)
            .map(|(id, _)| *id);
        match oldest {
            Some(id) => {
                tracing::debug!(card = %id, "evicting stale verification card");
                store.remove(&id);
            }
            None => break,
        }
    }
}

/// Result-map key for a span. An itinerary that revisits a route span would
/// otherwise overwrite an earlier group's result, so later entries for an
/// occupied span are disambiguated with the first covered group index.
fn result_key(
    results: &BTreeMap<String, SpanOutcome>,
    span: String,
    first_group: usize,
) -> String {
    if results.contains_key(&span) {
        format!("{span}#{first_group}")
    } else {
        span
    }
}

fn validate_selections(
    groups: &[SegmentGroup],
    selections: &HashMap<usize, String>,
) -> Result<Vec<(usize, String)>, VerifyError> {
    if let Some(&index) = selections.keys().find(|&&index| index >= groups.len()) {
        return Err(VerifyError::UnknownGroup(index));
    }

    let mut selected = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        if group.is_unreliable() {
            continue;
        }
        match selections.get(&index) {
            Some(program) => selected.push((index, program.clone())),
            None => return Err(VerifyError::MissingProgram(index)),
        }
    }
    if selected.is_empty() {
        return Err(VerifyError::NothingSelected);
    }
    Ok(selected)
}

/// Maximal runs of index-adjacent groups sharing one program.
fn merge_candidates(
    groups: &[SegmentGroup],
    selected: &[(usize, String)],
) -> Vec<Vec<(usize, String)>> {
    let mut runs: Vec<Vec<(usize, String)>> = Vec::new();
    for (index, program) in selected {
        let extend = runs.last().and_then(|run| run.last()).is_some_and(
            |(prev_index, prev_program)| {
                groups[*prev_index].end + 1 == groups[*index].start && prev_program == program
            },
        );
        if extend {
            runs.last_mut().expect("non-empty runs").push((*index, program.clone()));
        } else {
            runs.push(vec![(*index, program.clone())]);
        }
    }
    runs
}

/// Render list with merged spans deduplicated: the first group covered by a
/// successful multi-group merge is shown, later covered groups are hidden.
fn display_entries(
    selected: &[(usize, String)],
    results: &BTreeMap<String, SpanOutcome>,
) -> Vec<DisplayEntry> {
    let mut entries = Vec::new();
    for (index, _) in selected {
        let hit = results.iter().find(|(_, outcome)| outcome.covers(*index));
        if let Some((span, outcome)) = hit {
            let show = match outcome {
                SpanOutcome::Merged { groups, .. } => groups[0] == *index,
                SpanOutcome::Individual { .. } => true,
            };
            if show {
                entries.push(DisplayEntry {
                    group: *index,
                    span: span.clone(),
                });
            }
        }
    }
    entries
}
