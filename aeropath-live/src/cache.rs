use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::wire::LiveSearchResponse;

pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Injectable time source so TTL behavior is unit-testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Stable, human-diffable cache key. The rendered form is an interop
/// contract: cached data must be shareable across instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub program: String,
    pub from: String,
    pub to: String,
    pub depart: NaiveDate,
    pub seat_count: u32,
}

impl CacheKey {
    pub fn render(&self) -> String {
        format!(
            "live-search:{}:{}:{}:{}:{}",
            self.program,
            self.from,
            self.to,
            self.depart.format("%Y-%m-%d"),
            self.seat_count
        )
    }
}

struct CacheEntry {
    value: LiveSearchResponse,
    inserted_at: DateTime<Utc>,
}

/// Process-lifetime, unbounded, best-effort cache for live-search responses.
///
/// Entries expire `ttl` after insertion and are evicted lazily on the next
/// read of that exact key; there is no proactive sweep. Values are immutable
/// once cached, so racing readers at worst repeat a lookup.
pub struct LiveSearchCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl LiveSearchCache {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self::with_ttl(clock, DEFAULT_TTL_MINUTES)
    }

    pub fn with_ttl(clock: Box<dyn Clock>, ttl_minutes: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
            clock,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<LiveSearchResponse> {
        let rendered = key.render();
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(&rendered) {
            Some(entry) if now - entry.inserted_at < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                tracing::debug!(key = %rendered, "evicting expired live-search entry");
                entries.remove(&rendered);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: &CacheKey, value: LiveSearchResponse) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.render(),
            CacheEntry {
                value,
                inserted_at: self.clock.now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
