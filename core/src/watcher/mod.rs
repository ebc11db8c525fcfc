//! Polling mirror of the launches collection.
//!
//! # Design
//! A `Watcher` bootstraps a full snapshot by paging through the collection
//! (page n+1 only after page n succeeded), then polls with
//! `modified_since = cursor` every interval and diffs the results against
//! its cache, emitting `New` and `Change` events.
//!
//! - The poll loop awaits each request before waiting for the next tick, and
//!   missed ticks are skipped, so at most one request is ever in flight.
//! - The cursor only advances after a successful poll. A failed poll is
//!   reported and re-requests the same window on the next tick.
//! - `stop()` signals the loop; a request already in flight completes, but
//!   its result is discarded once the state is `Stopped`.
//! - The state lock is never held across an `.await`, but events are emitted
//!   under it, so nothing reaches subscribers after `stop()` returns.

mod events;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ConfigError, Error};
use crate::params::{parse_number, validate, DatePrecision, FieldKind, RawValue, WireParams};
use crate::resource::Resource;
use crate::types::{Page, Record};

pub use events::{EventKind, WatchEvent};
use events::EventBus;

pub const DEFAULT_INTERVAL_MINUTES: f64 = 5.0;
pub const MIN_INTERVAL_MINUTES: f64 = 1.0;

/// Source of launch pages for a watcher.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, params: &WireParams) -> Result<Page, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Uninitialized,
    Bootstrapping,
    Ready,
    Polling,
    Stopped,
}

/// Resolve a caller-supplied polling interval to minutes.
///
/// Absent means the default. Zero or negative is a configuration error.
/// Anything below the minimum, or anything non-numeric, falls back to the
/// default with a logged warning. An interval too long to schedule is a
/// configuration error.
pub fn resolve_interval(raw: &RawValue) -> Result<f64, ConfigError> {
    let minutes = match raw {
        RawValue::Undefined => return Ok(DEFAULT_INTERVAL_MINUTES),
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::String(s) => parse_number(s),
        _ => None,
    };
    let Some(minutes) = minutes else {
        error!(
            kind = raw.kind(),
            default = DEFAULT_INTERVAL_MINUTES,
            "watcher interval is not a number, using the default"
        );
        return Ok(DEFAULT_INTERVAL_MINUTES);
    };
    if minutes <= 0.0 {
        return Err(ConfigError::InvalidInterval { minutes });
    }
    if minutes < MIN_INTERVAL_MINUTES {
        warn!(
            minutes,
            minimum = MIN_INTERVAL_MINUTES,
            default = DEFAULT_INTERVAL_MINUTES,
            "watcher interval below the minimum, using the default"
        );
        return Ok(DEFAULT_INTERVAL_MINUTES);
    }
    if interval_duration(minutes).is_none() {
        return Err(ConfigError::IntervalTooLong { minutes });
    }
    Ok(minutes)
}

/// The interval as a `Duration`, provided its first tick is representable.
fn interval_duration(minutes: f64) -> Option<Duration> {
    let interval = Duration::try_from_secs_f64(minutes * 60.0).ok()?;
    Instant::now().checked_add(interval)?;
    Some(interval)
}

struct Mirror {
    state: WatcherState,
    cache: HashMap<i64, Record>,
    cursor: Option<DateTime<Utc>>,
}

struct Shared<F> {
    fetcher: F,
    interval: Duration,
    options: WireParams,
    events: EventBus,
    mirror: Mutex<Mirror>,
}

/// Handle to one polling mirror of the launches collection.
///
/// Dropping the handle stops the watcher.
pub struct Watcher<F: Fetch> {
    shared: Arc<Shared<F>>,
    shutdown: watch::Sender<bool>,
}

impl<F: Fetch> Watcher<F> {
    /// Validate the interval (minutes) and launches `options`; nothing is
    /// fetched until `start()`.
    pub fn new(fetcher: F, interval: &RawValue, options: &RawValue) -> Result<Self, Error> {
        let minutes = resolve_interval(interval)?;
        let interval = interval_duration(minutes).ok_or(ConfigError::IntervalTooLong { minutes })?;
        let options = validate(Resource::Launches, options)?.params;
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            shared: Arc::new(Shared {
                fetcher,
                interval,
                options,
                events: EventBus::default(),
                mirror: Mutex::new(Mirror {
                    state: WatcherState::Uninitialized,
                    cache: HashMap::new(),
                    cursor: None,
                }),
            }),
            shutdown,
        })
    }

    /// Begin bootstrapping on the current tokio runtime. Only the first call
    /// on an uninitialized watcher has any effect.
    pub fn start(&self) {
        {
            let mut mirror = self.shared.lock();
            if mirror.state != WatcherState::Uninitialized {
                debug!(state = ?mirror.state, "watcher already started");
                return;
            }
            mirror.state = WatcherState::Bootstrapping;
        }
        info!(interval_secs = self.shared.interval.as_secs_f64(), "starting launch watcher");
        let shared = Arc::clone(&self.shared);
        let shutdown = self.shutdown.subscribe();
        tokio::spawn(run(shared, shutdown));
    }

    /// Stop polling and drop the cache. Idempotent.
    pub fn stop(&self) {
        {
            let mut mirror = self.shared.lock();
            if mirror.state == WatcherState::Stopped {
                return;
            }
            mirror.state = WatcherState::Stopped;
            mirror.cache.clear();
        }
        self.shutdown.send_replace(true);
        info!("launch watcher stopped");
    }

    /// Receive every event.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<WatchEvent> {
        self.shared.events.subscribe(None)
    }

    /// Receive only events of the given kinds.
    pub fn subscribe_to(&self, kinds: &[EventKind]) -> mpsc::UnboundedReceiver<WatchEvent> {
        self.shared.events.subscribe(Some(kinds))
    }

    pub fn state(&self) -> WatcherState {
        self.shared.lock().state
    }

    /// Time of the last successful bootstrap or poll.
    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.shared.lock().cursor
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn cache_len(&self) -> usize {
        self.shared.lock().cache.len()
    }

    pub fn cached(&self, id: i64) -> Option<Record> {
        self.shared.lock().cache.get(&id).cloned()
    }

    pub fn records(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self.shared.lock().cache.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }
}

impl<F: Fetch> Drop for Watcher<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<F: Fetch>(shared: Arc<Shared<F>>, mut shutdown: watch::Receiver<bool>) {
    if !shared.bootstrap().await {
        return;
    }

    let now = Instant::now();
    let (first, period) = match now.checked_add(shared.interval) {
        Some(first) => (first, shared.interval),
        None => {
            let fallback = Duration::from_secs_f64(DEFAULT_INTERVAL_MINUTES * 60.0);
            error!(
                interval_secs = shared.interval.as_secs_f64(),
                default = DEFAULT_INTERVAL_MINUTES,
                "watcher interval cannot be scheduled, using the default"
            );
            (now + fallback, fallback)
        }
    };
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }
        if !shared.poll().await {
            break;
        }
    }
    debug!("watcher loop exited");
}

impl<F: Fetch> Shared<F> {
    fn lock(&self) -> MutexGuard<'_, Mirror> {
        self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emit while the caller still holds the mirror, so a concurrent `stop()`
    /// either happens before the state check or after the event is queued.
    /// Only `InitializationError` is delivered in the `Stopped` state.
    fn publish(&self, mirror: &MutexGuard<'_, Mirror>, event: WatchEvent) {
        if mirror.state == WatcherState::Stopped && event.kind() != EventKind::InitializationError {
            debug!(kind = ?event.kind(), "dropping event after stop");
            return;
        }
        self.events.emit(event);
    }

    /// Page through the whole collection. Returns false if the watcher ended
    /// up stopped.
    async fn bootstrap(&self) -> bool {
        let started = Utc::now();
        let mut ingested: Vec<Record> = Vec::new();
        let mut page = 1u32;

        loop {
            let mut params = self.options.clone();
            params.insert("page", page.to_string());
            let result = self.fetcher.fetch(&params).await;

            let mut mirror = self.lock();
            if mirror.state == WatcherState::Stopped {
                return false;
            }
            match result {
                Ok(fetched) => {
                    debug!(page, last_page = fetched.last_page, records = fetched.result.len(), "bootstrap page");
                    for record in fetched.result {
                        if mirror.cache.insert(record.id, record.clone()).is_some() {
                            // Records can shift between pages while we read.
                            ingested.retain(|r| r.id != record.id);
                        }
                        ingested.push(record);
                    }
                    if page >= fetched.last_page {
                        mirror.state = WatcherState::Ready;
                        mirror.cursor = Some(started);
                        info!(records = ingested.len(), "launch watcher ready");
                        self.publish(&mirror, WatchEvent::Ready(ingested));
                        return true;
                    }
                    page += 1;
                }
                Err(err) => {
                    mirror.cache.clear();
                    mirror.state = WatcherState::Stopped;
                    error!(page, error = %err, "launch watcher failed to initialize");
                    self.publish(&mirror, WatchEvent::InitializationError(err));
                    return false;
                }
            }
        }
    }

    /// One incremental poll. Returns false if the watcher ended up stopped.
    async fn poll(&self) -> bool {
        let cursor = {
            let mut mirror = self.lock();
            if mirror.state == WatcherState::Stopped {
                return false;
            }
            mirror.state = WatcherState::Polling;
            mirror.cursor
        };

        let issued = Utc::now();
        let mut params = self.options.clone();
        if let Some(cursor) = cursor {
            if let Ok(since) = FieldKind::Date(DatePrecision::Full).coerce(&RawValue::Date(cursor)) {
                params.insert("modified_since", since);
            }
        }
        let result = self.fetcher.fetch(&params).await;

        let mut mirror = self.lock();
        if mirror.state == WatcherState::Stopped {
            debug!("discarding poll result after stop");
            return false;
        }
        mirror.state = WatcherState::Ready;
        match result {
            Ok(fetched) => {
                let mut events = Vec::new();
                for record in fetched.result {
                    match mirror.cache.insert(record.id, record.clone()) {
                        None => events.push(WatchEvent::New(record)),
                        Some(previous) if previous != record => events.push(WatchEvent::Change {
                            previous,
                            current: record,
                        }),
                        Some(_) => {}
                    }
                }
                mirror.cursor = Some(mirror.cursor.map_or(issued, |c| c.max(issued)));
                debug!(events = events.len(), "poll complete");
                for event in events {
                    self.publish(&mirror, event);
                }
            }
            Err(err) => {
                warn!(error = %err, "launch poll failed, retrying next tick");
                self.publish(&mirror, WatchEvent::Error(err));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_resolution() {
        assert_eq!(resolve_interval(&RawValue::Undefined), Ok(5.0));
        assert_eq!(resolve_interval(&RawValue::Number(10.0)), Ok(10.0));
        assert_eq!(resolve_interval(&"2".into()), Ok(2.0));
        assert_eq!(resolve_interval(&RawValue::Number(0.5)), Ok(5.0));
        assert_eq!(resolve_interval(&"soon".into()), Ok(5.0));
        assert_eq!(resolve_interval(&RawValue::Bool(true)), Ok(5.0));
        assert_eq!(
            resolve_interval(&RawValue::Number(0.0)),
            Err(ConfigError::InvalidInterval { minutes: 0.0 })
        );
        assert_eq!(
            resolve_interval(&"-3".into()),
            Err(ConfigError::InvalidInterval { minutes: -3.0 })
        );
    }

    #[test]
    fn unschedulable_intervals_are_rejected() {
        // Too large for a Duration at all.
        assert_eq!(
            resolve_interval(&RawValue::Number(1e300)),
            Err(ConfigError::IntervalTooLong { minutes: 1e300 })
        );
        // Fits a Duration but overflows the first tick's Instant.
        assert_eq!(
            resolve_interval(&RawValue::Number(3e17)),
            Err(ConfigError::IntervalTooLong { minutes: 3e17 })
        );
        // A year is fine.
        assert_eq!(resolve_interval(&RawValue::Number(525_600.0)), Ok(525_600.0));
        assert_eq!(
            interval_duration(525_600.0),
            Some(Duration::from_secs(525_600 * 60))
        );
    }

    struct NoFeed;

    #[async_trait]
    impl Fetch for NoFeed {
        async fn fetch(&self, _params: &WireParams) -> Result<Page, ApiError> {
            Err(ApiError::NotFound)
        }
    }

    fn shared(state: WatcherState) -> Shared<NoFeed> {
        Shared {
            fetcher: NoFeed,
            interval: Duration::from_secs(60),
            options: WireParams::new(),
            events: EventBus::default(),
            mirror: Mutex::new(Mirror {
                state,
                cache: HashMap::new(),
                cursor: None,
            }),
        }
    }

    #[test]
    fn nothing_but_initialization_errors_is_published_once_stopped() {
        let shared = shared(WatcherState::Stopped);
        let mut events = shared.events.subscribe(None);
        {
            let mirror = shared.lock();
            shared.publish(&mirror, WatchEvent::New(Record::new(1)));
            shared.publish(&mirror, WatchEvent::Ready(Vec::new()));
            shared.publish(&mirror, WatchEvent::Error(ApiError::NotFound));
            shared.publish(&mirror, WatchEvent::InitializationError(ApiError::NotFound));
        }
        assert_eq!(
            events.try_recv().unwrap(),
            WatchEvent::InitializationError(ApiError::NotFound)
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn running_watchers_publish_every_event() {
        let shared = shared(WatcherState::Ready);
        let mut events = shared.events.subscribe(None);
        let mirror = shared.lock();
        shared.publish(&mirror, WatchEvent::New(Record::new(1)));
        drop(mirror);
        assert_eq!(events.try_recv().unwrap(), WatchEvent::New(Record::new(1)));
    }
}
