//! Deterministic timer queue
//!
//! Stands in for the one-shot and repeating timers the book needs. Time
//! is whatever millisecond clock the caller feeds in, which keeps every
//! transition reproducible in tests.

use std::collections::BTreeMap;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<T> {
    due: u64,
    period: Option<u64>,
    task: T,
}

/// Timer queue keyed by `TimerId`, with due times in milliseconds.
/// The earliest due timer is found with a scan.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            timers: BTreeMap::new(),
        }
    }

    /// Current clock value. While a task is being run this is its due time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Run `task` once, `delay_ms` from now
    pub fn schedule_after(&mut self, delay_ms: u64, task: T) -> TimerId {
        self.insert(self.now + delay_ms, None, task)
    }

    /// Run `task` every `period_ms`, first after one period.
    /// A zero period is treated as one millisecond.
    pub fn schedule_every(&mut self, period_ms: u64, task: T) -> TimerId {
        let period = period_ms.max(1);
        self.insert(self.now + period, Some(period), task)
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward without running anything.
    /// Never moves backwards.
    pub fn settle(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    fn insert(&mut self, due: u64, period: Option<u64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { due, period, task });
        id
    }

    fn earliest_due(&self, until: u64) -> Option<TimerId> {
        self.timers
            .iter()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(id, timer)| (timer.due, **id))
            .map(|(id, _)| *id)
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its due time. Repeating timers are re-armed at the first multiple of
    /// their period after `until`, so missed periods are skipped rather
    /// than replayed.
    ///
    /// Call in a loop so a task that schedules or cancels other timers
    /// affects the rest of the batch.
    pub fn pop_due(&mut self, until: u64) -> Option<T> {
        let id = self.earliest_due(until)?;

        let timer = self.timers.get_mut(&id)?;
        self.now = self.now.max(timer.due);

        match timer.period {
            Some(period) => {
                timer.due += period * ((until - timer.due) / period + 1);
                Some(timer.task.clone())
            }
            None => self.timers.remove(&id).map(|timer| timer.task),
        }
    }
}
