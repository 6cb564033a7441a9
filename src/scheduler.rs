use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Identifies one armed timer. A repeating timer keeps its handle across
/// re-arms until it is cancelled.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer<E> {
    handle: TimerHandle,
    event: E,
    repeat_ms: Option<u64>,
}

/// Virtual millisecond clock with one-shot and repeating cancelable timers.
///
/// Nothing fires by itself: the owner advances time through
/// [`Scheduler::pop_due`] and dispatches each returned event to completion
/// before asking for the next one. Events due at the same instant come out in
/// the order they were armed.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now_ms: u64,
    next_seq: u64,
    queue: BTreeMap<(u64, u64), Timer<E>>,
    keys: HashMap<TimerHandle, (u64, u64)>,
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Scheduler<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            keys: HashMap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Arms a timer that fires once after `delay`.
    pub fn schedule_once(&mut self, delay: Duration, event: E) -> TimerHandle {
        self.arm(duration_ms(delay), None, event)
    }

    /// Arms a timer that fires every `interval` until cancelled.
    pub fn schedule_repeating(&mut self, interval: Duration, event: E) -> TimerHandle {
        let interval_ms = duration_ms(interval).max(1);
        self.arm(interval_ms, Some(interval_ms), event)
    }

    /// Disarms a timer. Returns false when it had already fired or been cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(key) = self.keys.remove(&handle) else {
            return false;
        };
        self.queue.remove(&key).is_some()
    }

    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.keys.contains_key(&handle)
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Removes the earliest timer due at or before `until`, moving the clock
    /// to its due time. Repeating timers are re-armed one interval later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, E)> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > until_ms {
            return None;
        }

        let timer = self.queue.remove(&key)?;
        self.keys.remove(&timer.handle);
        self.now_ms = self.now_ms.max(key.0);

        if let Some(repeat_ms) = timer.repeat_ms {
            let next_key = (key.0.saturating_add(repeat_ms), self.bump_seq());
            self.keys.insert(timer.handle, next_key);
            self.queue.insert(
                next_key,
                Timer {
                    handle: timer.handle,
                    event: timer.event.clone(),
                    repeat_ms: Some(repeat_ms),
                },
            );
        }

        Some((timer.handle, timer.event))
    }

    /// Moves the clock forward without firing anything; never moves it back.
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn arm(&mut self, delay_ms: u64, repeat_ms: Option<u64>, event: E) -> TimerHandle {
        let seq = self.bump_seq();
        let handle = TimerHandle(seq);
        let key = (self.now_ms.saturating_add(delay_ms), seq);

        self.keys.insert(handle, key);
        self.queue.insert(
            key,
            Timer {
                handle,
                event,
                repeat_ms,
            },
        );
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
