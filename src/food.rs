use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::FoodSpec;
use crate::game::TimerEvent;
use crate::grid::Position;
use crate::scheduler::{Scheduler, TimerHandle};

/// Shortest armed delay; two zero-length timers would ping-pong forever at
/// a single instant.
const MIN_TIMER_DELAY: Duration = Duration::from_millis(1);

/// Index of a food in the session's catalog.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FoodId(pub usize);

/// Display color, passed through to the renderer untouched.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodColor {
    Yellow,
    Red,
    Blue,
    Purple,
    Black,
}

/// How many points an effect feeds into the score formula.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreIncrement {
    Fixed(u64),
    /// `n` per body segment at the moment of eating.
    PerSegment(u64),
    /// The score accumulated so far.
    CurrentScore,
}

impl ScoreIncrement {
    #[must_use]
    pub fn resolve(self, length: usize, score: u64) -> u64 {
        match self {
            Self::Fixed(points) => points,
            Self::PerSegment(points) => points.saturating_mul(length as u64),
            Self::CurrentScore => score,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    Add(usize),
    Multiply(usize),
}

impl Growth {
    #[must_use]
    pub fn apply(self, length: usize) -> usize {
        match self {
            Self::Add(segments) => length.saturating_add(segments),
            Self::Multiply(factor) => length.saturating_mul(factor),
        }
    }
}

/// What eating a food does to the session.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FoodEffect {
    /// Score, then lengthen, then change speed by `speed_step`.
    ScoreAndGrow {
        score: ScoreIncrement,
        growth: Growth,
        speed_step: i32,
    },
    /// Score, then divide the length (rounding down).
    ScoreAndShrink { score: ScoreIncrement, divisor: usize },
    /// Score, then drop back to one segment at speed 1.
    ResetAll { score: ScoreIncrement },
    InstantGameOver,
}

/// Which half of the spawn/remove cycle a food is waiting on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimerKind {
    Spawn,
    Remove,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct PendingTimer {
    kind: TimerKind,
    handle: TimerHandle,
}

/// A food item cycling between off-grid and on-grid on random timers.
///
/// The single `pending` slot holds whichever timer is armed, so arming one
/// half of the cycle always disarms the other.
#[derive(Debug, Clone)]
pub struct Food {
    id: FoodId,
    color: FoodColor,
    position: Option<Position>,
    spawn_in: Duration,
    remove_in: Duration,
    effect: FoodEffect,
    pending: Option<PendingTimer>,
}

impl Food {
    #[must_use]
    pub fn new(
        id: FoodId,
        color: FoodColor,
        spawn_in: Duration,
        remove_in: Duration,
        effect: FoodEffect,
    ) -> Self {
        Self {
            id,
            color,
            position: None,
            spawn_in,
            remove_in,
            effect,
            pending: None,
        }
    }

    #[must_use]
    pub fn from_spec(id: FoodId, spec: &FoodSpec) -> Self {
        Self::new(id, spec.color, spec.spawn_in(), spec.remove_in(), spec.effect)
    }

    /// Takes the food off the grid and arms its spawn timer.
    ///
    /// Returns the chosen delay.
    pub fn schedule_spawn<R: Rng + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        rng: &mut R,
    ) -> Duration {
        self.cancel_pending(scheduler);
        self.position = None;

        let delay = random_delay(rng, self.spawn_in).max(MIN_TIMER_DELAY);
        let handle = scheduler.schedule_once(delay, TimerEvent::FoodSpawn(self.id));
        self.pending = Some(PendingTimer {
            kind: TimerKind::Spawn,
            handle,
        });
        delay
    }

    /// Arms the timer that takes an uneaten food off the grid.
    ///
    /// Returns the chosen delay.
    pub fn schedule_remove<R: Rng + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        rng: &mut R,
    ) -> Duration {
        self.cancel_pending(scheduler);

        let delay = random_delay(rng, self.remove_in).max(MIN_TIMER_DELAY);
        let handle = scheduler.schedule_once(delay, TimerEvent::FoodRemove(self.id));
        self.pending = Some(PendingTimer {
            kind: TimerKind::Remove,
            handle,
        });
        delay
    }

    /// Puts the food on the grid at `position`.
    pub fn activate(&mut self, position: Position) {
        self.position = Some(position);
    }

    /// Stops the cycle: disarms any timer and takes the food off the grid.
    ///
    /// Returns the cell the food occupied, if any, so its visual can be cleared.
    pub fn delete(&mut self, scheduler: &mut Scheduler<TimerEvent>) -> Option<Position> {
        self.cancel_pending(scheduler);
        self.position.take()
    }

    /// The armed timer's kind, if the cycle is running.
    #[must_use]
    pub fn pending(&self, scheduler: &Scheduler<TimerEvent>) -> Option<TimerKind> {
        self.pending
            .filter(|pending| scheduler.is_pending(pending.handle))
            .map(|pending| pending.kind)
    }

    #[must_use]
    pub fn id(&self) -> FoodId {
        self.id
    }

    #[must_use]
    pub fn color(&self) -> FoodColor {
        self.color
    }

    /// Current cell, or `None` while off the grid.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.position.is_some()
    }

    #[must_use]
    pub fn effect(&self) -> FoodEffect {
        self.effect
    }

    fn cancel_pending(&mut self, scheduler: &mut Scheduler<TimerEvent>) {
        if let Some(pending) = self.pending.take() {
            let _ = scheduler.cancel(pending.handle);
        }
    }
}

/// Uniform whole-millisecond delay in `[0, bound)`.
pub fn random_delay<R: Rng + ?Sized>(rng: &mut R, bound: Duration) -> Duration {
    let bound_ms = u64::try_from(bound.as_millis()).unwrap_or(u64::MAX);
    if bound_ms == 0 {
        return Duration::ZERO;
    }

    Duration::from_millis(rng.gen_range(0..bound_ms))
}
