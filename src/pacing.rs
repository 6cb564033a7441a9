use std::time::Duration;

use crate::config::{MAX_MAINLOOP_INTERVAL_MS, MAX_SPEED, MIN_MAINLOOP_INTERVAL_MS, MIN_SPEED};
use crate::game::TimerEvent;
use crate::scheduler::{Scheduler, TimerHandle};

/// Milliseconds shaved off the main-loop interval per speed level.
const K: f64 = (MAX_MAINLOOP_INTERVAL_MS - MIN_MAINLOOP_INTERVAL_MS) as f64 / MAX_SPEED as f64;

/// Clamps a requested speed level into `[MIN_SPEED, MAX_SPEED]`.
#[must_use]
pub fn clamp_speed(speed: i64) -> u32 {
    let clamped = speed.clamp(i64::from(MIN_SPEED), i64::from(MAX_SPEED));
    u32::try_from(clamped).unwrap_or(MIN_SPEED)
}

/// Main-loop interval for a speed level: `floor(MAX_INTERVAL - K * speed)`.
#[must_use]
pub fn tick_interval(speed: u32) -> Duration {
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    let millis = (MAX_MAINLOOP_INTERVAL_MS as f64 - K * f64::from(speed)).floor();
    let millis = (millis as u64).clamp(MIN_MAINLOOP_INTERVAL_MS, MAX_MAINLOOP_INTERVAL_MS);
    Duration::from_millis(millis)
}

/// Owns the speed level and the repeating main-loop timer.
#[derive(Debug, Clone)]
pub struct Pacer {
    speed: u32,
    tick_timer: Option<TimerHandle>,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: MIN_SPEED,
            tick_timer: None,
        }
    }

    /// Sets the speed and restarts the main loop at the matching interval.
    ///
    /// Also used to start the loop in the first place. Returns the interval.
    pub fn adjust(&mut self, speed: i64, scheduler: &mut Scheduler<TimerEvent>) -> Duration {
        self.speed = clamp_speed(speed);
        self.stop(scheduler);

        let interval = tick_interval(self.speed);
        self.tick_timer = Some(scheduler.schedule_repeating(interval, TimerEvent::MainLoop));
        interval
    }

    /// Cancels the main loop, keeping the speed level.
    pub fn stop(&mut self, scheduler: &mut Scheduler<TimerEvent>) {
        if let Some(handle) = self.tick_timer.take() {
            let _ = scheduler.cancel(handle);
        }
    }

    #[must_use]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    #[must_use]
    pub fn is_running(&self, scheduler: &Scheduler<TimerEvent>) -> bool {
        self.tick_timer
            .is_some_and(|handle| scheduler.is_pending(handle))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{clamp_speed, tick_interval, Pacer};
    use crate::config::{MAX_SPEED, MIN_SPEED};
    use crate::game::TimerEvent;
    use crate::scheduler::Scheduler;

    #[test]
    fn speed_is_clamped_not_rejected() {
        assert_eq!(clamp_speed(0), MIN_SPEED);
        assert_eq!(clamp_speed(-7), MIN_SPEED);
        assert_eq!(clamp_speed(12), 12);
        assert_eq!(clamp_speed(99), MAX_SPEED);
    }

    #[test]
    fn interval_endpoints() {
        assert_eq!(tick_interval(1), Duration::from_millis(115));
        assert_eq!(tick_interval(MAX_SPEED), Duration::from_millis(20));
    }

    #[test]
    fn interval_strictly_decreases_with_speed() {
        for speed in MIN_SPEED..MAX_SPEED {
            assert!(tick_interval(speed) > tick_interval(speed + 1));
        }
    }

    #[test]
    fn adjust_replaces_the_running_loop() {
        let mut scheduler = Scheduler::new();
        let mut pacer = Pacer::new();

        pacer.adjust(1, &mut scheduler);
        let interval = pacer.adjust(25, &mut scheduler);

        assert_eq!(pacer.speed(), MAX_SPEED);
        assert_eq!(interval, Duration::from_millis(20));
        assert_eq!(scheduler.pending_count(), 1);

        let (_, event) = scheduler.pop_due(1_000).expect("main loop should be armed");
        assert_eq!(event, TimerEvent::MainLoop);
        assert_eq!(scheduler.now_ms(), 20);
    }

    #[test]
    fn stop_cancels_the_loop() {
        let mut scheduler = Scheduler::new();
        let mut pacer = Pacer::new();

        pacer.adjust(3, &mut scheduler);
        assert!(pacer.is_running(&scheduler));
        pacer.stop(&mut scheduler);

        assert!(!pacer.is_running(&scheduler));
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(pacer.speed(), 3);
    }
}
