use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::collision::{food_at, random_free_position};
use crate::config::{ELAPSED_TICK, GameConfig, MESSAGE_GAME_OVER, MESSAGE_PRESS_START, MIN_SPEED};
use crate::food::{Food, FoodEffect, FoodId};
use crate::grid::{GridSize, Position};
use crate::input::{Direction, GameInput};
use crate::pacing::Pacer;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::sink::{CellKind, DisplaySink, NullDisplay, NullRenderer, Renderer, Stats};
use crate::snake::Snake;

/// Timer payloads dispatched by the session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimerEvent {
    MainLoop,
    ElapsedSecond,
    FoodSpawn(FoodId),
    FoodRemove(FoodId),
}

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameStatus {
    Idle,
    Playing,
    GameOver,
}

/// Why the last game ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameOverReason {
    SelfCollision,
    Eaten(FoodId),
}

/// Complete mutable game state, plus the clock and collaborators it drives.
///
/// The session is the only owner of its timers: callers feed it input and
/// elapsed time, and every due timer is dispatched to completion in order.
pub struct Session<R, D> {
    pub snake: Snake,
    foods: Vec<Food>,
    score: u64,
    elapsed_secs: u64,
    status: GameStatus,
    game_over_reason: Option<GameOverReason>,
    grid: GridSize,
    pacer: Pacer,
    elapsed_timer: Option<TimerHandle>,
    scheduler: Scheduler<TimerEvent>,
    rng: StdRng,
    renderer: R,
    display: D,
}

impl Session<NullRenderer, NullDisplay> {
    /// Seeded session without collaborators, for simulations and tests.
    #[must_use]
    pub fn headless(grid: GridSize, config: &GameConfig, seed: u64) -> Self {
        Self::new_with_seed(grid, config, seed, NullRenderer, NullDisplay)
    }
}

impl<R: Renderer, D: DisplaySink> Session<R, D> {
    /// Creates an idle session seeded from OS entropy.
    pub fn new(grid: GridSize, config: &GameConfig, renderer: R, display: D) -> Self {
        Self::with_rng(grid, config, StdRng::from_entropy(), renderer, display)
    }

    /// Creates a deterministic idle session for tests and reproducible runs.
    pub fn new_with_seed(
        grid: GridSize,
        config: &GameConfig,
        seed: u64,
        renderer: R,
        display: D,
    ) -> Self {
        Self::with_rng(grid, config, StdRng::seed_from_u64(seed), renderer, display)
    }

    fn with_rng(grid: GridSize, config: &GameConfig, rng: StdRng, renderer: R, display: D) -> Self {
        let foods = config
            .foods
            .iter()
            .enumerate()
            .map(|(index, spec)| Food::from_spec(FoodId(index), spec))
            .collect();

        let mut session = Self {
            snake: Snake::new(grid.center(), Direction::Down),
            foods,
            score: 0,
            elapsed_secs: 0,
            status: GameStatus::Idle,
            game_over_reason: None,
            grid,
            pacer: Pacer::new(),
            elapsed_timer: None,
            scheduler: Scheduler::new(),
            rng,
            renderer,
            display,
        };
        session.display.show_message(MESSAGE_PRESS_START);
        session
    }

    /// Resets everything and begins a new game. Ignored while playing.
    pub fn start(&mut self) {
        if self.status == GameStatus::Playing {
            return;
        }

        self.renderer.clear_all();
        self.status = GameStatus::Playing;
        self.game_over_reason = None;
        self.elapsed_secs = 0;
        self.score = 0;
        self.adjust_speed(i64::from(MIN_SPEED));

        for food in &mut self.foods {
            food.schedule_spawn(&mut self.scheduler, &mut self.rng);
        }

        // Every food is off the grid and the old body is gone, so any cell is free.
        let start = Position::new(
            self.rng.gen_range(0..i32::from(self.grid.width)),
            self.rng.gen_range(0..i32::from(self.grid.height)),
        );
        self.snake = Snake::new(start, Direction::Down);
        self.renderer.draw_cell(start, CellKind::SnakeHead);

        if let Some(handle) = self.elapsed_timer.take() {
            let _ = self.scheduler.cancel(handle);
        }
        self.elapsed_timer = Some(
            self.scheduler
                .schedule_repeating(ELAPSED_TICK, TimerEvent::ElapsedSecond),
        );

        self.show_stats();
        self.display.show_elapsed(&self.elapsed_hms());
        self.display.show_message("");

        info!(
            width = self.grid.width,
            height = self.grid.height,
            x = start.x,
            y = start.y,
            "game started"
        );
    }

    /// Applies one external input event.
    pub fn apply_input(&mut self, input: GameInput) {
        match input {
            GameInput::Direction(direction) => {
                if self.status == GameStatus::Playing {
                    self.push_direction(direction);
                }
            }
            GameInput::Start => self.start(),
            GameInput::Quit => {}
        }
    }

    /// Queues a turn; see [`Snake::push_direction`].
    pub fn push_direction(&mut self, direction: Direction) -> bool {
        self.snake.push_direction(direction)
    }

    /// Moves the clock forward by `elapsed`, dispatching every timer that
    /// falls due on the way.
    pub fn advance(&mut self, elapsed: Duration) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let until_ms = self.scheduler.now_ms().saturating_add(elapsed_ms);

        while let Some((_, event)) = self.scheduler.pop_due(until_ms) {
            self.dispatch(event);
        }
        self.scheduler.advance_to(until_ms);
    }

    fn dispatch(&mut self, event: TimerEvent) {
        if self.status != GameStatus::Playing {
            return;
        }

        match event {
            TimerEvent::MainLoop => self.tick(),
            TimerEvent::ElapsedSecond => self.update_elapsed(1),
            TimerEvent::FoodSpawn(id) => self.spawn_food(id),
            TimerEvent::FoodRemove(id) => self.remove_food(id),
        }
    }

    /// Advances simulation by one gameplay tick.
    pub fn tick(&mut self) {
        if self.status != GameStatus::Playing {
            return;
        }

        if !self.snake.is_growing() {
            self.renderer.clear_cell(self.snake.tail());
        }
        let head = self.snake.advance(self.grid);
        self.renderer.draw_cell(head, CellKind::SnakeHead);

        if self.snake.head_overlaps_body() {
            self.game_over(GameOverReason::SelfCollision);
            return;
        }

        let Some(id) = food_at(&self.foods, head) else {
            return;
        };
        let Some(food) = self.foods.get_mut(id.0) else {
            return;
        };

        // Respawn first: the effect may end the game, which deletes the food.
        food.schedule_spawn(&mut self.scheduler, &mut self.rng);
        let effect = food.effect();
        debug!(food = id.0, x = head.x, y = head.y, ?effect, "food eaten");

        self.apply_effect(id, effect);
        self.show_stats();
    }

    fn apply_effect(&mut self, id: FoodId, effect: FoodEffect) {
        match effect {
            FoodEffect::ScoreAndGrow {
                score,
                growth,
                speed_step,
            } => {
                self.increase_score(score.resolve(self.snake.len(), self.score));
                self.resize_body(growth.apply(self.snake.len()));
                if speed_step != 0 {
                    self.adjust_speed(i64::from(self.speed()) + i64::from(speed_step));
                }
            }
            FoodEffect::ScoreAndShrink { score, divisor } => {
                self.increase_score(score.resolve(self.snake.len(), self.score));
                self.resize_body(self.snake.len() / divisor.max(1));
            }
            FoodEffect::ResetAll { score } => {
                self.increase_score(score.resolve(self.snake.len(), self.score));
                self.resize_body(1);
                self.adjust_speed(i64::from(MIN_SPEED));
            }
            FoodEffect::InstantGameOver => self.game_over(GameOverReason::Eaten(id)),
        }
    }

    /// Adds `floor(speed * increment + length)` to the score.
    pub fn increase_score(&mut self, increment: u64) {
        let gained = u64::from(self.speed())
            .saturating_mul(increment)
            .saturating_add(self.snake.len() as u64);
        self.score = self.score.saturating_add(gained);
    }

    /// Grows or shrinks the body, clearing the cells it leaves behind.
    ///
    /// The target is clamped to `1..=grid.total_cells()`.
    pub fn resize_body(&mut self, new_len: usize) {
        let target = new_len.min(self.grid.total_cells()).max(1);
        for vacated in self.snake.resize(target) {
            self.renderer.clear_cell(vacated);
        }
    }

    /// Changes the speed level and re-paces the main loop. Returns the new
    /// tick interval.
    pub fn adjust_speed(&mut self, speed: i64) -> Duration {
        let interval = self.pacer.adjust(speed, &mut self.scheduler);
        debug!(
            speed = self.pacer.speed(),
            interval_ms = interval.as_millis() as u64,
            "speed adjusted"
        );
        interval
    }

    /// Stops every timer and ends the game. Ignored unless playing.
    pub fn game_over(&mut self, reason: GameOverReason) {
        if self.status != GameStatus::Playing {
            return;
        }

        self.status = GameStatus::GameOver;
        self.game_over_reason = Some(reason);
        self.pacer.stop(&mut self.scheduler);
        if let Some(handle) = self.elapsed_timer.take() {
            let _ = self.scheduler.cancel(handle);
        }

        for food in &mut self.foods {
            if let Some(position) = food.delete(&mut self.scheduler) {
                self.renderer.clear_cell(position);
            }
        }

        self.display.show_message(MESSAGE_GAME_OVER);
        info!(
            ?reason,
            score = self.score,
            length = self.snake.len(),
            elapsed_secs = self.elapsed_secs,
            "game over"
        );
    }

    /// Puts a food on the grid at `position` right away, as if its spawn
    /// timer had just fired there.
    pub fn place_food(&mut self, id: FoodId, position: Position) {
        let Some(food) = self.foods.get_mut(id.0) else {
            return;
        };

        food.activate(position);
        self.renderer.draw_cell(position, CellKind::Food(food.color()));
        food.schedule_remove(&mut self.scheduler, &mut self.rng);
    }

    fn spawn_food(&mut self, id: FoodId) {
        let free = random_free_position(&mut self.rng, self.grid, &self.snake, &self.foods);
        let Some(position) = free else {
            warn!(food = id.0, "no free cell for food, skipping this cycle");
            if let Some(food) = self.foods.get_mut(id.0) {
                food.schedule_spawn(&mut self.scheduler, &mut self.rng);
            }
            return;
        };

        self.place_food(id, position);
        debug!(food = id.0, x = position.x, y = position.y, "food spawned");
    }

    fn remove_food(&mut self, id: FoodId) {
        let Some(food) = self.foods.get_mut(id.0) else {
            return;
        };

        if let Some(position) = food.position() {
            self.renderer.clear_cell(position);
            debug!(food = id.0, x = position.x, y = position.y, "food expired");
        }
        food.schedule_spawn(&mut self.scheduler, &mut self.rng);
    }

    fn update_elapsed(&mut self, secs: u64) {
        self.elapsed_secs += secs;
        self.display.show_elapsed(&self.elapsed_hms());
    }

    fn show_stats(&mut self) {
        let stats = self.stats();
        self.display.show_stats(stats);
    }

    /// Elapsed play time as `HH:MM:SS`.
    #[must_use]
    pub fn elapsed_hms(&self) -> String {
        format_hms(self.elapsed_secs)
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            length: self.snake.len(),
            speed: self.speed(),
            score: self.score,
        }
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn speed(&self) -> u32 {
        self.pacer.speed()
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    #[must_use]
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    #[must_use]
    pub fn food(&self, id: FoodId) -> Option<&Food> {
        self.foods.get(id.0)
    }

    /// Borrow of the clock, for inspecting armed timers.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler<TimerEvent> {
        &self.scheduler
    }

    /// True while the main loop timer is armed.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.pacer.is_running(&self.scheduler)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

/// Formats whole seconds as zero-padded `HH:MM:SS`.
#[must_use]
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = total_secs / 60 % 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
