use std::time::Duration;

use wrapsnake::config::{FoodSpec, GameConfig, MESSAGE_GAME_OVER, MESSAGE_PRESS_START};
use wrapsnake::food::{FoodColor, FoodEffect, FoodId, Growth, ScoreIncrement, TimerKind};
use wrapsnake::game::{GameOverReason, GameStatus, Session};
use wrapsnake::grid::{GridSize, Position};
use wrapsnake::input::{Direction, GameInput};
use wrapsnake::sink::{CellKind, DisplaySink, Renderer, Stats};
use wrapsnake::snake::Snake;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Draw(Position, CellKind),
    Clear(Position),
    ClearAll,
}

#[derive(Debug, Default)]
struct RecordingRenderer {
    calls: Vec<Call>,
}

impl Renderer for RecordingRenderer {
    fn draw_cell(&mut self, position: Position, kind: CellKind) {
        self.calls.push(Call::Draw(position, kind));
    }

    fn clear_cell(&mut self, position: Position) {
        self.calls.push(Call::Clear(position));
    }

    fn clear_all(&mut self) {
        self.calls.push(Call::ClearAll);
    }
}

#[derive(Debug, Default)]
struct RecordingDisplay {
    stats: Option<Stats>,
    elapsed: Vec<String>,
    messages: Vec<String>,
}

impl DisplaySink for RecordingDisplay {
    fn show_stats(&mut self, stats: Stats) {
        self.stats = Some(stats);
    }

    fn show_elapsed(&mut self, elapsed: &str) {
        self.elapsed.push(elapsed.to_owned());
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}

fn food(color: FoodColor, spawn_in_secs: f64, remove_in_secs: f64, effect: FoodEffect) -> FoodSpec {
    FoodSpec {
        color,
        spawn_in_secs,
        remove_in_secs,
        effect,
    }
}

fn score_only(points: u64) -> FoodEffect {
    FoodEffect::ScoreAndGrow {
        score: ScoreIncrement::Fixed(points),
        growth: Growth::Add(0),
        speed_step: 0,
    }
}

fn recording_session(config: &GameConfig, seed: u64) -> Session<RecordingRenderer, RecordingDisplay> {
    Session::new_with_seed(
        GridSize::new(10, 10),
        config,
        seed,
        RecordingRenderer::default(),
        RecordingDisplay::default(),
    )
}

#[test]
fn eating_food_on_the_next_cell_scores_and_reschedules_it() {
    let config = GameConfig {
        foods: vec![food(FoodColor::Yellow, 86_400.0, 86_400.0, score_only(1))],
        ..GameConfig::default()
    };
    let mut session = recording_session(&config, 42);
    assert_eq!(session.display().messages, vec![MESSAGE_PRESS_START]);

    session.apply_input(GameInput::Start);
    session.snake = Snake::new(Position::new(5, 5), Direction::Down);
    session.place_food(FoodId(0), Position::new(5, 6));
    session.renderer_mut().calls.clear();

    session.tick();

    assert_eq!(session.snake.head(), Position::new(5, 6));
    assert_eq!(session.score(), 2);
    assert_eq!(
        session.display().stats,
        Some(Stats {
            length: 1,
            speed: 1,
            score: 2,
        })
    );
    assert_eq!(
        session.renderer().calls,
        vec![
            Call::Clear(Position::new(5, 5)),
            Call::Draw(Position::new(5, 6), CellKind::SnakeHead),
        ]
    );

    let food = session.food(FoodId(0)).expect("food exists");
    assert!(!food.is_active());
    assert_eq!(food.pending(session.scheduler()), Some(TimerKind::Spawn));
}

#[test]
fn food_cycles_between_spawn_and_removal_on_its_own_timers() {
    // Both bounds round up to the 1 ms floor: spawn at 1, remove at 2, ...
    let config = GameConfig {
        foods: vec![food(FoodColor::Blue, 0.0, 0.0, score_only(1))],
        ..GameConfig::default()
    };
    let mut session = recording_session(&config, 7);
    session.start();
    session.renderer_mut().calls.clear();

    session.advance(Duration::from_millis(1));
    let spawned_at = session
        .food(FoodId(0))
        .and_then(|food| food.position())
        .expect("food should be on the grid after its spawn delay");
    assert!(spawned_at.is_within_bounds(session.grid()));
    assert!(!session.snake.collides_with_body(spawned_at, false));
    assert_eq!(
        session.renderer().calls,
        vec![Call::Draw(spawned_at, CellKind::Food(FoodColor::Blue))]
    );
    assert_eq!(
        session
            .food(FoodId(0))
            .and_then(|food| food.pending(session.scheduler())),
        Some(TimerKind::Remove)
    );

    session.advance(Duration::from_millis(1));
    let food = session.food(FoodId(0)).expect("food exists");
    assert!(!food.is_active());
    assert_eq!(food.pending(session.scheduler()), Some(TimerKind::Spawn));
    assert_eq!(session.renderer().calls.last(), Some(&Call::Clear(spawned_at)));
}

#[test]
fn every_food_keeps_exactly_one_timer_while_playing() {
    let mut session = recording_session(&GameConfig::default(), 11);
    session.start();

    for _ in 0..200 {
        session.advance(Duration::from_millis(97));
        if session.status() != GameStatus::Playing {
            break;
        }
        for food in session.foods() {
            assert!(food.pending(session.scheduler()).is_some());
        }
        // One slot per food plus the main loop and the elapsed ticker.
        assert_eq!(session.scheduler().pending_count(), session.foods().len() + 2);
    }
}

#[test]
fn poison_food_ends_the_game_and_silences_all_timers() {
    let config = GameConfig {
        foods: vec![
            food(FoodColor::Black, 86_400.0, 86_400.0, FoodEffect::InstantGameOver),
            food(FoodColor::Yellow, 86_400.0, 86_400.0, score_only(1)),
        ],
        ..GameConfig::default()
    };
    let mut session = recording_session(&config, 3);
    session.start();
    session.snake = Snake::new(Position::new(0, 0), Direction::Right);
    session.place_food(FoodId(0), Position::new(1, 0));
    session.place_food(FoodId(1), Position::new(7, 7));

    session.advance(Duration::from_millis(115));

    assert_eq!(session.status(), GameStatus::GameOver);
    assert_eq!(session.game_over_reason(), Some(GameOverReason::Eaten(FoodId(0))));
    assert_eq!(session.scheduler().pending_count(), 0);
    assert!(session.foods().iter().all(|food| !food.is_active()));
    assert_eq!(session.renderer().calls.last(), Some(&Call::Clear(Position::new(7, 7))));
    assert_eq!(session.display().messages.last().map(String::as_str), Some(MESSAGE_GAME_OVER));

    // Nothing moves after the game is over.
    session.advance(Duration::from_secs(10));
    assert_eq!(session.snake.head(), Position::new(1, 0));
}

#[test]
fn stepwise_turns_growth_and_self_collision() {
    let config = GameConfig {
        foods: vec![food(
            FoodColor::Red,
            86_400.0,
            86_400.0,
            FoodEffect::ScoreAndGrow {
                score: ScoreIncrement::Fixed(1),
                growth: Growth::Add(4),
                speed_step: 0,
            },
        )],
        ..GameConfig::default()
    };
    let mut session = recording_session(&config, 5);
    session.start();
    session.snake = Snake::new(Position::new(2, 2), Direction::Right);
    session.place_food(FoodId(0), Position::new(3, 2));

    session.tick();
    assert_eq!(session.snake.len(), 5);
    assert!(session.snake.is_growing());

    // Loop back into the cell the growth is still filling.
    session.apply_input(GameInput::Direction(Direction::Down));
    session.apply_input(GameInput::Direction(Direction::Left));
    session.apply_input(GameInput::Direction(Direction::Up));
    session.apply_input(GameInput::Direction(Direction::Right));
    // Reversal of the queued Right is rejected.
    session.apply_input(GameInput::Direction(Direction::Left));

    session.tick();
    assert_eq!(session.snake.head(), Position::new(3, 3));
    session.tick();
    assert_eq!(session.snake.head(), Position::new(2, 3));
    session.tick();
    assert_eq!(session.snake.head(), Position::new(2, 2));
    assert_eq!(session.status(), GameStatus::Playing);

    session.tick();

    assert_eq!(session.snake.head(), Position::new(3, 2));
    assert_eq!(session.status(), GameStatus::GameOver);
    assert_eq!(session.game_over_reason(), Some(GameOverReason::SelfCollision));
}

#[test]
fn elapsed_time_is_reported_each_second() {
    let config = GameConfig {
        foods: vec![food(FoodColor::Yellow, 86_400.0, 86_400.0, score_only(1))],
        ..GameConfig::default()
    };
    let mut session = recording_session(&config, 8);
    session.start();
    session.snake = Snake::new(Position::new(0, 0), Direction::Down);

    session.advance(Duration::from_millis(3_000));

    assert_eq!(session.status(), GameStatus::Playing);
    assert_eq!(
        session.display().elapsed,
        vec!["00:00:00", "00:00:01", "00:00:02", "00:00:03"]
    );
}
