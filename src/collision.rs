use rand::Rng;

use crate::config::MAX_FREE_POSITION_ATTEMPTS;
use crate::food::{Food, FoodId};
use crate::grid::{GridSize, Position};
use crate::snake::Snake;

/// Returns the on-grid food at `position`, if any.
#[must_use]
pub fn food_at(foods: &[Food], position: Position) -> Option<FoodId> {
    foods
        .iter()
        .find(|food| food.position() == Some(position))
        .map(Food::id)
}

#[must_use]
pub fn collides_with_food(foods: &[Food], position: Position) -> bool {
    food_at(foods, position).is_some()
}

/// Returns true when neither the snake nor an on-grid food covers `position`.
#[must_use]
pub fn is_free(snake: &Snake, foods: &[Food], position: Position) -> bool {
    !snake.collides_with_body(position, false) && !collides_with_food(foods, position)
}

/// Picks a uniformly random unoccupied cell.
///
/// Random probing is tried first; once it has missed
/// [`MAX_FREE_POSITION_ATTEMPTS`] times the grid is crowded, so the free
/// cells are enumerated and one is drawn from that list instead. Returns
/// `None` only when every cell is occupied.
#[must_use]
pub fn random_free_position<R: Rng + ?Sized>(
    rng: &mut R,
    grid: GridSize,
    snake: &Snake,
    foods: &[Food],
) -> Option<Position> {
    for _ in 0..MAX_FREE_POSITION_ATTEMPTS {
        let candidate = Position::new(
            rng.gen_range(0..i32::from(grid.width)),
            rng.gen_range(0..i32::from(grid.height)),
        );
        if is_free(snake, foods, candidate) {
            return Some(candidate);
        }
    }

    let mut candidates = Vec::new();
    for y in 0..i32::from(grid.height) {
        for x in 0..i32::from(grid.width) {
            let position = Position::new(x, y);
            if is_free(snake, foods, position) {
                candidates.push(position);
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{collides_with_food, food_at, random_free_position};
    use crate::food::{Food, FoodColor, FoodEffect, FoodId};
    use crate::grid::{GridSize, Position};
    use crate::input::Direction;
    use crate::snake::Snake;

    fn food(id: usize, position: Option<Position>) -> Food {
        let mut food = Food::new(
            FoodId(id),
            FoodColor::Black,
            Duration::from_secs(1),
            Duration::from_secs(1),
            FoodEffect::InstantGameOver,
        );
        if let Some(position) = position {
            food.activate(position);
        }
        food
    }

    #[test]
    fn food_lookup_ignores_inactive_food() {
        let foods = vec![food(0, None), food(1, Some(Position::new(2, 3)))];

        assert_eq!(food_at(&foods, Position::new(2, 3)), Some(FoodId(1)));
        assert!(!collides_with_food(&foods, Position::new(0, 0)));
    }

    #[test]
    fn free_position_never_overlaps_snake_or_food() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = GridSize::new(8, 6);
        let snake = Snake::from_segments(
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)],
            Direction::Right,
        );
        let foods = vec![food(0, Some(Position::new(4, 4)))];

        for _ in 0..100 {
            let position =
                random_free_position(&mut rng, grid, &snake, &foods).expect("grid has room");
            assert!(position.is_within_bounds(grid));
            assert!(!snake.collides_with_body(position, false));
            assert_ne!(position, Position::new(4, 4));
        }
    }

    #[test]
    fn crowded_grid_falls_back_to_the_last_free_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = GridSize::new(3, 3);
        let mut segments = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (2, 2) {
                    segments.push(Position::new(x, y));
                }
            }
        }
        let snake = Snake::from_segments(segments, Direction::Right);

        for _ in 0..10 {
            assert_eq!(
                random_free_position(&mut rng, grid, &snake, &[]),
                Some(Position::new(2, 2))
            );
        }
    }

    #[test]
    fn full_grid_yields_none() {
        let mut rng = StdRng::seed_from_u64(5);
        let grid = GridSize::new(2, 1);
        let snake = Snake::new(Position::new(0, 0), Direction::Right);
        let foods = vec![food(0, Some(Position::new(1, 0)))];

        assert_eq!(random_free_position(&mut rng, grid, &snake, &foods), None);
    }
}
