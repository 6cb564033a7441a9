use std::collections::VecDeque;

use crate::grid::{GridSize, Position};
use crate::input::Direction;

/// Snake body, heading, and pending turns.
///
/// The body is ordered head first and never empty. Growth is expressed by
/// duplicating the tail cell: while the last two segments share a position
/// the body is still filling out, and the tail cell must not be erased.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
    queue: VecDeque<Direction>,
}

impl Snake {
    /// Creates a one-cell snake at `start` with the provided direction.
    #[must_use]
    pub fn new(start: Position, direction: Direction) -> Self {
        Self::from_segments(vec![start], direction)
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// # Panics
    ///
    /// Panics when `segments` is empty.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>, direction: Direction) -> Self {
        assert!(
            !segments.is_empty(),
            "snake body must always contain at least one segment"
        );

        Self {
            body: VecDeque::from(segments),
            direction,
            queue: VecDeque::new(),
        }
    }

    /// Queues a turn unless it runs along the axis of the latest heading.
    ///
    /// The latest heading is the last queued turn, or the current direction
    /// when nothing is queued, so a reversal cannot sneak in a few inputs
    /// ahead either. Returns whether the turn was accepted.
    pub fn push_direction(&mut self, direction: Direction) -> bool {
        let last = self.queue.back().copied().unwrap_or(self.direction);
        if last.is_same_axis(direction) {
            return false;
        }

        self.queue.push_back(direction);
        true
    }

    /// Applies one movement step and returns the new head.
    ///
    /// The tail segment is recycled as the head, so duplicated tail cells
    /// left by [`Snake::resize`] are consumed one per step.
    pub fn advance(&mut self, grid: GridSize) -> Position {
        if let Some(next) = self.queue.pop_front() {
            self.direction = next;
        }

        let next_head = self.head().stepped(self.direction, grid);
        let _ = self.body.pop_back();
        self.body.push_front(next_head);
        next_head
    }

    /// Grows or shrinks the body to `new_len` segments (at least one).
    ///
    /// Growth appends copies of the tail cell. Shrinking removes tail
    /// segments and returns the cells whose visuals should be cleared; a
    /// removed duplicate is not reported since another segment still covers
    /// its cell.
    pub fn resize(&mut self, new_len: usize) -> Vec<Position> {
        let target = new_len.max(1);
        let mut vacated = Vec::new();

        if self.body.len() < target {
            let tail = self.tail();
            self.body.resize(target, tail);
            return vacated;
        }

        while self.body.len() > target {
            let growing = self.is_growing();
            if let Some(removed) = self.body.pop_back() {
                if !growing {
                    vacated.push(removed);
                }
            }
        }

        vacated
    }

    /// Returns true while the last two segments occupy the same cell.
    #[must_use]
    pub fn is_growing(&self) -> bool {
        let len = self.body.len();
        len > 1 && self.body[len - 1] == self.body[len - 2]
    }

    /// Returns true if a segment occupies `position`, optionally skipping the head.
    #[must_use]
    pub fn collides_with_body(&self, position: Position, ignore_head: bool) -> bool {
        let skip = usize::from(ignore_head);
        self.body.iter().skip(skip).any(|segment| *segment == position)
    }

    /// Returns true if the head overlaps any non-head segment.
    #[must_use]
    pub fn head_overlaps_body(&self) -> bool {
        self.collides_with_body(self.head(), true)
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns the current tail position.
    #[must_use]
    pub fn tail(&self) -> Position {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when the body has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the current movement direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Turns still waiting to be applied, oldest first.
    pub fn queued_directions(&self) -> impl Iterator<Item = &Direction> {
        self.queue.iter()
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
