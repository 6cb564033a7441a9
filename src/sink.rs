//! Write-only collaborators driven by the session.

use crate::food::FoodColor;
use crate::grid::Position;

/// What occupies a drawn cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CellKind {
    SnakeHead,
    Food(FoodColor),
}

/// Receives cell updates as the body and foods change. Cell size and
/// styling belong to the implementation.
pub trait Renderer {
    fn draw_cell(&mut self, position: Position, kind: CellKind);
    fn clear_cell(&mut self, position: Position);
    fn clear_all(&mut self);
}

/// Snapshot of the numeric infos shown next to the board.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Stats {
    pub length: usize,
    pub speed: u32,
    pub score: u64,
}

/// Receives textual game infos.
pub trait DisplaySink {
    fn show_stats(&mut self, stats: Stats);
    /// `elapsed` is formatted as `HH:MM:SS`.
    fn show_elapsed(&mut self, elapsed: &str);
    fn show_message(&mut self, message: &str);
}

/// Renderer that discards everything, for headless sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_cell(&mut self, _position: Position, _kind: CellKind) {}
    fn clear_cell(&mut self, _position: Position) {}
    fn clear_all(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn show_stats(&mut self, _stats: Stats) {}
    fn show_elapsed(&mut self, _elapsed: &str) {}
    fn show_message(&mut self, _message: &str) {}
}
