use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::food::FoodColor;
use crate::game::{GameStatus, Session};
use crate::grid::{GridSize, Position};
use crate::sink::{CellKind, Renderer};
use crate::ui::hud::{render_hud, HudState};
use crate::ui::menu::{render_game_over_menu, render_start_menu};

/// Glyph repeated over every terminal cell a grid block covers.
const GLYPH_BLOCK: &str = "█";

const PLAY_BG: Color = Color::DarkGray;
const SNAKE_COLOR: Color = Color::Green;

/// Retained cell buffer fed by the session and painted every frame.
#[derive(Debug, Clone)]
pub struct CellCanvas {
    grid: GridSize,
    cells: Vec<Option<CellKind>>,
}

impl CellCanvas {
    #[must_use]
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            cells: vec![None; grid.total_cells()],
        }
    }

    #[must_use]
    pub fn get(&self, position: Position) -> Option<CellKind> {
        self.index(position).and_then(|index| self.cells[index])
    }

    /// Iterates over painted cells in row-major order.
    pub fn painted(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        let width = usize::from(self.grid.width);
        self.cells.iter().enumerate().filter_map(move |(index, cell)| {
            let kind = (*cell)?;
            let x = i32::try_from(index % width).ok()?;
            let y = i32::try_from(index / width).ok()?;
            Some((Position::new(x, y), kind))
        })
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !position.is_within_bounds(self.grid) {
            return None;
        }

        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        Some(y * usize::from(self.grid.width) + x)
    }
}

impl Renderer for CellCanvas {
    fn draw_cell(&mut self, position: Position, kind: CellKind) {
        if let Some(index) = self.index(position) {
            self.cells[index] = Some(kind);
        }
    }

    fn clear_cell(&mut self, position: Position) {
        if let Some(index) = self.index(position) {
            self.cells[index] = None;
        }
    }

    fn clear_all(&mut self) {
        self.cells.fill(None);
    }
}

/// Renders the full game frame from immutable state.
pub fn render(frame: &mut Frame<'_>, session: &Session<CellCanvas, HudState>, block: (u16, u16)) {
    let area = frame.area();
    let play_area = render_hud(frame, area, session.display());

    let border = Block::bordered().style(Style::new().bg(PLAY_BG));
    let inner = border.inner(play_area);
    frame.render_widget(border, play_area);

    render_cells(frame, inner, session.renderer(), block);

    match session.status() {
        GameStatus::Idle => render_start_menu(frame, play_area, session.display().message()),
        GameStatus::GameOver => render_game_over_menu(
            frame,
            play_area,
            session.score(),
            session.game_over_reason(),
            session.display().message(),
        ),
        GameStatus::Playing => {}
    }
}

fn render_cells(frame: &mut Frame<'_>, inner: Rect, canvas: &CellCanvas, block: (u16, u16)) {
    let buffer = frame.buffer_mut();
    for (position, kind) in canvas.painted() {
        let Some(cell_area) = block_area(inner, block, position) else {
            continue;
        };

        let style = Style::new().fg(cell_color(kind)).bg(PLAY_BG);
        for y in cell_area.y..cell_area.bottom() {
            for x in cell_area.x..cell_area.right() {
                buffer.set_string(x, y, GLYPH_BLOCK, style);
            }
        }
    }
}

fn cell_color(kind: CellKind) -> Color {
    match kind {
        CellKind::SnakeHead => SNAKE_COLOR,
        CellKind::Food(FoodColor::Yellow) => Color::Yellow,
        CellKind::Food(FoodColor::Red) => Color::Red,
        CellKind::Food(FoodColor::Blue) => Color::Blue,
        CellKind::Food(FoodColor::Purple) => Color::Magenta,
        CellKind::Food(FoodColor::Black) => Color::Black,
    }
}

/// Terminal rectangle covered by a grid cell, clipped to `inner`.
fn block_area(inner: Rect, block: (u16, u16), position: Position) -> Option<Rect> {
    let x_offset = u16::try_from(position.x).ok()?.checked_mul(block.0)?;
    let y_offset = u16::try_from(position.y).ok()?.checked_mul(block.1)?;

    let x = inner.x.checked_add(x_offset)?;
    let y = inner.y.checked_add(y_offset)?;
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some(Rect {
        x,
        y,
        width: block.0.min(inner.right() - x),
        height: block.1.min(inner.bottom() - y),
    })
}
