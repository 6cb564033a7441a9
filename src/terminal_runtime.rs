use std::io;
use std::panic;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::grid::GridSize;
use crate::ui::hud::HUD_HEIGHT;

/// Concrete terminal type used by the runtime.
pub type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Columns and rows taken by the play-area border.
const BORDER_SIZE: u16 = 2;

/// Owns terminal lifecycle (raw mode + alternate screen) for one run.
///
/// On drop, this type restores terminal state best-effort.
pub struct TerminalSession {
    terminal: AppTerminal,
}

impl TerminalSession {
    /// Enters raw mode, switches to alternate screen, and creates a ratatui terminal.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error);
        }

        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                let _ = cleanup_terminal_best_effort();
                Err(error)
            }
        }
    }

    /// Returns mutable access to the inner ratatui terminal.
    pub fn terminal_mut(&mut self) -> &mut AppTerminal {
        &mut self.terminal
    }

    /// Derives the game grid from the space left after the border and HUD.
    pub fn grid_for_block(&self, block: (u16, u16)) -> io::Result<GridSize> {
        let size = self.terminal.size()?;
        Ok(grid_for_viewport(size.width, size.height, block))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = cleanup_terminal_best_effort();
    }
}

/// Restores the terminal before the default panic report is printed.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = cleanup_terminal_best_effort();
        default_hook(panic_info);
    }));
}

fn grid_for_viewport(columns: u16, rows: u16, block: (u16, u16)) -> GridSize {
    let play_columns = columns.saturating_sub(BORDER_SIZE);
    let play_rows = rows.saturating_sub(BORDER_SIZE + HUD_HEIGHT);
    GridSize::from_viewport((play_columns, play_rows), block)
}

fn cleanup_terminal_best_effort() -> io::Result<()> {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    execute!(stdout, Show, LeaveAlternateScreen)
}

#[cfg(test)]
mod tests {
    use super::grid_for_viewport;
    use crate::grid::GridSize;

    #[test]
    fn grid_excludes_border_and_hud() {
        assert_eq!(grid_for_viewport(82, 28, (2, 1)), GridSize::new(40, 24));
    }

    #[test]
    fn tiny_terminal_still_has_one_cell() {
        assert_eq!(grid_for_viewport(1, 1, (2, 1)), GridSize::new(1, 1));
    }
}
