use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::sink::{DisplaySink, Stats};

/// Rows taken by the HUD below the play area.
pub const HUD_HEIGHT: u16 = 2;

const SEPARATOR: &str = " │ ";

/// Latest values pushed by the session, kept for the next frame.
#[derive(Debug, Clone)]
pub struct HudState {
    stats: Stats,
    elapsed: String,
    message: String,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            stats: Stats::default(),
            elapsed: crate::game::format_hms(0),
            message: String::new(),
        }
    }
}

impl HudState {
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    #[must_use]
    pub fn elapsed(&self) -> &str {
        &self.elapsed
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl DisplaySink for HudState {
    fn show_stats(&mut self, stats: Stats) {
        self.stats = stats;
    }

    fn show_elapsed(&mut self, elapsed: &str) {
        elapsed.clone_into(&mut self.elapsed);
    }

    fn show_message(&mut self, message: &str) {
        message.clone_into(&mut self.message);
    }
}

/// Renders the two-line HUD and returns the remaining play area above it.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, hud: &HudState) -> Rect {
    let [play_area, stats_area, message_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(stats_line(hud, usize::from(stats_area.width)))
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray)),
        stats_area,
    );

    frame.render_widget(
        Paragraph::new(Line::from(fit_width(hud.message(), usize::from(message_area.width))))
            .alignment(Alignment::Left)
            .style(Style::default().fg(Color::White)),
        message_area,
    );

    play_area
}

fn stats_line(hud: &HudState, available_width: usize) -> Line<'static> {
    let stats = hud.stats();
    let full = [("Length", "L"), ("Speed", "V"), ("Score", "S"), ("Time", "T")];
    let values = [
        stats.length.to_string(),
        stats.speed.to_string(),
        stats.score.to_string(),
        hud.elapsed().to_owned(),
    ];

    let compact = stats_width(&full.map(|(label, _)| label), &values) > available_width;
    let value_style = Style::default().fg(Color::White);

    let mut spans = Vec::new();
    for (index, ((label, short), value)) in full.iter().zip(values).enumerate() {
        if index > 0 {
            spans.push(Span::raw(SEPARATOR));
        }
        let label = if compact { short } else { label };
        spans.push(Span::raw(format!("{label}: ")));
        spans.push(Span::styled(value, value_style));
    }

    Line::from(spans)
}

fn stats_width(labels: &[&str], values: &[String]) -> usize {
    let fields: usize = labels
        .iter()
        .zip(values)
        .map(|(label, value)| label.width() + 2 + value.width())
        .sum();
    fields + SEPARATOR.width() * labels.len().saturating_sub(1)
}

/// Truncates `text` so it occupies at most `width` terminal columns.
fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_owned();
    }

    let mut fitted = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        used += ch_width;
        fitted.push(ch);
    }
    fitted
}
