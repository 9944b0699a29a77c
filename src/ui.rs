pub mod screen;
pub mod stimulus_view;
pub mod summary_table;

use flashdrill::session::SessionPhase;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.phase() {
            SessionPhase::Countdown => render_countdown(self, area, buf),
            SessionPhase::Drill => render_drill(self, area, buf),
            // the summary has its own screen
            SessionPhase::Summary => {}
        }
    }
}

fn render_countdown(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled("STARTING IN", dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    Paragraph::new(Span::styled(
        app.session.countdown().remaining_secs().to_string(),
        bold_style.fg(Color::Yellow),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

fn render_drill(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = app.session.engine();
    let state = engine.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    stimulus_view::render_frame(engine.frame(), chunks[0], buf);

    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let mut spans = vec![Span::styled(
        format!(
            "{:02}:{:02}",
            state.time_left_secs / 60,
            state.time_left_secs % 60
        ),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(beat) = app.beat_marker() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("♪ {beat}"),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if state.is_paused {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "PAUSED",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        "  (space) pause / (s)top / (q)uit",
        dim_style,
    ));

    let status_area = Rect {
        x: chunks[1].x + HORIZONTAL_MARGIN.min(chunks[1].width),
        width: chunks[1].width.saturating_sub(HORIZONTAL_MARGIN * 2),
        ..chunks[1]
    };
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Left)
        .render(status_area, buf);
}
