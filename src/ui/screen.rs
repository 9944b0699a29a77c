use flashdrill::session::SessionPhase;
use ratatui::Frame;

use crate::{ui::summary_table::render_summary, App};

/// A UI Screen boundary: responsible for rendering one session phase
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// "Starting in" screen - renders through the App widget
pub struct CountdownScreen;

impl Screen for CountdownScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Drill screen - renders through the App widget
pub struct DrillScreen;

impl Screen for DrillScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Summary screen - uses dedicated renderer
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if let Some(summary) = app.session.summary() {
            let area = f.area();
            render_summary(summary, app.status.as_deref(), area, f.buffer_mut());
        }
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: SessionPhase) -> Box<dyn Screen> {
    match phase {
        SessionPhase::Countdown => Box::new(CountdownScreen),
        SessionPhase::Drill => Box::new(DrillScreen),
        SessionPhase::Summary => Box::new(SummaryScreen),
    }
}
