use crate::countdown::IntroCountdown;
use crate::engine::{EngineEvent, StimulusEngine};
use crate::summary::RunSummary;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Countdown,
    Drill,
    Summary,
}

/// One drill as the user sees it: intro countdown, the drill, the summary
#[derive(Debug)]
pub struct DrillSession {
    countdown: IntroCountdown,
    engine: StimulusEngine,
    phase: SessionPhase,
    summary: Option<RunSummary>,
}

impl DrillSession {
    pub fn new(countdown_secs: u32, engine: StimulusEngine) -> Self {
        Self {
            countdown: IntroCountdown::new(countdown_secs),
            engine,
            phase: SessionPhase::Countdown,
            summary: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn engine(&self) -> &StimulusEngine {
        &self.engine
    }

    pub fn countdown(&self) -> &IntroCountdown {
        &self.countdown
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn advance(&mut self, dt: Duration) -> Vec<EngineEvent> {
        match self.phase {
            SessionPhase::Countdown => {
                if self.countdown.advance(dt) {
                    self.phase = SessionPhase::Drill;
                    self.engine.start();
                    self.engine.advance(Duration::ZERO)
                } else {
                    Vec::new()
                }
            }
            SessionPhase::Drill => {
                let events = self.engine.advance(dt);
                for event in &events {
                    if let EngineEvent::Completed(summary) = event {
                        self.summary = Some(summary.clone());
                        self.phase = SessionPhase::Summary;
                    }
                }
                events
            }
            SessionPhase::Summary => Vec::new(),
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.phase == SessionPhase::Drill && self.engine.toggle_pause()
    }

    /// Terminal focus went away; never unpauses
    pub fn pause_for_focus_loss(&mut self) -> bool {
        let paused = self.phase == SessionPhase::Drill && self.engine.pause();
        if paused {
            debug!("paused on focus loss");
        }
        paused
    }

    /// Cut the drill short and go straight to the summary
    pub fn stop(&mut self) -> bool {
        if self.phase == SessionPhase::Summary {
            return false;
        }
        self.engine.stop();
        self.summary = Some(self.engine.summary());
        self.phase = SessionPhase::Summary;
        true
    }

    /// Run the same drill again from the summary screen
    pub fn restart(&mut self) -> bool {
        if self.phase != SessionPhase::Summary || !self.engine.restart() {
            return false;
        }
        self.summary = None;
        self.phase = SessionPhase::Drill;
        true
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
    }
}

impl Drop for DrillSession {
    fn drop(&mut self) {
        self.engine.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestones::MemoryRecorder;
    use crate::program::{Letter, StimulusPool};
    use crate::strategy::SimpleStrategy;
    use crate::timing::ExerciseTimingConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(countdown: u32, total: f64, recorder: &MemoryRecorder) -> DrillSession {
        let engine = StimulusEngine::new(
            ExerciseTimingConfig::new(total, 1.0, 0.5),
            StimulusPool {
                letters: Letter::parse_list("AB"),
                ..Default::default()
            },
            Box::new(SimpleStrategy),
            Box::new(recorder.clone()),
        )
        .with_rng(StdRng::seed_from_u64(5));
        DrillSession::new(countdown, engine)
    }

    #[test]
    fn countdown_then_drill_then_summary() {
        let recorder = MemoryRecorder::new();
        let mut session = session(2, 3.0, &recorder);
        assert_eq!(session.phase(), SessionPhase::Countdown);
        assert!(!session.toggle_pause());

        assert!(session.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(session.countdown().remaining_secs(), 1);

        let events = session.advance(Duration::from_secs(1));
        assert_eq!(session.phase(), SessionPhase::Drill);
        assert!(matches!(events.as_slice(), [EngineEvent::StimulusShown(Some(_))]));

        for _ in 0..40 {
            session.advance(Duration::from_millis(100));
        }
        assert_eq!(session.phase(), SessionPhase::Summary);
        let summary = session.summary().unwrap();
        assert_eq!(summary.total_secs, 3);
        assert!(!summary.stopped_early);
        assert_eq!(recorder.calls().len(), 1);
    }

    #[test]
    fn zero_countdown_starts_on_first_advance() {
        let recorder = MemoryRecorder::new();
        let mut session = session(0, 3.0, &recorder);
        session.advance(Duration::ZERO);
        assert_eq!(session.phase(), SessionPhase::Drill);
        assert!(session.engine().is_running());
    }

    #[test]
    fn stop_goes_to_summary_without_milestone() {
        let recorder = MemoryRecorder::new();
        let mut session = session(0, 10.0, &recorder);
        session.advance(Duration::ZERO);
        session.advance(Duration::from_secs(2));

        assert!(session.stop());
        assert!(!session.stop());
        assert_eq!(session.phase(), SessionPhase::Summary);
        assert!(session.summary().unwrap().stopped_early);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn restart_only_from_summary() {
        let recorder = MemoryRecorder::new();
        let mut session = session(0, 10.0, &recorder);
        session.advance(Duration::ZERO);
        assert!(!session.restart());

        session.stop();
        assert!(session.restart());
        assert_eq!(session.phase(), SessionPhase::Drill);
        assert!(session.summary().is_none());
        assert_eq!(session.engine().state().time_left_secs, 10);
    }

    #[test]
    fn focus_loss_pauses_but_does_not_resume() {
        let recorder = MemoryRecorder::new();
        let mut session = session(0, 10.0, &recorder);
        session.advance(Duration::ZERO);
        assert!(session.pause_for_focus_loss());
        assert!(!session.pause_for_focus_loss());
        assert!(session.engine().state().is_paused);
    }
}
