//! The stimulus cycle engine.
//!
//! A drill runs two clocks side by side: a whole-second countdown that owns
//! completion, and a presentation loop that alternates on-screen and blank
//! phases. The clocks share nothing but the pause and completion flags, so
//! they drift apart when `on + off` does not divide the total duration.
//!
//! The engine is passive. The host feeds wall time in through
//! [`StimulusEngine::advance`] and gets back the events that fired.

use crate::milestones::{MilestoneRecorder, MilestoneType};
use crate::occurrences::OccurrenceTable;
use crate::program::{Difficulty, StimulusPool};
use crate::stimulus::Stimulus;
use crate::strategy::StimulusStrategy;
use crate::summary::RunSummary;
use crate::timing::ExerciseTimingConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

const SECOND: Duration = Duration::from_secs(1);

/// Everything observable about a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub elapsed_secs: u32,
    pub time_left_secs: u32,
    pub is_paused: bool,
    /// Blank phase between two stimuli
    pub is_white_screen: bool,
    pub current_stimulus: Option<Stimulus>,
    pub occurrences: OccurrenceTable,
    /// Cycles that produced a stimulus
    pub emitted: u32,
    pub completed: bool,
}

impl RunState {
    pub fn initial(total_secs: u32) -> Self {
        Self {
            elapsed_secs: 0,
            time_left_secs: total_secs,
            is_paused: false,
            is_white_screen: false,
            current_stimulus: None,
            occurrences: OccurrenceTable::new(),
            emitted: 0,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A new cycle began; `None` when the pool had nothing to offer
    StimulusShown(Option<Stimulus>),
    Blank,
    /// Metronome beat number, starting at 1
    Beat(u32),
    Tick { time_left_secs: u32 },
    Completed(RunSummary),
}

/// What the surface should paint right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    Blank,
    Empty,
    Showing(&'a Stimulus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Running,
    Completed,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    OnScreen(Duration),
    OffScreen(Duration),
    Exhausted,
}

#[derive(Debug)]
struct PresentationClock {
    phase: Phase,
    local_elapsed: Duration,
    beats: u32,
}

impl PresentationClock {
    fn new() -> Self {
        Self {
            phase: Phase::Exhausted,
            local_elapsed: Duration::ZERO,
            beats: 0,
        }
    }

    fn until_phase_end(&self) -> Option<Duration> {
        match self.phase {
            Phase::OnScreen(left) | Phase::OffScreen(left) => Some(left),
            Phase::Exhausted => None,
        }
    }

    fn elapse(&mut self, step: Duration) {
        match &mut self.phase {
            Phase::OnScreen(left) | Phase::OffScreen(left) => *left = left.saturating_sub(step),
            Phase::Exhausted => {}
        }
    }

    fn phase_ended(&self) -> bool {
        self.until_phase_end().is_some_and(|left| left.is_zero())
    }
}

pub type StopCallback = Box<dyn FnMut() + Send>;

pub struct StimulusEngine {
    timing: ExerciseTimingConfig,
    pool: StimulusPool,
    difficulty: Difficulty,
    strategy: Box<dyn StimulusStrategy>,
    recorder: Box<dyn MilestoneRecorder>,
    rng: StdRng,
    on_stop: Option<StopCallback>,
    state: RunState,
    lifecycle: Lifecycle,
    since_tick: Duration,
    presentation: PresentationClock,
    stopped: bool,
    outbox: Vec<EngineEvent>,
}

impl std::fmt::Debug for StimulusEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StimulusEngine")
            .field("strategy", &self.strategy.name())
            .field("lifecycle", &self.lifecycle)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl StimulusEngine {
    pub fn new(
        timing: ExerciseTimingConfig,
        pool: StimulusPool,
        strategy: Box<dyn StimulusStrategy>,
        recorder: Box<dyn MilestoneRecorder>,
    ) -> Self {
        Self {
            state: RunState::initial(timing.total_secs()),
            timing,
            pool,
            difficulty: Difficulty::default(),
            strategy,
            recorder,
            rng: StdRng::from_entropy(),
            on_stop: None,
            lifecycle: Lifecycle::Idle,
            since_tick: Duration::ZERO,
            presentation: PresentationClock::new(),
            stopped: false,
            outbox: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Called on every `stop()`
    pub fn on_stop(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_stop = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn timing(&self) -> &ExerciseTimingConfig {
        &self.timing
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn frame(&self) -> Frame<'_> {
        if self.state.is_white_screen {
            return Frame::Blank;
        }
        match &self.state.current_stimulus {
            Some(stimulus) => Frame::Showing(stimulus),
            None => Frame::Empty,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_reps: self.state.occurrences.total(),
            total_secs: self.state.elapsed_secs,
            emitted: self.state.emitted,
            headers: self.strategy.table_headers(),
            rows: self.strategy.progress_rows(&self.state.occurrences),
            difficulty: self.difficulty,
            stopped_early: self.stopped,
        }
    }

    /// Begin both clocks. Only valid once, from a fresh engine.
    pub fn start(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Idle {
            return false;
        }
        self.lifecycle = Lifecycle::Running;
        debug!(
            strategy = self.strategy.name(),
            total_secs = self.timing.total_secs(),
            metronome = self.timing.is_metronome(),
            "drill started"
        );
        if self.presentation.local_elapsed < self.timing.total() {
            self.begin_cycle();
        }
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.is_running() || self.state.is_paused || self.state.completed {
            return false;
        }
        self.state.is_paused = true;
        debug!(elapsed = self.state.elapsed_secs, "drill paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.is_running() || !self.state.is_paused || self.state.completed {
            return false;
        }
        self.state.is_paused = false;
        debug!(elapsed = self.state.elapsed_secs, "drill resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.state.is_paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// End the run early. Never records a milestone.
    pub fn stop(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        // a run that already finished on its own keeps its natural ending
        if !self.state.completed {
            self.stopped = true;
        }
        self.state.completed = true;
        self.state.is_paused = true;
        self.state.current_stimulus = None;
        self.state.is_white_screen = false;
        self.presentation.phase = Phase::Exhausted;
        self.lifecycle = Lifecycle::Completed;
        debug!(elapsed = self.state.elapsed_secs, "drill stopped");
        if let Some(callback) = self.on_stop.as_mut() {
            callback();
        }
    }

    /// Reset a completed run and start it again
    pub fn restart(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Disposed || !self.state.completed {
            return false;
        }
        self.state = RunState::initial(self.timing.total_secs());
        self.since_tick = Duration::ZERO;
        self.presentation = PresentationClock::new();
        self.stopped = false;
        self.outbox.clear();
        self.lifecycle = Lifecycle::Idle;
        debug!("drill restarted");
        self.start()
    }

    /// Cancel every pending deadline. Idempotent.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        self.lifecycle = Lifecycle::Disposed;
        self.presentation.phase = Phase::Exhausted;
        self.outbox.clear();
        self.on_stop = None;
        debug!("drill disposed");
    }

    /// Move both clocks forward by `dt` and return every event that fired,
    /// including any queued by `start()`.
    pub fn advance(&mut self, dt: Duration) -> Vec<EngineEvent> {
        if self.is_running() && !self.state.is_paused {
            self.run_clocks(dt);
        }
        std::mem::take(&mut self.outbox)
    }

    fn run_clocks(&mut self, dt: Duration) {
        let mut remaining = dt;
        while !remaining.is_zero() && !self.state.completed {
            let until_tick = SECOND - self.since_tick;
            let step = self
                .presentation
                .until_phase_end()
                .map_or(until_tick, |left| left.min(until_tick))
                .min(remaining);

            remaining -= step;
            self.since_tick += step;
            self.presentation.elapse(step);

            if self.since_tick >= SECOND {
                self.since_tick = Duration::ZERO;
                self.on_tick();
                if self.state.completed {
                    break;
                }
            }
            if self.presentation.phase_ended() {
                self.on_phase_end();
            }
        }
    }

    fn on_tick(&mut self) {
        if self.state.time_left_secs > 0 {
            self.state.time_left_secs -= 1;
            self.state.elapsed_secs = (self.state.elapsed_secs + 1).min(self.timing.total_secs());
        }
        self.outbox.push(EngineEvent::Tick {
            time_left_secs: self.state.time_left_secs,
        });
        if self.state.time_left_secs == 0 {
            self.complete();
        }
    }

    fn on_phase_end(&mut self) {
        match self.presentation.phase {
            Phase::OnScreen(_) if !self.timing.off_screen().is_zero() => {
                self.state.is_white_screen = true;
                self.presentation.phase = Phase::OffScreen(self.timing.off_screen());
                self.outbox.push(EngineEvent::Blank);
            }
            Phase::OnScreen(_) | Phase::OffScreen(_) => self.finish_cycle(),
            Phase::Exhausted => {}
        }
    }

    fn finish_cycle(&mut self) {
        self.presentation.local_elapsed += self.timing.on_screen() + self.timing.off_screen();
        if self.presentation.local_elapsed < self.timing.total() {
            self.begin_cycle();
        } else {
            self.presentation.phase = Phase::Exhausted;
        }
    }

    fn begin_cycle(&mut self) {
        self.state.is_white_screen = false;
        let stimulus = self.strategy.generate(&self.pool, &mut self.rng);
        if let Some(stimulus) = &stimulus {
            self.strategy.record(stimulus, &mut self.state.occurrences);
            self.state.emitted += 1;
        }
        self.state.current_stimulus = stimulus.clone();
        self.presentation.phase = Phase::OnScreen(self.timing.on_screen());

        if self.timing.is_metronome() {
            self.presentation.beats += 1;
            self.outbox.push(EngineEvent::Beat(self.presentation.beats));
        }
        self.outbox.push(EngineEvent::StimulusShown(stimulus));
    }

    fn complete(&mut self) {
        if self.state.completed {
            return;
        }
        self.state.completed = true;
        self.lifecycle = Lifecycle::Completed;
        self.presentation.phase = Phase::Exhausted;

        let summary = self.summary();
        info!(
            reps = summary.total_reps,
            secs = summary.total_secs,
            difficulty = %self.difficulty,
            "drill completed"
        );
        if let Err(e) = self
            .recorder
            .record(MilestoneType::ExercisesCompleted, self.difficulty)
        {
            warn!("failed to record milestone: {e}");
        }
        self.outbox.push(EngineEvent::Completed(summary));
    }
}
