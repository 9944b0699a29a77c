pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use flashdrill::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    engine::{EngineEvent, StimulusEngine},
    logging,
    milestones::{MilestoneDb, MilestoneRecorder, NoopRecorder, SharedMilestoneDb},
    program::{ColorName, Difficulty, Letter, Shape},
    runtime::{CrosstermEventSource, DrillEvent, DrillEventSource, FixedTicker, Runner, Ticker},
    session::{DrillSession, SessionPhase},
    strategy::ExerciseType,
    timing::MetronomeSettings,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 50;
/// How long the metronome marker stays lit after a beat
const BEAT_PULSE: Duration = Duration::from_millis(150);

/// timed visual stimulus drills in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Flashes shapes, colors, letters, numbers and tiny arithmetic problems at a fixed rhythm for a set time, then shows how often each one came up."
)]
pub struct Cli {
    /// kind of drill to run
    #[clap(long = "type", value_enum)]
    exercise_type: Option<ExerciseType>,

    /// total drill length in seconds
    #[clap(short = 't', long)]
    secs: Option<u32>,

    /// seconds each stimulus stays on screen
    #[clap(long)]
    on: Option<f64>,

    /// seconds of blank screen between stimuli
    #[clap(long)]
    off: Option<f64>,

    /// metronome mode: one stimulus per beat at this tempo, no blank screen
    #[clap(long)]
    bpm: Option<u32>,

    /// difficulty credited when the drill completes
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// shapes to flash, comma separated; pass the flag alone for none
    #[clap(long, value_enum, value_delimiter = ',', num_args = 0..)]
    shapes: Option<Vec<Shape>>,

    /// colors to flash, comma separated; pass the flag alone for none
    #[clap(long, value_enum, value_delimiter = ',', num_args = 0..)]
    colors: Option<Vec<ColorName>>,

    /// letters to flash, e.g. "AEIOU", or "all"
    #[clap(long)]
    letters: Option<String>,

    /// numbers from 1 to 10 to flash, comma separated
    #[clap(
        long,
        value_delimiter = ',',
        num_args = 0..,
        value_parser = clap::value_parser!(u8).range(1..=10)
    )]
    numbers: Option<Vec<u8>>,

    /// seconds of "starting in" countdown before the drill
    #[clap(long)]
    countdown: Option<u32>,

    /// remember these settings for next time
    #[clap(long)]
    save: bool,

    /// print milestone counters and recent drills, then exit
    #[clap(long)]
    progress: bool,

    /// write logs at this level (e.g. "debug"); also read from FLASHDRILL_LOG
    #[clap(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Layer the command line over the saved settings
    fn apply(&self, config: &mut Config) {
        if let Some(exercise_type) = self.exercise_type {
            config.exercise_type = exercise_type;
        }
        if let Some(secs) = self.secs {
            config.exercise_secs = secs;
        }
        if let Some(on) = self.on {
            config.on_screen_secs = on;
        }
        if let Some(off) = self.off {
            config.off_screen_secs = off;
        }
        if let Some(bpm) = self.bpm {
            config.metronome = MetronomeSettings::enabled(bpm);
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(shapes) = &self.shapes {
            config.shapes = shapes.clone();
        }
        if let Some(colors) = &self.colors {
            config.colors = colors.clone();
        }
        if let Some(letters) = &self.letters {
            config.letters = if letters.eq_ignore_ascii_case("all") {
                Letter::all()
            } else {
                Letter::parse_list(letters)
            };
        }
        if let Some(numbers) = &self.numbers {
            config.numbers = numbers.clone();
        }
        if let Some(countdown) = self.countdown {
            config.countdown_secs = countdown;
        }
    }
}

pub struct App {
    pub config: Config,
    pub session: DrillSession,
    pub db: Option<SharedMilestoneDb>,
    /// One-line message for the summary screen
    pub status: Option<String>,
    pub beat: Option<BeatPulse>,
}

/// Latest metronome beat and how long ago it landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatPulse {
    pub number: u32,
    pub age: Duration,
}

#[derive(Debug, PartialEq)]
enum ExitType {
    Continue,
    Quit,
}

impl App {
    pub fn new(config: Config, db: Option<SharedMilestoneDb>) -> Self {
        let session = DrillSession::new(config.countdown_secs, build_engine(&config, db.clone()));
        Self {
            config,
            session,
            db,
            status: None,
            beat: None,
        }
    }

    /// Beat number to flash in the status bar, while the pulse is still lit
    pub fn beat_marker(&self) -> Option<u32> {
        self.beat
            .filter(|pulse| pulse.age < BEAT_PULSE)
            .map(|pulse| pulse.number)
    }

    /// Feed elapsed wall time to the session. Returns true when a redraw is due.
    pub fn on_tick(&mut self, dt: Duration) -> bool {
        let phase = self.session.phase();
        let lit = self.beat_marker().is_some();
        if let Some(pulse) = self.beat.as_mut() {
            pulse.age += dt;
        }
        let events = self.session.advance(dt);

        for event in &events {
            match event {
                EngineEvent::Beat(number) => {
                    self.beat = Some(BeatPulse {
                        number: *number,
                        age: Duration::ZERO,
                    });
                }
                EngineEvent::Completed(summary) => {
                    if let Some(db) = &self.db {
                        let logged = db
                            .lock()
                            .map_err(|_| flashdrill::Error::StorePoisoned)
                            .and_then(|db| db.log_completion(self.config.exercise_type, summary));
                        if let Err(e) = logged {
                            warn!("failed to log completion: {e}");
                        }
                    }
                }
                _ => {}
            }
        }

        !events.is_empty()
            || phase == SessionPhase::Countdown
            || phase != self.session.phase()
            || lit != self.beat_marker().is_some()
    }

    fn on_key(&mut self, key: KeyEvent) -> ExitType {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ExitType::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ExitType::Quit,
            KeyCode::Char(' ') => {
                self.session.toggle_pause();
            }
            KeyCode::Char('s') => {
                if self.session.stop() {
                    self.status = None;
                }
            }
            KeyCode::Char('r') => {
                if self.session.restart() {
                    self.status = None;
                }
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        ExitType::Continue
    }

    fn export(&mut self) {
        let Some(summary) = self.session.summary() else {
            return;
        };
        let Some(dir) = AppDirs::export_dir() else {
            self.status = Some("no export directory available".to_string());
            return;
        };
        self.status = Some(match summary.export_csv(&dir) {
            Ok(path) => {
                info!(path = %path.display(), "summary exported");
                format!("saved {}", path.display())
            }
            Err(e) => {
                warn!("export failed: {e}");
                format!("export failed: {e}")
            }
        });
    }
}

fn build_engine(config: &Config, db: Option<SharedMilestoneDb>) -> StimulusEngine {
    let recorder: Box<dyn MilestoneRecorder> = match db {
        Some(db) => Box::new(db),
        None => Box::new(NoopRecorder),
    };
    StimulusEngine::new(
        config.timing(),
        config.pool(),
        config.exercise_type.strategy(),
        recorder,
    )
    .with_difficulty(config.difficulty)
    .on_stop(|| info!("drill stopped early"))
}

fn open_db() -> Option<SharedMilestoneDb> {
    match MilestoneDb::open_default() {
        Ok(db) => Some(Arc::new(Mutex::new(db))),
        Err(e) => {
            warn!("milestones disabled: {e}");
            None
        }
    }
}

fn print_progress() -> Result<(), Box<dyn Error>> {
    let db = MilestoneDb::open_default()?;
    let progress = db.progress()?;

    println!("exercises completed:   {}", progress.exercises_completed);
    println!("  beginner:            {}", progress.beginner_exercises_completed);
    println!("  intermediate:        {}", progress.intermediate_exercises_completed);
    println!("  advanced:            {}", progress.advanced_exercises_completed);

    let recent = db.recent_completions(10)?;
    if !recent.is_empty() {
        println!();
        println!("recent drills:");
        for record in recent {
            println!(
                "  {}  {:<18} {:<12} {:>4} reps {:>4}s",
                record.completed_at.format("%Y-%m-%d %H:%M"),
                record.exercise_type,
                record.difficulty,
                record.reps,
                record.seconds
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _log_guard = logging::requested_level(cli.log_level.as_deref()).and_then(|level| {
        let dir = AppDirs::log_dir()?;
        logging::init_tracing(&level, &dir)
    });

    if cli.progress {
        return print_progress();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);
    if cli.save {
        store.save(&config)?;
        info!(path = %store.path().display(), "settings saved");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, open_db());
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);
    runner.event_source().token().cancel();
    app.session.dispose();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: DrillEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let mut last = Instant::now();
    terminal.draw(|f| ui(app, f))?;

    loop {
        let event = runner.step();
        let now = Instant::now();
        let mut redraw = app.on_tick(now.duration_since(last));
        last = now;

        match event {
            DrillEvent::Tick | DrillEvent::FocusGained => {}
            DrillEvent::Resize => redraw = true,
            DrillEvent::FocusLost => redraw |= app.session.pause_for_focus_loss(),
            DrillEvent::Key(key) => {
                if app.on_key(key) == ExitType::Quit {
                    break;
                }
                redraw = true;
            }
            DrillEvent::Closed => {
                warn!("terminal input closed, leaving");
                break;
            }
        }

        if redraw {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    ui::screen::current_screen(app.session.phase()).render(app, f);
}
