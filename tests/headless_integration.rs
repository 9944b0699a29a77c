use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use flashdrill::engine::{EngineEvent, StimulusEngine};
use flashdrill::milestones::{MemoryRecorder, MilestoneType};
use flashdrill::program::{Difficulty, Letter, StimulusPool};
use flashdrill::runtime::{DrillEvent, FixedTicker, Runner, TestEventSource};
use flashdrill::session::{DrillSession, SessionPhase};
use flashdrill::strategy::ExerciseType;
use flashdrill::timing::ExerciseTimingConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;

// Every Tick from the runner stands for this much wall time
const VIRTUAL_TICK: Duration = Duration::from_millis(100);

fn session(exercise_type: ExerciseType, total: f64, recorder: &MemoryRecorder) -> DrillSession {
    let engine = StimulusEngine::new(
        ExerciseTimingConfig::new(total, 1.0, 0.5),
        StimulusPool {
            letters: Letter::parse_list("XYZ"),
            numbers: vec![2, 4, 6],
            ..Default::default()
        },
        exercise_type.strategy(),
        Box::new(recorder.clone()),
    )
    .with_difficulty(Difficulty::Intermediate)
    .with_rng(StdRng::seed_from_u64(42));
    DrillSession::new(1, engine)
}

fn space() -> DrillEvent {
    DrillEvent::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE))
}

/// Drive `session` through the runner, feeding `script` events at the given steps
fn drive(session: &mut DrillSession, script: &[(u32, DrillEvent)], max_steps: u32) -> Vec<EngineEvent> {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    let mut events = Vec::new();
    for step in 0..max_steps {
        for (at, ev) in script {
            if *at == step {
                tx.send(ev.clone()).unwrap();
            }
        }
        match runner.step() {
            DrillEvent::Tick => events.extend(session.advance(VIRTUAL_TICK)),
            DrillEvent::FocusLost => {
                session.pause_for_focus_loss();
            }
            DrillEvent::Key(key) => match key.code {
                KeyCode::Char(' ') => {
                    session.toggle_pause();
                }
                KeyCode::Char('s') => {
                    session.stop();
                }
                _ => {}
            },
            DrillEvent::Resize | DrillEvent::FocusGained => {}
            DrillEvent::Closed => break,
        }
        if session.phase() == SessionPhase::Summary {
            break;
        }
    }
    events
}

#[test]
fn headless_drill_runs_to_completion() {
    let recorder = MemoryRecorder::new();
    let mut session = session(ExerciseType::Simple, 4.0, &recorder);

    let events = drive(&mut session, &[], 200);

    assert_eq!(session.phase(), SessionPhase::Summary);
    let summary = session.summary().expect("summary after completion");
    assert_eq!(summary.total_secs, 4);
    assert_eq!(summary.total_reps, session.engine().state().emitted);
    assert!(!summary.stopped_early);
    assert_eq!(
        recorder.calls(),
        vec![(MilestoneType::ExercisesCompleted, Difficulty::Intermediate)]
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Completed(_)))
            .count(),
        1
    );
}

#[test]
fn headless_pause_holds_the_clock() {
    let recorder = MemoryRecorder::new();
    let mut session = session(ExerciseType::Simple, 3.0, &recorder);

    // countdown takes 10 ticks; pause at 2.5s of drill and never resume
    drive(&mut session, &[(35, space())], 200);

    assert_eq!(session.phase(), SessionPhase::Drill);
    let state = session.engine().state();
    assert!(state.is_paused);
    assert_eq!(state.elapsed_secs, 2);
    assert_eq!(state.time_left_secs, 1);
    assert!(recorder.calls().is_empty());
}

#[test]
fn headless_pause_then_resume_completes() {
    let recorder = MemoryRecorder::new();
    let mut session = session(ExerciseType::MathCombo, 3.0, &recorder);

    drive(&mut session, &[(15, space()), (80, space())], 300);

    assert_eq!(session.phase(), SessionPhase::Summary);
    assert_eq!(session.summary().unwrap().total_secs, 3);
    assert_eq!(recorder.calls().len(), 1);
}

#[test]
fn headless_focus_loss_pauses() {
    let recorder = MemoryRecorder::new();
    let mut session = session(ExerciseType::Simple, 5.0, &recorder);

    drive(&mut session, &[(20, DrillEvent::FocusLost)], 150);

    assert!(session.engine().state().is_paused);
    assert_eq!(session.phase(), SessionPhase::Drill);
}

#[test]
fn headless_stop_skips_milestone() {
    let recorder = MemoryRecorder::new();
    let mut session = session(ExerciseType::ShapeCount, 30.0, &recorder);
    let stop = DrillEvent::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));

    let events = drive(&mut session, &[(40, stop)], 500);

    assert_eq!(session.phase(), SessionPhase::Summary);
    let summary = session.summary().unwrap();
    assert!(summary.stopped_early);
    assert_eq!(summary.headers, ["Shape", "Count"]);
    assert!(summary.total_reps >= summary.emitted * 2);
    assert!(recorder.calls().is_empty());
    assert!(!events.iter().any(|e| matches!(e, EngineEvent::Completed(_))));
}
