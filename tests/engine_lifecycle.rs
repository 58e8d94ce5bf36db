//! Lifecycle behaviour of `HandpanEngine` over a headless host.

use std::{cell::RefCell, rc::Rc};

use handpan_dsp::{
    analysis::peak,
    engine::EngineState,
    platform::{ContextState, FixedPlatform, OfflineHost, Platform},
    EngineConfig, Error, HandpanEngine, NoteLength, PlaybackEvent, ValidationError,
};

const SAMPLE_RATE: u64 = 48_000;

fn engine_on(host: &OfflineHost, platform: Platform) -> HandpanEngine {
    HandpanEngine::new(
        Box::new(host.clone()),
        Box::new(FixedPlatform(platform)),
        EngineConfig::default(),
    )
}

fn ready_engine() -> (HandpanEngine, OfflineHost) {
    let host = OfflineHost::default();
    let mut engine = engine_on(&host, Platform::Desktop);
    engine.unlock().unwrap();
    (engine, host)
}

fn ms(millis: u64) -> u64 {
    millis * SAMPLE_RATE / 1_000
}

#[test]
fn initialize_twice_builds_one_context_and_renderer() {
    let host = OfflineHost::default();
    let mut engine = engine_on(&host, Platform::Desktop);

    engine.initialize().unwrap();
    engine.initialize().unwrap();

    assert_eq!(host.contexts_created(), 1);
    assert_eq!(host.renderers_connected(), 1);
    assert_eq!(engine.engine_state(), EngineState::Ready);
    // Initialized but not unlocked: the context waits for a gesture.
    assert_eq!(host.state(), Some(ContextState::Suspended));
    assert!(!engine.is_ready());
}

#[test]
fn unlock_transitions_once_and_fires_each_callback_once() {
    let host = OfflineHost::default();
    let mut engine = engine_on(&host, Platform::Desktop);
    let fired = Rc::new(RefCell::new(Vec::new()));

    for id in 0..3 {
        let fired = Rc::clone(&fired);
        engine.on_unlock(move || fired.borrow_mut().push(id));
    }

    for _ in 0..4 {
        engine.unlock().unwrap();
    }
    assert_eq!(*fired.borrow(), vec![0, 1, 2]);
    assert_eq!(host.contexts_created(), 1);

    // Registered after the unlock: runs immediately.
    let late = Rc::clone(&fired);
    engine.on_unlock(move || late.borrow_mut().push(9));
    assert_eq!(*fired.borrow(), vec![0, 1, 2, 9]);
}

#[test]
fn ios_unlock_plays_one_silent_ping() {
    let host = OfflineHost::default();
    let mut engine = engine_on(&host, Platform::Ios);
    engine.unlock().unwrap();
    engine.unlock().unwrap();

    assert_eq!(host.pings(), 1);
    assert_eq!(host.sample_rate(), 44_100);
}

#[test]
fn refused_platform_reports_and_stays_silent() {
    let host = OfflineHost::refusing();
    let mut engine = engine_on(&host, Platform::Desktop);

    assert!(matches!(engine.unlock(), Err(Error::ContextInit(_))));
    assert!(!engine.is_ready());
    // Gated calls are swallowed, not failed.
    engine.play_note(432.0, NoteLength::Short).unwrap();
    assert!(engine.start_metronome(90).is_none());

    host.set_refuse_contexts(false);
    engine.unlock().unwrap();
    assert!(engine.is_ready());
}

#[test]
fn replaced_pattern_never_plays_its_remaining_notes() {
    let (mut engine, host) = ready_engine();

    let first = engine
        .play_pattern(&["D3", "A3", "C4"], &[0, 500, 1_000])
        .unwrap()
        .unwrap();
    host.render(ms(200) as usize);

    let second = engine.play_pattern(&["E4"], &[0]).unwrap().unwrap();
    assert_ne!(first, second);
    host.render(ms(2_000) as usize);

    let events = engine.poll_events();
    let first_notes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::PatternNote { pattern, index, .. } if *pattern == first => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(first_notes, vec![0]);

    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::PatternNote { pattern, frequency, .. }
            if *pattern == second && (*frequency - 324.0).abs() < 1e-3
    )));
    assert!(events.contains(&PlaybackEvent::PatternFinished { pattern: second }));
    assert!(!events.contains(&PlaybackEvent::PatternFinished { pattern: first }));
    assert!(engine.transport_state().active_pattern.is_none());
}

#[test]
fn invalid_pattern_is_rejected_before_anything_plays() {
    let (mut engine, _host) = ready_engine();

    let err = engine.play_pattern(&["D3", "F#4"], &[0, 100]).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownNote(_))
    ));
    assert!(engine.play_pattern(&["D3"], &[0, 100]).is_err());
    assert!(engine.transport_state().active_pattern.is_none());
}

#[test]
fn restarted_metronome_keeps_a_single_loop() {
    let (mut engine, host) = ready_engine();

    let slow = engine.start_metronome(80).unwrap();
    host.render(ms(1_000) as usize);
    engine.poll_events();

    let fast = engine.start_metronome(120).unwrap();
    assert_ne!(slow, fast);
    assert_eq!(engine.transport_state().active_loop, Some(fast));
    host.render(ms(3_000) as usize);

    let beats: Vec<u64> = engine
        .poll_events()
        .into_iter()
        .filter_map(|e| match e {
            PlaybackEvent::Beat { at, .. } => Some(at),
            _ => None,
        })
        .collect();

    assert!(beats.len() >= 5, "only {} beats", beats.len());
    let interval = ms(500);
    for pair in beats.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap.abs_diff(interval) <= 1, "gap {gap}");
    }
}

#[test]
fn volume_is_clamped_to_unity() {
    let (mut engine, _host) = ready_engine();

    engine.set_volume(50.0);
    assert_eq!(engine.volume_db(), 0.0);

    engine.set_volume(-100.0);
    assert_eq!(engine.volume_db(), -40.0);

    engine.set_volume(f32::NAN);
    assert_eq!(engine.volume_db(), -40.0);
}

#[test]
fn disposed_engine_is_silent_until_restored() {
    let (mut engine, host) = ready_engine();
    engine.start_drone(144.0).unwrap();
    engine.dispose().unwrap();

    assert_eq!(engine.engine_state(), EngineState::Disposed);
    engine.play_note(432.0, NoteLength::Short).unwrap();
    engine.start_drone(144.0).unwrap();
    assert!(!engine.drone_state().active);
    assert_eq!(peak(&host.render_seconds(0.2)), 0.0);

    engine.initialize().unwrap();
    engine.unlock().unwrap();
    assert!(engine.is_ready());
    assert_eq!(host.contexts_created(), 2);

    engine.play_note(432.0, NoteLength::Short).unwrap();
    assert!(peak(&host.render_seconds(0.1)) > 0.05);
}

#[test]
fn hidden_engine_pauses_and_resumes() {
    let (mut engine, host) = ready_engine();
    engine.start_metronome(120).unwrap();
    host.render(ms(600) as usize);
    engine.poll_events();

    engine.handle_visibility_change(false).unwrap();
    assert_eq!(host.state(), Some(ContextState::Suspended));
    assert!(engine.transport_state().paused);
    host.render(ms(2_000) as usize);
    assert!(engine.poll_events().is_empty());

    engine.handle_visibility_change(true).unwrap();
    assert_eq!(host.state(), Some(ContextState::Running));
    host.render(ms(600) as usize);
    assert!(engine
        .poll_events()
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Beat { .. })));
}

#[test]
fn repeated_hide_signals_still_resume_on_show() {
    let (mut engine, host) = ready_engine();

    engine.handle_visibility_change(false).unwrap();
    engine.handle_visibility_change(false).unwrap();
    assert_eq!(host.state(), Some(ContextState::Suspended));

    engine.handle_visibility_change(true).unwrap();
    assert_eq!(host.state(), Some(ContextState::Running));
    assert!(engine.is_ready());
    assert!(!engine.transport_state().paused);

    engine.play_note(432.0, NoteLength::Short).unwrap();
    assert!(peak(&host.render_seconds(0.1)) > 0.05);
}

#[test]
fn far_pattern_offset_renders_without_overflow() {
    let (mut engine, host) = ready_engine();

    let id = engine
        .play_pattern(&["D3", "A3"], &[0, i64::MAX])
        .unwrap()
        .unwrap();
    host.render(4_800);

    let events = engine.poll_events();
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::PatternNote { pattern, index: 0, at: 0, .. } if *pattern == id
    )));
    assert!(!events.contains(&PlaybackEvent::PatternFinished { pattern: id }));
    assert_eq!(engine.transport_state().active_pattern, Some(id));
}

#[test]
fn stopping_the_metronome_keeps_the_pattern_on_time() {
    let (mut engine, host) = ready_engine();

    engine.start_metronome(120).unwrap();
    let id = engine
        .play_pattern(&["D3", "A3"], &[0, 1_000])
        .unwrap()
        .unwrap();
    host.render(ms(200) as usize);

    engine.stop_metronome();
    assert!(engine.transport_state().running);
    host.render(ms(1_400) as usize);

    let events = engine.poll_events();
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::PatternNote { pattern, index: 1, at, .. }
            if *pattern == id && *at == ms(1_000)
    )));
    assert!(!events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Beat { at, .. } if *at > ms(200))));
    assert!(events.contains(&PlaybackEvent::PatternFinished { pattern: id }));
    assert!(engine.transport_state().active_pattern.is_none());
}
