// core/tests/session_flow.rs
//
// End-to-end ImeEngine sessions with the mock codec.
//
// Tests cover:
// - Callback order and exactly-once action completion
// - Escape idempotence and silent no-ops
// - Confirmation trimming the buffer
// - Phrase suggestion after a confirmation
// - Forced confirmation on overflow
// - Load failure handling

mod common;

use common::MockCodec;
use composer_core::{
    Candidate, Config, DataPackEntry, DictionaryError, ImeContext, ImeEngine, ImeError, ImeEvent,
    InputEvent, MemoryDictionary, Phase, SyllableCodec,
};

type TestEngine = ImeEngine<MockCodec, MemoryDictionary, ImeContext>;

fn dictionary() -> MemoryDictionary {
    let mut dict = MemoryDictionary::new()
        .with("h", "好", 5.0)
        .with("m", "嗎", 3.0)
        .with("hm", "好嗎", 10.0)
        .with("n", "你", 4.0)
        .with("nh", "你好", 9.0);
    dict.insert("hd", DataPackEntry::unscored("好的"));
    dict
}

fn engine() -> TestEngine {
    let mut engine = ImeEngine::new(MockCodec, ImeContext::new());
    engine.load(dictionary()).unwrap();
    engine.callbacks_mut().take_events();
    engine
}

fn type_symbols(engine: &mut TestEngine, symbols: &str, first_id: u64) {
    for (i, ch) in symbols.chars().enumerate() {
        assert!(engine.handle_key(InputEvent::Symbol(ch), first_id + i as u64).unwrap());
    }
}

#[test]
fn test_three_queued_keys_complete_in_order() {
    let mut engine = engine();
    let taken = engine
        .handle_keys([
            (InputEvent::Symbol('n'), 1),
            (InputEvent::Symbol('h'), 2),
            (InputEvent::Enter, 3),
        ])
        .unwrap();

    assert_eq!(taken, vec![true, true, true]);
    assert_eq!(engine.callbacks().handled, vec![1, 2, 3]);

    // Every event of an action precedes the next action's events.
    let ids: Vec<u64> = engine
        .callbacks()
        .events
        .iter()
        .filter_map(|e| e.request_id())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(engine.callbacks_mut().take_commit(), "你好");
}

#[test]
fn test_batched_literal_after_escape_is_refused() {
    let mut engine = engine();
    let taken = engine
        .handle_keys([
            (InputEvent::Symbol('h'), 1),
            (InputEvent::Escape, 2),
            (InputEvent::Literal('!'), 3),
        ])
        .unwrap();

    // Escape emptied the session, so the literal goes back to the caller.
    assert_eq!(taken, vec![true, true, false]);
    assert_eq!(engine.callbacks().handled, vec![1, 2]);
    assert!(engine.callbacks_mut().take_commit().is_empty());
    assert_eq!(engine.phase(), Phase::Empty);
}

#[test]
fn test_second_escape_is_not_taken() {
    let mut engine = engine();
    type_symbols(&mut engine, "hm", 1);

    assert!(engine.handle_key(InputEvent::Escape, 10).unwrap());
    let first: Vec<&ImeEvent> = engine.callbacks().events_for(10);
    assert_eq!(first.len(), 3);

    // Nothing is pending any more, so the second Escape is not even taken.
    assert!(!engine.handle_key(InputEvent::Escape, 11).unwrap());
    assert!(engine.callbacks().events_for(11).is_empty());
    assert_eq!(engine.phase(), Phase::Empty);
    assert!(!engine.callbacks().has_visible_state());
}

#[test]
fn test_escape_while_suggesting_then_again() {
    let mut engine = engine();
    type_symbols(&mut engine, "h", 1);
    engine.handle_key(InputEvent::Enter, 2).unwrap();
    assert_eq!(engine.phase(), Phase::Suggesting);

    assert!(engine.handle_key(InputEvent::Escape, 3).unwrap());
    assert_eq!(engine.phase(), Phase::Empty);
    let before = engine.callbacks().events.len();
    assert!(!engine.handle_key(InputEvent::Escape, 4).unwrap());
    assert_eq!(engine.callbacks().events.len(), before);
}

#[test]
fn test_backspace_and_enter_noops_still_complete() {
    let mut engine = engine();
    type_symbols(&mut engine, "h", 1);
    engine.handle_key(InputEvent::Enter, 2).unwrap();

    // Suggestions are offered, so Backspace is absorbed but changes nothing.
    assert!(engine.handle_key(InputEvent::Backspace, 3).unwrap());
    assert_eq!(
        engine.callbacks().events_for(3),
        vec![&ImeEvent::ActionHandled(3)]
    );
}

#[test]
fn test_backspace_requeries() {
    let mut engine = engine();
    type_symbols(&mut engine, "hm", 1);
    assert_eq!(engine.candidates()[0], Candidate::new("好嗎", "hm"));

    engine.handle_key(InputEvent::Backspace, 3).unwrap();
    assert_eq!(engine.state().syllables.as_str(), "h");
    assert_eq!(engine.candidates(), &[Candidate::new("好", "h")]);

    engine.handle_key(InputEvent::Backspace, 4).unwrap();
    assert_eq!(engine.phase(), Phase::Empty);
    assert!(engine.callbacks().candidates.is_empty());
    assert!(engine.callbacks().preedit_text.is_empty());
}

#[test]
fn test_confirmation_trims_consumed_prefix() {
    for pick in 0..3 {
        let mut engine = engine();
        type_symbols(&mut engine, "nHm", 1);
        let original = MockCodec.encode_lossless(engine.state().syllables.as_str());

        let candidate = engine.candidates()[pick].clone();
        let consumed = candidate.consumed_syllables();
        engine.select_candidate(candidate.clone(), 10).unwrap();

        let remaining = MockCodec.encode_lossless(engine.state().syllables.as_str());
        let expected: String = original.chars().skip(consumed).collect();
        assert_eq!(remaining, expected, "after confirming {:?}", candidate);
        assert_eq!(engine.state().confirmed_characters, candidate.text);
        assert_eq!(engine.state().confirmed_encoded, candidate.consumed);
    }
}

#[test]
fn test_partial_confirmation_keeps_composing() {
    let mut engine = engine();
    type_symbols(&mut engine, "nhm", 1);
    // [n][hm] scores 14, above [nh][m] at 12.
    assert_eq!(engine.candidates()[0], Candidate::new("你好嗎", "nhm"));

    engine
        .select_candidate(Candidate::new("你好", "nh"), 5)
        .unwrap();
    assert_eq!(engine.callbacks_mut().take_commit(), "你好");
    assert_eq!(engine.phase(), Phase::Composing);
    assert_eq!(engine.state().syllables.as_str(), "m");
    assert_eq!(engine.candidates()[0], Candidate::new("嗎", "m"));
}

#[test]
fn test_suggestions_after_confirmation() {
    let mut engine = engine();
    type_symbols(&mut engine, "h", 1);
    engine.handle_key(InputEvent::Enter, 2).unwrap();
    assert_eq!(engine.callbacks_mut().take_commit(), "好");

    assert_eq!(
        engine.callbacks().candidates,
        vec![Candidate::new("嗎", ""), Candidate::new("的", "")]
    );

    let events = engine.callbacks().events_for(2);
    assert!(matches!(events[0], ImeEvent::CompositionEnd { text, .. } if text == "好"));
    assert!(matches!(events[1], ImeEvent::CompositionUpdate { text, .. } if text.is_empty()));
    assert!(matches!(events[2], ImeEvent::CandidatesChange { .. }));
    assert_eq!(events[3], &ImeEvent::ActionHandled(2));

    // Picking a suggestion commits it and consumes nothing.
    let suggestion = engine.candidates()[0].clone();
    engine.select_candidate(suggestion, 3).unwrap();
    assert_eq!(engine.callbacks_mut().take_commit(), "嗎");
    assert_eq!(engine.phase(), Phase::Empty);
}

#[test]
fn test_suggestions_can_be_disabled() {
    let mut config = Config::default();
    config.set_suggest_phrases(false);
    let mut engine = engine();
    engine.set_config(config);

    type_symbols(&mut engine, "h", 1);
    engine.handle_key(InputEvent::Enter, 2).unwrap();
    assert!(engine.candidates().is_empty());
    assert_eq!(engine.phase(), Phase::Empty);
}

#[test]
fn test_literal_key_confirms_default_with_suffix() {
    let mut engine = engine();
    type_symbols(&mut engine, "h", 1);
    assert!(engine.handle_key_event('，' as u32, 2).unwrap());
    assert_eq!(engine.callbacks_mut().take_commit(), "好，");
    assert_eq!(engine.state().confirmed_characters, "好，");
}

#[test]
fn test_key_codes_map_to_events() {
    let mut engine = engine();
    assert!(engine.handle_key_event('h' as u32, 1).unwrap());
    assert!(engine.handle_key_event(0x0d, 2).unwrap());
    assert_eq!(engine.callbacks_mut().take_commit(), "好");
    assert!(matches!(
        engine.handle_key_event(0x11_0000, 3),
        Err(ImeError::InvalidKeyCode(0x11_0000))
    ));
}

#[test]
fn test_overflow_confirms_first_matched_phrase() {
    let mut config = Config::default();
    config.set_max_syllables(2);
    let mut engine = engine();
    engine.set_config(config);

    type_symbols(&mut engine, "nh", 1);
    assert_eq!(engine.state().first_matched_phrase, Some(Candidate::new("你好", "nh")));

    engine.handle_key(InputEvent::Symbol('m'), 3).unwrap();
    let events = engine.callbacks().events_for(3);
    assert!(matches!(events[0], ImeEvent::CompositionEnd { text, .. } if text == "你好"));
    assert_eq!(engine.state().syllables.as_str(), "m");
    assert_eq!(engine.candidates()[0], Candidate::new("嗎", "m"));
    assert_eq!(engine.callbacks().handled.last(), Some(&3));
}

#[test]
fn test_overflow_without_match_confirms_typo() {
    let mut config = Config::default();
    config.set_max_syllables(1);
    let mut engine = engine();
    engine.set_config(config);

    type_symbols(&mut engine, "Qh", 1);
    assert_eq!(engine.callbacks_mut().take_commit(), "Q");
    assert_eq!(engine.state().syllables.as_str(), "h");
}

#[test]
fn test_failed_load_leaves_engine_unavailable() {
    let mut engine: TestEngine = ImeEngine::new(MockCodec, ImeContext::new());
    let err = engine
        .load_with(|| Err(DictionaryError::MissingPayload(3)))
        .unwrap_err();
    assert!(matches!(
        err,
        ImeError::Dictionary(DictionaryError::MissingPayload(3))
    ));
    assert!(matches!(
        engine.callbacks().events.as_slice(),
        [ImeEvent::Error(_), ImeEvent::LoadEnd]
    ));

    assert!(matches!(
        engine.handle_key(InputEvent::Symbol('h'), 1),
        Err(ImeError::Unavailable)
    ));
    assert!(matches!(
        engine.load(dictionary()),
        Err(ImeError::AlreadyLoaded)
    ));

    engine.unload().unwrap();
    engine.load(dictionary()).unwrap();
    assert!(engine.handle_key(InputEvent::Symbol('h'), 2).unwrap());
}

#[test]
fn test_unload_resets_session() {
    let mut engine = engine();
    type_symbols(&mut engine, "nh", 1);
    engine.unload().unwrap();
    assert_eq!(engine.phase(), Phase::Empty);
    assert_eq!(engine.callbacks().events.last(), Some(&ImeEvent::Unload));
    assert!(!engine.callbacks().loaded);
    assert!(matches!(
        engine.select_candidate(Candidate::new("你", "n"), 9),
        Err(ImeError::NotLoaded)
    ));
}
