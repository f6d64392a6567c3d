//! Playback sessions driven by scripted host events.
//!
//! Run with:
//! ```
//! cargo test -p tubesum-speech --test playback
//! ```

use std::sync::{Arc, Mutex};

use tubesum_config::SpeechSettings;
use tubesum_speech::{
    BoundaryKind, PlaybackState, SpeakOptions, SpeechEngine, SpeechError, SpeechEvent, SpeechHost,
    Utterance, VoiceCatalog, readable_text, words,
};

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Word(usize),
    Scroll(usize),
    Cleared,
    End,
}

/// Host that accepts everything and remembers what it was asked to speak.
#[derive(Default)]
struct SilentHost {
    utterances: Vec<Utterance>,
    calls: Vec<&'static str>,
}

impl SpeechHost for SilentHost {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.calls.push("speak");
        self.utterances.push(utterance.clone());
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push("pause");
    }

    fn resume(&mut self) {
        self.calls.push("resume");
    }

    fn cancel(&mut self) {
        self.calls.push("cancel");
    }
}

fn engine() -> (SpeechEngine<SilentHost>, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut engine = SpeechEngine::new(SilentHost::default(), VoiceCatalog::new(), SpeechSettings::default());

    let log = seen.clone();
    engine.on_word_boundary(move |i| log.lock().unwrap().push(Seen::Word(i)));
    let log = seen.clone();
    engine.on_scroll_request(move |i| log.lock().unwrap().push(Seen::Scroll(i)));
    let log = seen.clone();
    engine.on_highlight_cleared(move || log.lock().unwrap().push(Seen::Cleared));
    let log = seen.clone();
    engine.on_end(move || log.lock().unwrap().push(Seen::End));

    (engine, seen)
}

fn word(char_index: usize) -> SpeechEvent {
    SpeechEvent::Boundary {
        char_index,
        kind: BoundaryKind::Word,
    }
}

#[test]
fn boundary_at_start_of_quick_is_word_one() {
    let (mut engine, seen) = engine();
    let id = engine.speak("The quick brown fox", SpeakOptions::default());
    engine.handle_event(id, SpeechEvent::Start);
    engine.handle_event(id, word(4));

    assert_eq!(engine.current_word_index(), Some(1));
    assert_eq!(*seen.lock().unwrap(), vec![Seen::Word(1), Seen::Scroll(1)]);
}

#[test]
fn stop_while_paused_goes_idle_without_end() {
    let (mut engine, seen) = engine();
    let id = engine.speak("The quick brown fox", SpeakOptions::default());
    engine.handle_event(id, word(10));
    engine.pause();
    assert_eq!(engine.state(), PlaybackState::Paused);

    engine.stop();

    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(engine.current_word_index(), None);
    let seen = seen.lock().unwrap();
    assert!(!seen.contains(&Seen::End));
    assert_eq!(seen.last(), Some(&Seen::Cleared));
}

#[test]
fn late_start_event_does_not_undo_pause() {
    let (mut engine, _seen) = engine();
    let id = engine.speak("one two three", SpeakOptions::default());
    engine.pause();

    engine.handle_event(id, SpeechEvent::Start);
    assert_eq!(engine.state(), PlaybackState::Paused);

    engine.resume();
    assert_eq!(engine.state(), PlaybackState::Speaking);
    assert_eq!(engine.host().calls, vec!["speak", "pause", "resume"]);
}

#[test]
fn repeated_offsets_fire_once() {
    let (mut engine, seen) = engine();
    let id = engine.speak("The quick brown fox", SpeakOptions::default());
    engine.handle_event(id, word(4));
    engine.handle_event(id, word(4));
    engine.handle_event(id, word(6));

    assert_eq!(engine.current_word_index(), Some(1));
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn out_of_order_offsets_stay_in_bounds() {
    let (mut engine, seen) = engine();
    let id = engine.speak("The quick brown fox", SpeakOptions::default());
    for offset in [16, 0, 999, 10, 4] {
        engine.handle_event(id, word(offset));
        let index = engine.current_word_index().unwrap();
        assert!(index < engine.word_count().unwrap());
    }

    let words: Vec<usize> = seen
        .lock()
        .unwrap()
        .iter()
        .filter_map(|s| match s {
            Seen::Word(i) => Some(*i),
            _ => None,
        })
        .collect();
    assert_eq!(words, vec![3, 0, 3, 2, 1]);
}

#[test]
fn events_after_stop_are_ignored() {
    let (mut engine, seen) = engine();
    let id = engine.speak("The quick brown fox", SpeakOptions::default());
    engine.stop();
    let before = seen.lock().unwrap().len();

    engine.handle_event(id, word(4));
    engine.handle_event(id, SpeechEvent::End);

    assert_eq!(engine.current_word_index(), None);
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(seen.lock().unwrap().len(), before);
}

#[test]
fn events_from_replaced_session_are_ignored() {
    let (mut engine, _seen) = engine();
    let old = engine.speak("old words here", SpeakOptions::default());
    let new = engine.speak("new text", SpeakOptions::default());

    engine.handle_event(old, word(9));
    assert_eq!(engine.current_word_index(), None);

    engine.handle_event(old, SpeechEvent::End);
    assert_eq!(engine.state(), PlaybackState::Speaking);
    assert_eq!(engine.session(), Some(new));
}

#[test]
fn natural_end_clears_highlight_and_fires_end_once() {
    let (mut engine, seen) = engine();
    let id = engine.speak("one two", SpeakOptions::default());
    engine.handle_event(id, word(4));
    engine.handle_event(id, SpeechEvent::End);
    engine.handle_event(id, SpeechEvent::End);

    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(engine.current_word_index(), None);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Seen::Word(1), Seen::Scroll(1), Seen::Cleared, Seen::End]
    );
}

#[test]
fn synthesis_error_keeps_last_word() {
    let (mut engine, seen) = engine();
    let id = engine.speak("one two three", SpeakOptions::default());
    engine.handle_event(id, word(4));
    engine.handle_event(id, SpeechEvent::Error("audio-busy".to_string()));

    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(engine.current_word_index(), Some(1));
    assert_eq!(seen.lock().unwrap().last(), Some(&Seen::End));

    engine.stop();
    assert_eq!(engine.current_word_index(), None);
}

#[test]
fn anchors_from_readable_text_match_indices() {
    let (mut engine, seen) = engine();
    let text = readable_text("## Summary\n* **Fast** start\n* slow end");
    let anchors = words(&text);
    let id = engine.speak(text.clone(), SpeakOptions::default());

    let offset = text.find("slow").map(|b| text[..b].chars().count()).unwrap();
    engine.handle_event(id, word(offset));

    let Some(Seen::Word(index)) = seen.lock().unwrap().first().cloned() else {
        panic!("no word boundary reported");
    };
    assert_eq!(anchors[index], "slow");
    assert_eq!(engine.host().utterances[0].text, text);
}
