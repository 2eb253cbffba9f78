// core/tests/query_scenarios.rs
//
// Query engine behaviour over a small in-memory dictionary.
//
// Tests cover:
// - Whole-buffer phrases ranked first
// - Composed candidates ranked by summed score
// - Typo fallback for unknown syllables
// - Non-empty candidate lists for every non-empty buffer
// - Cache relevance after each cycle

mod common;

use common::MockCodec;
use composer_core::{
    Candidate, DataPackEntry, MemoryDictionary, QueryEngine, QueryOutcome, SegmentCache,
};

fn candidates(dict: &MemoryDictionary, symbols: &str) -> (Vec<Candidate>, Option<Candidate>) {
    let mut cache = SegmentCache::new();
    match QueryEngine::new(&MockCodec, dict).query(&mut cache, symbols, 8) {
        QueryOutcome::Candidates {
            candidates,
            first_matched,
        } => (candidates, first_matched),
        QueryOutcome::Overflow => panic!("{} should not overflow", symbols),
    }
}

#[test]
fn test_whole_buffer_phrase_comes_first() {
    let dict = MemoryDictionary::new().with("aa", "好", 1.0);

    let (list, first) = candidates(&dict, "aa");
    assert_eq!(list[0], Candidate::new("好", "aa"));
    assert_eq!(first, Some(Candidate::new("好", "aa")));
}

#[test]
fn test_composed_candidate_outranks_partials() {
    let dict = MemoryDictionary::new()
        .with("a", "好", 5.0)
        .with("b", "嗎", 3.0);

    let (list, first) = candidates(&dict, "ab");
    assert_eq!(
        list,
        vec![Candidate::new("好嗎", "ab"), Candidate::new("好", "a")]
    );
    // Composed results never become the overflow target.
    assert_eq!(first, Some(Candidate::new("好", "a")));
}

#[test]
fn test_composed_candidates_sorted_by_total_score() {
    let dict = MemoryDictionary::new()
        .with("a", "一", 5.0)
        .with("b", "二", 3.0)
        .with("c", "三", 1.0)
        .with("ab", "甲乙", 1.0)
        .with("bc", "乙丙", 20.0);

    let (list, _) = candidates(&dict, "abc");
    let texts: Vec<&str> = list.iter().map(|c| c.text.as_str()).collect();
    // [a][bc] = 25, [a][b][c] = 9, [ab][c] = 2; then the prefixes.
    assert_eq!(texts, vec!["一乙丙", "一二三", "甲乙三", "甲乙", "一"]);
}

#[test]
fn test_unknown_syllable_yields_single_typo() {
    let dict = MemoryDictionary::new().with("a", "好", 5.0);

    let (list, first) = candidates(&dict, "Q");
    assert_eq!(list, vec![Candidate::new("Q", "q")]);
    assert_eq!(first, Some(Candidate::new("Q", "q")));
}

#[test]
fn test_duplicate_texts_are_suppressed() {
    let mut dict = MemoryDictionary::new()
        .with("a", "好", 5.0)
        .with("b", "嗎", 3.0);
    dict.insert("ab", DataPackEntry::new("好嗎", 1.0));
    dict.insert("ab", DataPackEntry::unscored("好嗎"));

    let (list, _) = candidates(&dict, "ab");
    let texts: Vec<&str> = list.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["好嗎", "好"]);
}

#[test]
fn test_every_buffer_gets_candidates() {
    let dict = MemoryDictionary::new()
        .with("a", "好", 5.0)
        .with("ab", "好嗎", 8.0)
        .with("bq", "不去", 2.0);
    let alphabet = ['a', 'b', 'q', 'A'];

    let mut buffers = vec![String::new()];
    for _ in 0..4 {
        let mut longer = Vec::new();
        for prefix in &buffers {
            for ch in alphabet {
                let mut s = prefix.clone();
                s.push(ch);
                longer.push(s);
            }
        }
        for symbols in &longer {
            let (list, first) = candidates(&dict, symbols);
            assert!(!list.is_empty(), "no candidates for {}", symbols);
            assert!(first.is_some(), "no overflow target for {}", symbols);
            for c in &list {
                assert!(!c.consumed.is_empty());
                assert!(c.consumed_syllables() <= symbols.chars().count());
            }
        }
        buffers = longer;
    }
}

#[test]
fn test_overflow_when_buffer_exceeds_limit() {
    let dict = MemoryDictionary::new();
    let mut cache = SegmentCache::new();
    let engine = QueryEngine::new(&MockCodec, &dict);

    assert_eq!(engine.query(&mut cache, "abc", 2), QueryOutcome::Overflow);
    assert!(matches!(
        engine.query(&mut cache, "ab", 2),
        QueryOutcome::Candidates { .. }
    ));
}

#[test]
fn test_cache_keys_are_substrings_after_each_cycle() {
    let dict = MemoryDictionary::new()
        .with("a", "好", 5.0)
        .with("b", "嗎", 3.0);
    let engine = QueryEngine::new(&MockCodec, &dict);
    let mut cache = SegmentCache::new();

    for symbols in ["a", "ab", "abq", "ab", "b", "qq"] {
        engine.query(&mut cache, symbols, 8);
        let key = symbols.to_ascii_lowercase();
        assert!(
            cache.keys().all(|k| key.contains(k)),
            "stale keys after {}: {:?}",
            symbols,
            cache.keys().collect::<Vec<_>>()
        );
    }
}
