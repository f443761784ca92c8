mod common;

use std::collections::BTreeSet;

use common::{OracleSurface, ScriptedSurface, store_with};
use quizdrill::session::{Flow, PlayEnd, Report, SessionEngine, SessionError, Verdict};

const CAPITALS: &[(&str, &str)] = &[
    ("Capital of Italy?", "Rome"),
    ("Capital of France?", "Paris"),
    ("Capital of Spain?", "Madrid"),
    ("Capital of Portugal?", "Lisbon"),
    ("Capital of Greece?", "Athens"),
];

#[tokio::test]
async fn all_correct_round_asks_each_quiz_exactly_once() {
    for seed in 0..20u64 {
        let mut engine = SessionEngine::with_seed(store_with(CAPITALS).await, seed);
        let mut surface = OracleSurface::new(CAPITALS, None);

        let outcome = engine.play(&mut surface).await.expect("play");

        assert_eq!(outcome.end, PlayEnd::Exhausted);
        assert_eq!(outcome.score as usize, CAPITALS.len());
        assert_eq!(surface.asked.len(), CAPITALS.len());
        let distinct: BTreeSet<_> = outcome.asked.iter().copied().collect();
        assert_eq!(distinct, (1..=CAPITALS.len() as i64).collect::<BTreeSet<i64>>());
        assert_eq!(surface.reports.last(), Some(&Report::FinalScore(CAPITALS.len() as u32)));
    }
}

#[tokio::test]
async fn scores_are_reported_after_every_correct_answer() {
    let mut engine = SessionEngine::with_seed(store_with(CAPITALS).await, 7);
    let mut surface = OracleSurface::new(CAPITALS, None);

    engine.play(&mut surface).await.expect("play");

    let scores: Vec<u32> = surface
        .reports
        .iter()
        .filter_map(|r| match r {
            Report::Score(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(scores, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn first_miss_ends_the_round_with_previous_score() {
    for k in 1..=CAPITALS.len() {
        let mut engine = SessionEngine::with_seed(store_with(CAPITALS).await, k as u64);
        let mut surface = OracleSurface::new(CAPITALS, Some(k));

        let outcome = engine.play(&mut surface).await.expect("play");

        assert_eq!(outcome.end, PlayEnd::Incorrect);
        assert_eq!(outcome.score as usize, k - 1);
        assert_eq!(surface.asked.len(), k, "no questions after the miss");
        assert_eq!(surface.reports.last(), Some(&Report::Verdict(Verdict::Incorrect)));
        assert!(!surface.reports.iter().any(|r| matches!(r, Report::FinalScore(_))));
    }
}

#[tokio::test]
async fn the_expected_answer_is_never_revealed_on_a_miss() {
    let mut engine = SessionEngine::with_seed(store_with(&[("2+2?", "4")]).await, 1);
    let mut surface = ScriptedSurface::new(&["five"]);

    engine.play(&mut surface).await.expect("play");

    assert_eq!(surface.reports, vec![Report::Verdict(Verdict::Incorrect)]);
}

#[tokio::test]
async fn same_seed_gives_same_order() {
    let mut a = SessionEngine::with_seed(store_with(CAPITALS).await, 99);
    let mut b = SessionEngine::with_seed(store_with(CAPITALS).await, 99);

    let first = a.play(&mut OracleSurface::new(CAPITALS, None)).await.unwrap();
    let second = b.play(&mut OracleSurface::new(CAPITALS, None)).await.unwrap();

    assert_eq!(first.asked, second.asked);
}

#[tokio::test]
async fn empty_store_finishes_immediately_with_zero() {
    let mut engine = SessionEngine::new(store_with(&[]).await);
    let mut surface = ScriptedSurface::new(&[]);

    let outcome = engine.play(&mut surface).await.expect("play");

    assert_eq!(outcome.score, 0);
    assert_eq!(outcome.end, PlayEnd::Exhausted);
    assert!(surface.prompts.is_empty());
    assert_eq!(surface.reports, vec![Report::FinalScore(0)]);
}

#[tokio::test]
async fn store_failure_reports_error_without_score() {
    let handle = store_with(CAPITALS).await;
    handle.shutdown().await.expect("shutdown");
    let mut engine = SessionEngine::new(handle);
    let mut surface = ScriptedSurface::new(&[]);

    assert_eq!(engine.dispatch(&mut surface, "play").await, Flow::Continue);

    assert_eq!(surface.errors().len(), 1);
    assert!(!surface
        .reports
        .iter()
        .any(|r| matches!(r, Report::Score(_) | Report::FinalScore(_))));
    assert_eq!(surface.ready_count, 1);
}

#[tokio::test]
async fn closing_input_mid_round_stops_without_a_final_score() {
    let mut engine = SessionEngine::with_seed(store_with(CAPITALS).await, 3);
    let mut surface = OracleSurface::new(&CAPITALS[..0], None);

    let err = engine.play(&mut surface).await.unwrap_err();

    assert!(matches!(err, SessionError::Closed));
    assert_eq!(surface.asked.len(), 1);
    assert!(surface.reports.is_empty());
}

#[tokio::test]
async fn alias_p_starts_a_round() {
    let mut engine = SessionEngine::with_seed(store_with(&[("2+2?", "4")]).await, 5);
    let mut surface = ScriptedSurface::new(&["4"]);

    assert_eq!(engine.dispatch(&mut surface, "P").await, Flow::Continue);

    assert_eq!(
        surface.reports,
        vec![
            Report::Verdict(Verdict::Correct),
            Report::Score(1),
            Report::FinalScore(1),
        ]
    );
    assert_eq!(surface.ready_count, 1);
}

#[tokio::test]
async fn every_quiz_is_equally_likely_at_every_position() {
    const ROUNDS: usize = 2000;
    let n = CAPITALS.len();
    let store = store_with(CAPITALS).await;
    // counts[position][id - 1]
    let mut counts = vec![vec![0usize; n]; n];

    for seed in 0..ROUNDS as u64 {
        let mut engine = SessionEngine::with_seed(store.clone(), seed);
        let mut surface = OracleSurface::new(CAPITALS, None);
        let outcome = engine.play(&mut surface).await.expect("play");
        for (pos, id) in outcome.asked.iter().enumerate() {
            counts[pos][(*id - 1) as usize] += 1;
        }
    }

    let expected = ROUNDS / n;
    let tolerance = expected / 4;
    for (pos, row) in counts.iter().enumerate() {
        for (idx, count) in row.iter().enumerate() {
            assert!(
                count.abs_diff(expected) <= tolerance,
                "quiz {} asked {count} times at position {pos}, expected about {expected}",
                idx + 1
            );
        }
    }
}
