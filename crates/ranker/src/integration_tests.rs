use assert_eq_float::assert_eq_float;
use lowvol_rating::{GlickoConfig, GlickoRating};

use crate::{
    AdaptiveRanker, JsonLinesSink, MemorySink, RankerConfig, RatingRecord, Session, SharedRanker,
    StopReason, TextSink,
};

// Hidden quality per entity; the oracle answers with the expected score under it.
const TRUTH: [f64; 6] = [0.0, 400.0, -200.0, 200.0, -400.0, 100.0];

fn oracle(id1: usize, id2: usize) -> f64 {
    1.0 / (1.0 + 10f64.powf(-(TRUTH[id1] - TRUTH[id2]) / 400.0))
}

fn fresh(config: RankerConfig) -> AdaptiveRanker {
    let mut ranker = AdaptiveRanker::new(config);
    for _ in TRUTH {
        ranker.add_default_entity();
    }
    ranker
}

fn run_loop(ranker: &mut AdaptiveRanker, rounds: usize) {
    for _ in 0..rounds {
        let (id1, id2) = ranker.next_comparison().unwrap();
        ranker.apply_outcome(id1, id2, oracle(id1, id2), true).unwrap();
    }
}

#[test]
fn uncertain_pair_is_asked_before_settled_entity() {
    let mut ranker = AdaptiveRanker::default();
    ranker.add_entity(0.0, 350.0);
    ranker.add_entity(0.0, 350.0);
    ranker.add_entity(1000.0, 50.0);

    assert_eq!(ranker.next_comparison().unwrap(), (0, 1));

    ranker.apply_outcome(0, 1, 1.0, true).unwrap();

    assert!(ranker.rating(0).unwrap() > 0.0);
    assert!(ranker.rating(1).unwrap() < 0.0);
    assert!(ranker.rd(0).unwrap() < 350.0);
    assert!(ranker.rd(1).unwrap() < 350.0);
    assert_eq_float!(ranker.rating(2).unwrap(), 1000.0);
    assert_eq_float!(ranker.rd(2).unwrap(), 50.0);
    // 0 and 1 are excluded, 2 has nobody left to play.
    assert_eq!(ranker.candidate_pair(), (Some(2), None));
}

#[test]
fn adaptive_loop_recovers_hidden_order() {
    let mut ranker = fresh(RankerConfig::default());
    run_loop(&mut ranker, 60);

    assert_eq!(ranker.ranking(), vec![1, 3, 5, 0, 2, 4]);
    assert_eq!(ranker.ledger().len(), 60);
    assert!(ranker.entities().iter().all(|e| e.model.rd() < 350.0));
    assert!(
        ranker
            .entities()
            .iter()
            .all(|e| e.model.num_comparisons() > 0)
    );
}

#[test]
fn rd_floor_keeps_deviation_up() {
    let mut ranker = fresh(RankerConfig {
        avoid_twice: true,
        glicko: GlickoConfig::new().rd_floor(120.0),
    });
    run_loop(&mut ranker, 60);

    assert!(ranker.entities().iter().all(|e| e.model.rd() >= 120.0));
    assert_eq!(ranker.ranking()[0], 1);
    assert_eq!(ranker.ranking()[5], 4);
}

#[test]
fn consecutive_pairs_never_repeat() {
    let mut ranker = fresh(RankerConfig::default());
    run_loop(&mut ranker, 30);

    for window in ranker.ledger().entries().windows(2) {
        let (prev, next) = (window[0], window[1]);
        assert!(!next.involves(prev.id1));
        assert!(!next.involves(prev.id2));
    }
}

#[test]
fn replay_of_a_session_ledger_matches() {
    let mut ranker = fresh(RankerConfig::default());
    run_loop(&mut ranker, 25);

    let replayed = AdaptiveRanker::replay(
        *ranker.config(),
        std::iter::repeat_n(GlickoRating::new(), TRUTH.len()),
        ranker.ledger(),
    )
    .unwrap();

    assert_eq!(replayed.ranking(), ranker.ranking());
    assert_eq!(replayed.records(), ranker.records());
    assert_eq!(replayed.next_comparison().ok(), ranker.next_comparison().ok());
}

#[test]
fn sinks_agree_on_records() {
    let mut ranker = fresh(RankerConfig::default());
    run_loop(&mut ranker, 20);

    let mut memory = MemorySink::default();
    ranker.dump_ratings(&mut memory).unwrap();
    let mut text = TextSink::new(Vec::new());
    ranker.dump_ratings(&mut text).unwrap();
    let mut json = JsonLinesSink::new(Vec::new());
    ranker.dump_ratings(&mut json).unwrap();

    let ids: Vec<usize> = memory.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, ranker.ranking());

    let text = String::from_utf8(text.into_inner()).unwrap();
    let text_ids: Vec<usize> = text
        .lines()
        .map(|line| line.split('\t').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(text_ids, ids);

    let json = String::from_utf8(json.into_inner()).unwrap();
    let parsed: Vec<RatingRecord> = json
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed, memory.records());
}

#[test]
fn tiers_follow_hidden_quality() {
    let mut ranker = fresh(RankerConfig::default());
    run_loop(&mut ranker, 60);

    let tiers = ranker.tiers(3).unwrap();

    assert_eq!(tiers.first().unwrap()[0], 1);
    assert_eq!(*tiers.last().unwrap().last().unwrap(), 4);
    assert_eq!(tiers.iter().map(Vec::len).sum::<usize>(), TRUTH.len());
}

#[test]
fn shared_and_plain_rankers_agree() {
    let shared = SharedRanker::new(fresh(RankerConfig::default()));
    for _ in 0..15 {
        shared
            .compare_next(|id1, id2| Some(oracle(id1, id2)))
            .unwrap();
    }

    let mut plain = fresh(RankerConfig::default());
    run_loop(&mut plain, 15);

    let shared = shared.into_inner().unwrap();
    assert_eq!(shared.records(), plain.records());
}

#[test]
fn scripted_session_then_snapshot() {
    let mut ranker = AdaptiveRanker::default();
    for name in ["rust", "go", "zig"] {
        ranker.add_named_entity(name, 0.0, 350.0);
    }

    let summary = Session::new(&mut ranker, "1\n2\n5\n".as_bytes(), Vec::new())
        .run()
        .unwrap();
    assert_eq!(summary.comparisons, 3);
    assert_eq!(summary.stopped, StopReason::EndOfInput);

    let mut bytes = Vec::new();
    ranker.write_snapshot(&mut bytes).unwrap();
    let restored = AdaptiveRanker::read_snapshot(bytes.as_slice()).unwrap();

    assert_eq!(restored.records(), ranker.records());
    assert_eq!(restored.find_by_name("zig"), Some(2));
    assert_eq!(restored.ledger().len(), 3);
}
