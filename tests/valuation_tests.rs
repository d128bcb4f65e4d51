use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use valuator::adapter::outbound::memory::{FailPoint, MemoryStore};
use valuator::adapter::outbound::solver::LuSolver;
use valuator::application::valuation::{ValuationParams, ValuationService};
use valuator::domain::{DomainError, LeaderQuote, OwnershipEdge, Participant, PricingParams};
use valuator::error::{Error, FailureKind};
use valuator::port::{NotifierRegistry, RecomputeValuations};
use valuator::testkit::config::{parallel_params, sequential_params};
use valuator::testkit::domain::{edge, follower, instrument, leader, many_pairs, mutual_pair, pid};
use valuator::testkit::notifier::RecordingNotifier;

fn service_with_solver(
    participants: Vec<Participant>,
    edges: Vec<OwnershipEdge>,
    params: ValuationParams,
    solver: LuSolver,
) -> (ValuationService<MemoryStore>, Arc<MemoryStore>, RecordingNotifier) {
    let store = Arc::new(MemoryStore::new(participants, edges));
    let recorder = RecordingNotifier::new();
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(recorder.clone()));
    let service = ValuationService::new(
        Arc::clone(&store),
        Arc::new(solver),
        Arc::new(registry),
        params,
    );
    (service, store, recorder)
}

fn service_with(
    participants: Vec<Participant>,
    edges: Vec<OwnershipEdge>,
    params: ValuationParams,
) -> (ValuationService<MemoryStore>, Arc<MemoryStore>, RecordingNotifier) {
    service_with_solver(participants, edges, params, LuSolver::default())
}

fn prior_quotes() -> Vec<LeaderQuote> {
    let pricing = PricingParams::default();
    vec![
        pricing
            .quote(pid(1), instrument(1), dec!(1500000), dec!(1500000))
            .unwrap(),
        pricing
            .quote(pid(2), instrument(2), dec!(2500000), dec!(2600000))
            .unwrap(),
    ]
}

fn service(
    participants: Vec<Participant>,
    edges: Vec<OwnershipEdge>,
) -> (ValuationService<MemoryStore>, Arc<MemoryStore>, RecordingNotifier) {
    service_with(participants, edges, sequential_params())
}

fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() <= dec!(0.000001),
        "expected {expected}, got {actual}"
    );
}

#[test]
fn isolated_participant_is_valued_at_its_base() {
    let p = Participant::new(pid(7))
        .with_cash(dec!(1000))
        .with_provision(dec!(200))
        .with_external(dec!(500), dec!(600));
    let (service, store, _) = service(vec![p], vec![]);

    service.recompute_now().unwrap();

    let v = store.valuation(pid(7)).unwrap();
    assert_eq!(v.net_worth_bid, dec!(1300));
    assert_eq!(v.net_worth_ask, dec!(1400));
    assert_eq!(v.gross_total_value, dec!(1500));
}

#[test]
fn acyclic_holding_substitutes_leader_net_worth() {
    let (service, store, _) = service(
        vec![follower(1, dec!(1000)), leader(2, dec!(2000000))],
        vec![edge(1, 2, dec!(10))],
    );

    service.recompute_now().unwrap();

    let leader_worth = store.valuation(pid(2)).unwrap().net_worth_bid;
    assert_close(leader_worth, dec!(2000000));
    assert_close(
        store.valuation(pid(1)).unwrap().net_worth_bid,
        dec!(1000) + dec!(0.1) * leader_worth,
    );
}

#[test]
fn mutual_holdings_solve_as_one_system() {
    let (participants, edges) = mutual_pair();
    let (service, store, _) = service(participants, edges);

    let report = service.recompute_now().unwrap();

    assert_eq!(report.components, 1);
    assert_eq!(report.largest_component, 2);
    let a = store.valuation(pid(1)).unwrap().net_worth_bid;
    let b = store.valuation(pid(2)).unwrap().net_worth_bid;
    assert_eq!(a.round(), dec!(1224490));
    assert_eq!(b.round(), dec!(2244898));
    // The defining equations hold.
    assert_close(a, dec!(1000000) + dec!(0.1) * b);
    assert_close(b, dec!(2000000) + dec!(0.2) * a);

    let quote = store.quote(instrument(1)).unwrap();
    assert_eq!(quote.bid_price.round_dp(2), dec!(12244.90));
    assert!(quote.is_tradable());
}

#[test]
fn duplicate_edges_accumulate() {
    let split = service(
        vec![follower(1, dec!(0)), leader(2, dec!(1000000))],
        vec![edge(1, 2, dec!(4)), edge(1, 2, dec!(6))],
    );
    let whole = service(
        vec![follower(1, dec!(0)), leader(2, dec!(1000000))],
        vec![edge(1, 2, dec!(10))],
    );

    split.0.recompute_now().unwrap();
    whole.0.recompute_now().unwrap();

    assert_close(
        split.1.valuation(pid(1)).unwrap().net_worth_bid,
        whole.1.valuation(pid(1)).unwrap().net_worth_bid,
    );
}

#[test]
fn fully_claimed_cycle_aborts_and_keeps_prior_prices() {
    let prior = PricingParams::default()
        .quote(pid(1), instrument(1), dec!(1500000), dec!(1500000))
        .unwrap();
    let (service, store, recorder) = service(
        vec![
            leader(1, dec!(1000000)),
            leader(2, dec!(2000000)),
            leader(3, dec!(3000000)),
        ],
        vec![edge(1, 2, dec!(100)), edge(2, 1, dec!(100))],
    );
    store.seed_quote(prior.clone());

    let err = service.recompute_now().unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::Numerical);
    assert_eq!(err.participants(), vec![pid(1), pid(2)]);
    assert_eq!(store.quotes(), vec![prior]);
    assert!(store.valuations().is_empty());
    assert!(recorder.changed().is_empty());
    let failures = recorder.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::Numerical);
    assert_eq!(failures[0].participants, vec![pid(1), pid(2)]);
}

#[test]
fn uneven_singular_pair_aborts_and_keeps_prior_prices() {
    // (50 / 100) · (200 / 100) = 1: the pair claims all of its own value.
    let (service, store, recorder) = service(
        vec![leader(1, dec!(1000000)), leader(2, dec!(2000000))],
        vec![edge(1, 2, dec!(50)), edge(2, 1, dec!(200))],
    );
    for quote in prior_quotes() {
        store.seed_quote(quote);
    }

    let err = service.recompute_now().unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::Numerical);
    assert_eq!(err.participants(), vec![pid(1), pid(2)]);
    assert_eq!(store.quotes(), prior_quotes());
    assert!(store.valuations().is_empty());
    assert!(recorder.changed().is_empty());
    assert_eq!(recorder.failures()[0].participants, vec![pid(1), pid(2)]);
}

#[test]
fn nearly_singular_pair_is_judged_by_relative_tolerance() {
    // The claim product is 1.0000000000002, off by far less than the default
    // tolerance but far more than 1e-15.
    let participants = vec![leader(1, dec!(1000000)), leader(2, dec!(2000000))];
    let edges = vec![edge(1, 2, dec!(50.00000000001)), edge(2, 1, dec!(200))];

    let (loose, loose_store, _) = service_with_solver(
        participants.clone(),
        edges.clone(),
        sequential_params(),
        LuSolver::default(),
    );
    for quote in prior_quotes() {
        loose_store.seed_quote(quote);
    }
    let err = loose.recompute_now().unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::Numerical);
    assert_eq!(loose_store.quotes(), prior_quotes());

    let (strict, strict_store, _) = service_with_solver(
        participants,
        edges,
        sequential_params(),
        LuSolver::new(1e-15),
    );
    strict.recompute_now().unwrap();
    assert_eq!(strict_store.valuations().len(), 2);
}

#[test]
fn unrepresentable_price_fails_the_pass() {
    let params = ValuationParams {
        pricing: PricingParams {
            price_scale: dec!(0.001),
            ..PricingParams::default()
        },
        ..sequential_params()
    };
    let (service, store, recorder) = service_with(
        vec![leader(1, dec!(1000000000000000000000000000))],
        vec![],
        params,
    );

    let err = service.recompute_now().unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::Numerical);
    assert_eq!(err.participants(), vec![pid(1)]);
    assert!(store.quotes().is_empty());
    assert!(recorder.changed().is_empty());
    assert_eq!(recorder.failures().len(), 1);
    assert_eq!(recorder.failures()[0].kind, FailureKind::Numerical);
}

#[test]
fn volume_is_gated_by_the_ask_floor() {
    let (service, store, _) = service(
        vec![leader(1, dec!(999999)), leader(2, dec!(1000000))],
        vec![],
    );

    let report = service.recompute_now().unwrap();

    let below = store.quote(instrument(1)).unwrap();
    assert_eq!(below.bid_price, dec!(9999.99));
    assert_eq!(below.ask_price, dec!(10000));
    assert_eq!(below.tradable_volume, Decimal::ZERO);

    let at = store.quote(instrument(2)).unwrap();
    assert_eq!(at.bid_price, dec!(10000));
    assert_eq!(at.tradable_volume, dec!(100000000));
    assert_eq!(report.halted_instruments, 1);
}

#[test]
fn repeated_passes_produce_identical_values() {
    let (participants, edges) = many_pairs(5, 3);
    let (service, store, _) = service(participants, edges);

    service.recompute_now().unwrap();
    let (first_valuations, first_quotes) = (store.valuations(), store.quotes());
    service.recompute_now().unwrap();

    assert_eq!(store.valuations(), first_valuations);
    assert_eq!(store.quotes(), first_quotes);
    assert_eq!(store.committed_passes(), 2);
}

#[test]
fn parallel_fan_out_matches_sequential_solve() {
    let (participants, edges) = many_pairs(60, 40);
    let (sequential, seq_store, seq_events) =
        service_with(participants.clone(), edges.clone(), sequential_params());
    let (parallel, par_store, par_events) = service_with(participants, edges, parallel_params(4));

    let seq_report = sequential.recompute_now().unwrap();
    let par_report = parallel.recompute_now().unwrap();

    assert_eq!(seq_report.components, 100);
    assert_eq!(seq_report.components, par_report.components);
    assert_eq!(seq_store.valuations(), par_store.valuations());
    assert_eq!(seq_store.quotes(), par_store.quotes());
    assert_eq!(seq_events.changed_leaders(), par_events.changed_leaders());
}

#[test]
fn notifications_follow_commit_in_leader_order() {
    let (participants, edges) = many_pairs(3, 2);
    let (service, _, recorder) = service(participants, edges);

    let report = service.recompute_now().unwrap();

    let leaders = recorder.changed_leaders();
    assert_eq!(leaders.len(), report.leaders);
    assert_eq!(leaders, (1..=6).map(pid).collect::<Vec<_>>());
    assert!(recorder.failures().is_empty());
    let valued_at = report.valued_at.unwrap();
    assert!(recorder.changed().iter().all(|c| c.valued_at == valued_at));
}

#[test]
fn edge_to_unknown_participant_is_data_inconsistency() {
    let (service, store, recorder) = service(
        vec![follower(1, dec!(10))],
        vec![edge(1, 9, dec!(5))],
    );

    let err = service.recompute_now().unwrap_err();

    assert!(matches!(
        err,
        Error::Domain(DomainError::UnknownParticipant { missing, .. }) if missing == pid(9)
    ));
    assert_eq!(err.failure_kind(), FailureKind::DataInconsistency);
    assert!(store.valuations().is_empty());
    assert_eq!(recorder.failures().len(), 1);
}

#[test]
fn edge_to_non_leader_is_data_inconsistency() {
    let (service, store, _) = service(
        vec![follower(1, dec!(10)), follower(2, dec!(10))],
        vec![edge(1, 2, dec!(5))],
    );

    let err = service.recompute_now().unwrap_err();

    assert!(matches!(err, Error::Domain(DomainError::NotALeader { .. })));
    assert!(store.valuations().is_empty());
}

#[test]
fn empty_economy_is_a_silent_no_op() {
    let (service, store, recorder) = service(vec![], vec![]);

    let report = service.recompute_now().unwrap();

    assert!(report.is_empty());
    assert!(report.valued_at.is_none());
    assert!(store.last_valued_at().is_none());
    assert!(recorder.events().is_empty());
}

#[test]
fn injected_write_failure_leaves_store_untouched() {
    let (participants, edges) = mutual_pair();
    let (service, store, recorder) = service(participants, edges);
    service.recompute_now().unwrap();
    let (valuations, quotes) = (store.valuations(), store.quotes());
    let stamp = store.last_valued_at();
    recorder.clear();

    store.replace_holdings(
        vec![leader(1, dec!(5000000)), leader(2, dec!(5000000))],
        vec![edge(1, 2, dec!(10))],
    );
    store.fail_next(FailPoint::Apply);
    let err = service.recompute_now().unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::Storage);
    assert_eq!(store.valuations(), valuations);
    assert_eq!(store.quotes(), quotes);
    assert_eq!(store.last_valued_at(), stamp);
    assert!(recorder.changed().is_empty());
    assert_eq!(recorder.failures().len(), 1);
}

#[test]
fn commit_failure_emits_no_valuation_events() {
    let (participants, edges) = mutual_pair();
    let (service, store, recorder) = service(participants, edges);
    store.fail_next(FailPoint::Commit);

    assert!(service.recompute_now().is_err());

    assert!(store.quotes().is_empty());
    assert!(recorder.changed().is_empty());
    assert_eq!(recorder.failures()[0].kind, FailureKind::Storage);
}

#[test]
fn leader_value_share_scales_claims() {
    let params = ValuationParams {
        leader_value_share: 1000.0,
        ..sequential_params()
    };
    let (service, store, _) = service_with(
        vec![follower(1, dec!(0)), leader(2, dec!(1000000))],
        vec![edge(1, 2, dec!(10))],
        params,
    );

    service.recompute_now().unwrap();

    assert_close(store.valuation(pid(1)).unwrap().net_worth_bid, dec!(10000));
}
