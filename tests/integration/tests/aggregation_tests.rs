//! Aggregation engine integration tests
//!
//! Run against the in-memory store. The PostgreSQL variants at the bottom
//! additionally need DATABASE_URL and skip otherwise.
//!
//! Run with: cargo test -p integration-tests --test aggregation_tests

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use score_common::AggregationConfig;
use score_core::entities::{ScoreDelta, UserScore};
use score_core::traits::{AggregateStore, UnitOfWork};
use score_core::value_objects::LivestreamId;
use score_db::FaultPoint;
use score_service::{AggregationEngine, ScoreReader, ServiceContext, ScoreStore};

use integration_tests::*;

/// Fire every planned event from its own task and wait for all of them
async fn submit_concurrently<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    streamers: &[score_bench::Streamer],
    events: Vec<PlannedEvent>,
) {
    let streamers: Arc<[score_bench::Streamer]> = streamers.into();
    let handles: Vec<_> = events
        .into_iter()
        .map(|event| {
            let ctx = ctx.clone();
            let streamers = Arc::clone(&streamers);
            tokio::spawn(async move { submit(&ctx, &streamers, &event).await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }
}

// ============================================================================
// Worked Examples
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_five_concurrent_callers() {
    let ctx = memory_context(AggregationConfig::default());
    let streamer = register_streamer(&ctx, "owner").await.unwrap();

    let events = vec![
        PlannedEvent::Reaction { streamer: 0 },
        PlannedEvent::Comment { streamer: 0, tip: 100 },
        PlannedEvent::Reaction { streamer: 0 },
        PlannedEvent::Comment { streamer: 0, tip: 50 },
        PlannedEvent::Reaction { streamer: 0 },
    ];
    submit_concurrently(&ctx, std::slice::from_ref(&streamer), events).await;

    let row = assert_row_matches_ledger(&ctx, &streamer).await.unwrap();
    assert_eq!(row.total_reactions, 3);
    assert_eq!(row.total_tip, 150);
    assert_eq!(row.total_livecomments, 2);
}

#[tokio::test]
async fn test_unknown_livestream_changes_nothing() {
    let ctx = memory_context(AggregationConfig::default());
    let first = register_streamer(&ctx, "first").await.unwrap();
    let second = register_streamer(&ctx, "second").await.unwrap();
    let engine = AggregationEngine::new(&ctx);

    let err = engine
        .append_reaction(LivestreamId::new(9_999), first.user_id, reaction("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.error_code(), "UNKNOWN_LIVESTREAM");

    let err = engine
        .append_comment(LivestreamId::new(9_999), first.user_id, comment("?", 10))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    assert_eq!(ctx.store().reaction_count(), 0);
    assert_eq!(ctx.store().comment_count(), 0);
    for streamer in [&first, &second] {
        assert_eq!(
            ctx.store().read(streamer.user_id).await.unwrap(),
            UserScore::zero(streamer.user_id)
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_two_users_thousand_reactions_each() {
    let ctx = memory_context(AggregationConfig::default());
    let streamers = vec![
        register_streamer(&ctx, "left").await.unwrap(),
        register_streamer(&ctx, "right").await.unwrap(),
    ];

    let events: Vec<_> = (0..2000)
        .map(|i| PlannedEvent::Reaction { streamer: i % 2 })
        .collect();
    submit_concurrently(&ctx, &streamers, events).await;

    for streamer in &streamers {
        let row = assert_row_matches_ledger(&ctx, streamer).await.unwrap();
        assert_eq!(row.total_reactions, 1000);
        assert_eq!(row.total_tip, 0);
        assert_eq!(row.total_livecomments, 0);
    }
}

// ============================================================================
// Commutativity
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_interleavings_match_sequential_totals() {
    for seed in [7_u64, 42, 1_337, 20_240_611] {
        let ctx = memory_context(AggregationConfig::default());
        let mut streamers = Vec::new();
        for _ in 0..3 {
            streamers.push(register_streamer(&ctx, "mix").await.unwrap());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let events: Vec<_> = (0..300)
            .map(|_| {
                let streamer = rng.gen_range(0..streamers.len());
                if rng.gen_bool(0.4) {
                    PlannedEvent::Comment {
                        streamer,
                        tip: rng.gen_range(0..=500),
                    }
                } else {
                    PlannedEvent::Reaction { streamer }
                }
            })
            .collect();

        // Random start delays shuffle the commit order
        let shared: Arc<[score_bench::Streamer]> = streamers.clone().into();
        let handles: Vec<_> = events
            .iter()
            .cloned()
            .map(|event| {
                let ctx = ctx.clone();
                let shared = Arc::clone(&shared);
                let delay = Duration::from_micros(rng.gen_range(0..2_000));
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    submit(&ctx, &shared, &event).await
                })
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }

        for (index, streamer) in streamers.iter().enumerate() {
            let row = assert_row_matches_ledger(&ctx, streamer).await.unwrap();
            assert_eq!(
                row,
                sequential_totals(streamer, index, &events),
                "seed {seed}, streamer {index}"
            );
        }
    }
}

// ============================================================================
// Atomicity
// ============================================================================

#[tokio::test]
async fn test_fault_between_append_and_delta_leaves_no_trace() {
    let ctx = memory_context(AggregationConfig::default());
    let streamer = register_streamer(&ctx, "faulty").await.unwrap();
    let engine = AggregationEngine::new(&ctx);

    for point in [FaultPoint::ApplyDelta, FaultPoint::Commit] {
        ctx.store().faults().arm(point, 1);

        let err = engine
            .append_comment(streamer.livestream_id, streamer.user_id, comment("tip", 75))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INJECTED_FAULT", "{point:?}");

        assert_eq!(ctx.store().comment_count(), 0, "{point:?}");
        assert_eq!(
            ctx.store().read(streamer.user_id).await.unwrap(),
            UserScore::zero(streamer.user_id),
            "{point:?}"
        );
    }

    // The store is healthy afterwards
    engine
        .append_comment(streamer.livestream_id, streamer.user_id, comment("tip", 75))
        .await
        .unwrap();
    let row = assert_row_matches_ledger(&ctx, &streamer).await.unwrap();
    assert_eq!(row.total_tip, 75);
}

#[tokio::test]
async fn test_ensure_row_never_resets() {
    let ctx = memory_context(AggregationConfig::default());
    let streamer = register_streamer(&ctx, "steady").await.unwrap();
    let engine = AggregationEngine::new(&ctx);

    engine
        .append_reaction(streamer.livestream_id, streamer.user_id, reaction("fire"))
        .await
        .unwrap();

    let store = ctx.store();
    for _ in 0..2 {
        let mut tx = store.begin().await.unwrap();
        let row = store.ensure_row(&mut tx, streamer.user_id).await.unwrap();
        assert_eq!(row.total_reactions, 1);
        store.commit(tx).await.unwrap();
    }

    assert_eq!(store.read(streamer.user_id).await.unwrap().total_reactions, 1);
}

// ============================================================================
// Cancellation and Contention
// ============================================================================

#[tokio::test]
async fn test_cancelled_append_has_no_effect() {
    let ctx = memory_context(AggregationConfig::default());
    let streamer = register_streamer(&ctx, "cancel").await.unwrap();
    let store = ctx.store();

    // Hold the row so the append parks on the lock
    let mut holder = store.begin().await.unwrap();
    store
        .apply_delta(&mut holder, streamer.user_id, ScoreDelta::reaction())
        .await
        .unwrap();

    let engine = AggregationEngine::new(&ctx);
    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        engine.append_reaction(streamer.livestream_id, streamer.user_id, reaction("late")),
    )
    .await;
    assert!(outcome.is_err(), "append should still be waiting on the row");

    store.rollback(holder).await.unwrap();

    assert_eq!(store.reaction_count(), 0);
    assert_eq!(
        store.read(streamer.user_id).await.unwrap(),
        UserScore::zero(streamer.user_id)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_aborted_writers_never_leave_partial_state() {
    let ctx = memory_context(AggregationConfig::default());
    let streamer = register_streamer(&ctx, "abort").await.unwrap();
    let streamers: Arc<[score_bench::Streamer]> = vec![streamer.clone()].into();

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let ctx = ctx.clone();
            let streamers = Arc::clone(&streamers);
            let event = if i % 3 == 0 {
                PlannedEvent::Comment { streamer: 0, tip: 10 }
            } else {
                PlannedEvent::Reaction { streamer: 0 }
            };
            tokio::spawn(async move { submit(&ctx, &streamers, &event).await })
        })
        .collect();

    // Abort every other task wherever it happens to be
    for handle in handles.iter().step_by(2) {
        handle.abort();
    }
    for handle in handles {
        if let Ok(result) = handle.await {
            result.unwrap();
        }
    }

    assert_row_matches_ledger(&ctx, &streamer).await.unwrap();
}

#[tokio::test]
async fn test_contention_is_retried_until_the_row_frees_up() {
    let ctx = memory_context(fast_retry(5, 20));
    let streamer = register_streamer(&ctx, "hot").await.unwrap();
    let store = ctx.store_handle();

    let mut holder = store.begin().await.unwrap();
    store
        .apply_delta(&mut holder, streamer.user_id, ScoreDelta::reaction())
        .await
        .unwrap();
    let release = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        store.commit(holder).await.unwrap();
    });

    AggregationEngine::new(&ctx)
        .append_reaction(streamer.livestream_id, streamer.user_id, reaction("wait"))
        .await
        .unwrap();
    release.await.unwrap();

    let row = ctx.store().read(streamer.user_id).await.unwrap();
    assert_eq!(row.total_reactions, 2);
    // The holder's delta had no ledger entry of its own
    assert_eq!(ctx.store().reaction_count(), 1);
}

#[tokio::test]
async fn test_contention_surfaces_when_attempts_run_out() {
    let ctx = memory_context(fast_retry(1, 20));
    let streamer = register_streamer(&ctx, "busy").await.unwrap();
    let store = ctx.store();

    let mut holder = store.begin().await.unwrap();
    store
        .apply_delta(&mut holder, streamer.user_id, ScoreDelta::reaction())
        .await
        .unwrap();

    let err = AggregationEngine::new(&ctx)
        .append_reaction(streamer.livestream_id, streamer.user_id, reaction("nope"))
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.status_code(), 503);
    assert_eq!(store.reaction_count(), 0);

    store.rollback(holder).await.unwrap();
    assert_eq!(
        store.read(streamer.user_id).await.unwrap(),
        UserScore::zero(streamer.user_id)
    );
}

#[tokio::test]
async fn test_other_users_are_not_blocked_by_a_held_row() {
    let ctx = memory_context(fast_retry(1, 20));
    let busy = register_streamer(&ctx, "busy").await.unwrap();
    let free = register_streamer(&ctx, "free").await.unwrap();
    let store = ctx.store();

    let mut holder = store.begin().await.unwrap();
    store
        .apply_delta(&mut holder, busy.user_id, ScoreDelta::reaction())
        .await
        .unwrap();

    // One attempt and a short lock timeout: any waiting would fail this
    AggregationEngine::new(&ctx)
        .append_reaction(free.livestream_id, busy.user_id, reaction("ok"))
        .await
        .unwrap();
    assert_eq!(store.read(free.user_id).await.unwrap().total_reactions, 1);

    store.commit(holder).await.unwrap();
}

// ============================================================================
// Score Reader
// ============================================================================

#[tokio::test]
async fn test_statistics_rank_and_payment() {
    let ctx = memory_context(AggregationConfig::default());
    let low = register_streamer(&ctx, "low").await.unwrap();
    let high = register_streamer(&ctx, "high").await.unwrap();
    let idle = register_streamer(&ctx, "idle").await.unwrap();
    let engine = AggregationEngine::new(&ctx);

    engine
        .append_reaction(low.livestream_id, high.user_id, reaction("clap"))
        .await
        .unwrap();
    engine
        .append_comment(high.livestream_id, low.user_id, comment("take it", 200))
        .await
        .unwrap();
    engine
        .append_comment(high.livestream_id, idle.user_id, comment("me too", 0))
        .await
        .unwrap();

    let reader = ScoreReader::new(&ctx);
    let high_stats = reader.user_statistics(&high.name).await.unwrap();
    assert_eq!(high_stats.rank, 1);
    assert_eq!(high_stats.total_tip, 200);
    assert_eq!(high_stats.total_livecomments, 2);

    let low_stats = reader.user_statistics(&low.name).await.unwrap();
    assert_eq!(low_stats.rank, 2);
    assert_eq!(low_stats.total_reactions, 1);

    assert_eq!(reader.user_statistics(&idle.name).await.unwrap().rank, 3);
    assert_eq!(reader.payment_result().await.unwrap().total_tip, 200);

    let score = reader.read_aggregate(high.user_id).await.unwrap();
    assert_eq!(score.total_tip, 200);
    assert_eq!(score.total_reactions, 0);

    let live = reader.livestream_statistics(high.livestream_id).await.unwrap();
    assert_eq!(live.rank, 1);
    assert_eq!(live.total_tip, 200);
    assert_eq!(live.max_tip, 200);
    assert_eq!(live.total_livecomments, 2);
    assert_eq!(reader.livestream_statistics(low.livestream_id).await.unwrap().rank, 2);
    assert_eq!(reader.livestream_statistics(idle.livestream_id).await.unwrap().rank, 3);
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_five_concurrent_callers() {
    let Some(ctx) = postgres_context(AggregationConfig::default()).await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let streamer = register_streamer(&ctx, "pg_owner").await.unwrap();

    let events = vec![
        PlannedEvent::Reaction { streamer: 0 },
        PlannedEvent::Comment { streamer: 0, tip: 100 },
        PlannedEvent::Reaction { streamer: 0 },
        PlannedEvent::Comment { streamer: 0, tip: 50 },
        PlannedEvent::Reaction { streamer: 0 },
    ];
    submit_concurrently(&ctx, std::slice::from_ref(&streamer), events).await;

    let row = assert_row_matches_ledger(&ctx, &streamer).await.unwrap();
    assert_eq!(row.total_reactions, 3);
    assert_eq!(row.total_tip, 150);
    assert_eq!(row.total_livecomments, 2);
}

#[tokio::test]
async fn test_postgres_unknown_livestream_appends_nothing() {
    let Some(ctx) = postgres_context(AggregationConfig::default()).await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let streamer = register_streamer(&ctx, "pg_lonely").await.unwrap();

    let err = AggregationEngine::new(&ctx)
        .append_reaction(LivestreamId::new(i64::MAX), streamer.user_id, reaction("x"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    let row = assert_row_matches_ledger(&ctx, &streamer).await.unwrap();
    assert_eq!(row, UserScore::zero(streamer.user_id));
}
