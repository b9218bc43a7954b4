//! Test helpers for integration tests
//!
//! Builds service contexts over the in-memory or PostgreSQL store, seeds
//! streamers through the public services, and checks score rows against
//! the ledger.

use std::sync::Arc;

use anyhow::Result;
use score_bench::{derive_from_ledger, derive_livestream_from_ledger, Streamer};
use score_common::AggregationConfig;
use score_core::entities::UserScore;
use score_core::traits::{AggregateStore, LivestreamAggregateStore};
use score_db::{create_pool, run_migrations, DatabaseConfig, MemoryStore, PgStore};
use score_service::dto::CreateLivestreamRequest;
use score_service::{
    AggregationEngine, LivestreamService, ScoreStore, ServiceContext, UserService,
};

use crate::fixtures::{comment, reaction, unique_user, PlannedEvent};

/// Context over a fresh in-memory store
pub fn memory_context(config: AggregationConfig) -> ServiceContext<MemoryStore> {
    let store = MemoryStore::with_lock_timeout(config.lock_timeout());
    ServiceContext::new(Arc::new(store), config)
}

/// Context over PostgreSQL, or `None` when DATABASE_URL is not set
pub async fn postgres_context(config: AggregationConfig) -> Option<ServiceContext<PgStore>> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL").ok()?;

    let pool = create_pool(&DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    })
    .await
    .ok()?;
    run_migrations(&pool).await.ok()?;

    let store = PgStore::new(pool).with_lock_timeout(config.lock_timeout());
    Some(ServiceContext::new(Arc::new(store), config))
}

/// Register a user with one livestream
pub async fn register_streamer<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    prefix: &str,
) -> Result<Streamer> {
    let user = UserService::new(ctx).register(unique_user(prefix)).await?;
    let livestream = LivestreamService::new(ctx)
        .create(
            user.id,
            CreateLivestreamRequest {
                title: format!("{} live", user.name),
            },
        )
        .await?;
    Ok(Streamer {
        user_id: user.id,
        name: user.name,
        livestream_id: livestream.id,
    })
}

/// Submit one planned event through the engine
pub async fn submit<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    streamers: &[Streamer],
    event: &PlannedEvent,
) -> Result<()> {
    let engine = AggregationEngine::new(ctx);
    let target = &streamers[event.streamer()];
    match event {
        PlannedEvent::Reaction { .. } => {
            engine
                .append_reaction(target.livestream_id, target.user_id, reaction("heart"))
                .await?;
        }
        PlannedEvent::Comment { tip, .. } => {
            engine
                .append_comment(target.livestream_id, target.user_id, comment("gg", *tip))
                .await?;
        }
    }
    Ok(())
}

/// Totals a streamer should have after `events`, applied one by one
pub fn sequential_totals(streamer: &Streamer, index: usize, events: &[PlannedEvent]) -> UserScore {
    let mut expected = UserScore::zero(streamer.user_id);
    for event in events.iter().filter(|event| event.streamer() == index) {
        match event {
            PlannedEvent::Reaction { .. } => expected.total_reactions += 1,
            PlannedEvent::Comment { tip, .. } => {
                expected.total_livecomments += 1;
                expected.total_tip += tip;
            }
        }
    }
    expected
}

/// Assert the committed user and livestream rows equal a fresh scan of the
/// streamer's ledger; returns the user row
pub async fn assert_row_matches_ledger<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    streamer: &Streamer,
) -> Result<UserScore> {
    let stored = ctx.store().read(streamer.user_id).await?;
    let derived = derive_from_ledger(ctx, streamer.user_id).await?;
    anyhow::ensure!(
        stored == derived,
        "{}: row {stored:?} != ledger {derived:?}",
        streamer.name
    );

    let livestream = ctx.store().read_livestream(streamer.livestream_id).await?;
    let derived = derive_livestream_from_ledger(ctx, streamer.livestream_id).await?;
    anyhow::ensure!(
        livestream == derived,
        "{}: livestream row {livestream:?} != ledger {derived:?}",
        streamer.name
    );
    Ok(stored)
}
