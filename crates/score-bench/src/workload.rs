//! Streamer setup and the concurrent writers

use std::sync::Arc;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use score_core::value_objects::{LivestreamId, UserId};
use score_service::dto::{
    CreateLivestreamRequest, PostCommentRequest, PostReactionRequest, RegisterUserRequest,
};
use score_service::{
    AggregationEngine, LivestreamService, ScoreStore, ServiceContext, ServiceResult, UserService,
};

use crate::config::BenchConfig;

const EMOJIS: [&str; 6] = ["innocent", "tada", "heart", "fire", "clap", "joy"];

/// A registered user with one livestream
#[derive(Debug, Clone)]
pub struct Streamer {
    pub user_id: UserId,
    pub name: String,
    pub livestream_id: LivestreamId,
}

/// Per-writer outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterTally {
    pub committed: u64,
    /// Appends that still hit contention after every retry
    pub rejected: u64,
}

impl std::ops::AddAssign for WriterTally {
    fn add_assign(&mut self, other: Self) {
        self.committed += other.committed;
        self.rejected += other.rejected;
    }
}

/// Register `count` streamers, each with one livestream. Names carry a
/// random run tag so repeated runs against one database do not collide.
pub async fn register_streamers<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    count: usize,
) -> ServiceResult<Vec<Streamer>> {
    let run_tag: u32 = rand::random();
    let mut streamers = Vec::with_capacity(count);

    for i in 0..count {
        let user = UserService::new(ctx)
            .register(RegisterUserRequest {
                name: format!("bench_{run_tag:08x}_{i}"),
                display_name: format!("Streamer {i}"),
            })
            .await?;
        let livestream = LivestreamService::new(ctx)
            .create(
                user.id,
                CreateLivestreamRequest {
                    title: format!("{} live", user.display_name),
                },
            )
            .await?;
        streamers.push(Streamer {
            user_id: user.id,
            name: user.name,
            livestream_id: livestream.id,
        });
    }

    info!(count, "Streamers registered");
    Ok(streamers)
}

/// Spawn `bench.writers` tasks that each submit `bench.events_per_writer`
/// random events against random streamers
pub async fn run_writers<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    streamers: &[Streamer],
    bench: &BenchConfig,
) -> anyhow::Result<WriterTally> {
    if streamers.is_empty() {
        anyhow::bail!("no streamers to write to");
    }
    let streamers: Arc<[Streamer]> = streamers.into();

    let handles: Vec<_> = (0..bench.writers)
        .map(|writer| {
            let ctx = ctx.clone();
            let streamers = Arc::clone(&streamers);
            let bench = bench.clone();
            tokio::spawn(async move { write_events(&ctx, &streamers, &bench, writer).await })
        })
        .collect();

    let mut tally = WriterTally::default();
    for joined in futures::future::join_all(handles).await {
        tally += joined.context("writer task panicked")??;
    }

    info!(
        committed = tally.committed,
        rejected = tally.rejected,
        "Writers finished"
    );
    Ok(tally)
}

async fn write_events<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    streamers: &[Streamer],
    bench: &BenchConfig,
    writer: usize,
) -> anyhow::Result<WriterTally> {
    let mut rng = StdRng::from_entropy();
    let engine = AggregationEngine::new(ctx);
    let mut tally = WriterTally::default();

    for _ in 0..bench.events_per_writer {
        let target = &streamers[rng.gen_range(0..streamers.len())];
        let actor = streamers[rng.gen_range(0..streamers.len())].user_id;

        let result = if rng.gen_range(0..100u8) < bench.comment_percent {
            let tip = rng.gen_range(0..=bench.max_tip);
            engine
                .append_comment(
                    target.livestream_id,
                    actor,
                    PostCommentRequest {
                        comment: format!("writer {writer} cheering"),
                        tip,
                    },
                )
                .await
                .map(|_| ())
        } else {
            let emoji = EMOJIS[rng.gen_range(0..EMOJIS.len())];
            engine
                .append_reaction(
                    target.livestream_id,
                    actor,
                    PostReactionRequest {
                        emoji_name: emoji.to_string(),
                    },
                )
                .await
                .map(|_| ())
        };

        match result {
            Ok(()) => tally.committed += 1,
            Err(e) if e.is_transient() => {
                warn!(writer, streamer = %target.name, error = %e, "Append gave up on contention");
                tally.rejected += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("writer {writer} failed")),
        }
    }

    debug!(writer, committed = tally.committed, "Writer done");
    Ok(tally)
}
