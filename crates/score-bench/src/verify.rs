//! Re-derive every streamer's totals from the ledger and compare them with
//! the score rows

use std::fmt;

use score_core::entities::{LivestreamScore, UserScore};
use score_core::value_objects::{LivestreamId, UserId};
use score_service::{ScoreStore, ServiceContext, ServiceResult};

use crate::workload::Streamer;

/// A score row that disagrees with the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    User {
        user_id: UserId,
        name: String,
        derived: UserScore,
        stored: UserScore,
    },
    Livestream {
        livestream_id: LivestreamId,
        owner: String,
        derived: LivestreamScore,
        stored: LivestreamScore,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User {
                user_id,
                name,
                derived,
                stored,
            } => write!(
                f,
                "{name} ({user_id}): ledger gives reactions={} tip={} comments={}, row has reactions={} tip={} comments={}",
                derived.total_reactions,
                derived.total_tip,
                derived.total_livecomments,
                stored.total_reactions,
                stored.total_tip,
                stored.total_livecomments,
            ),
            Self::Livestream {
                livestream_id,
                owner,
                derived,
                stored,
            } => write!(
                f,
                "livestream {livestream_id} of {owner}: ledger gives reactions={} tip={} comments={} max_tip={}, row has reactions={} tip={} comments={} max_tip={}",
                derived.total_reactions,
                derived.total_tip,
                derived.total_livecomments,
                derived.max_tip,
                stored.total_reactions,
                stored.total_tip,
                stored.total_livecomments,
                stored.max_tip,
            ),
        }
    }
}

/// Totals for `user_id` computed by scanning the events on every livestream
/// it owns
pub async fn derive_from_ledger<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    user_id: UserId,
) -> ServiceResult<UserScore> {
    let store = ctx.store();
    let mut derived = UserScore::zero(user_id);

    for livestream in store.find_by_owner(user_id).await? {
        let reactions = store.reactions_by_livestream(livestream.id).await?;
        let comments = store.comments_by_livestream(livestream.id).await?;

        derived.total_reactions += reactions.len() as i64;
        derived.total_livecomments += comments.len() as i64;
        derived.total_tip += comments.iter().map(|comment| comment.tip).sum::<i64>();
    }
    Ok(derived)
}

/// Totals for one livestream computed by scanning its events
pub async fn derive_livestream_from_ledger<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    livestream_id: LivestreamId,
) -> ServiceResult<LivestreamScore> {
    let store = ctx.store();
    let mut derived = LivestreamScore::zero(livestream_id);

    derived.total_reactions = store.reactions_by_livestream(livestream_id).await?.len() as i64;
    for comment in store.comments_by_livestream(livestream_id).await? {
        derived.total_livecomments += 1;
        derived.total_tip += comment.tip;
        derived.max_tip = derived.max_tip.max(comment.tip);
    }
    Ok(derived)
}

/// Every user or livestream row of the given streamers that differs from
/// the ledger
pub async fn verify_totals<S: ScoreStore>(
    ctx: &ServiceContext<S>,
    streamers: &[Streamer],
) -> ServiceResult<Vec<Mismatch>> {
    let store = ctx.store();
    let mut mismatches = Vec::new();
    for streamer in streamers {
        let derived = derive_from_ledger(ctx, streamer.user_id).await?;
        let stored = store.read(streamer.user_id).await?;
        if derived != stored {
            mismatches.push(Mismatch::User {
                user_id: streamer.user_id,
                name: streamer.name.clone(),
                derived,
                stored,
            });
        }

        let derived = derive_livestream_from_ledger(ctx, streamer.livestream_id).await?;
        let stored = store.read_livestream(streamer.livestream_id).await?;
        if derived != stored {
            mismatches.push(Mismatch::Livestream {
                livestream_id: streamer.livestream_id,
                owner: streamer.name.clone(),
                derived,
                stored,
            });
        }
    }
    Ok(mismatches)
}
