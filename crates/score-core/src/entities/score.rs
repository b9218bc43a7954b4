//! Score rows - running totals derived from the ledger, one per user and
//! one per livestream

use std::ops::Add;

use serde::Serialize;

use crate::entities::{NewComment, NewReaction};
use crate::value_objects::{LivestreamId, UserId};

/// Aggregate row for one user
///
/// Exactly one exists per user, created together with the user. Only the
/// aggregation engine changes it, and only upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserScore {
    pub user_id: UserId,
    pub total_reactions: i64,
    pub total_tip: i64,
    pub total_livecomments: i64,
}

impl UserScore {
    /// A freshly created, all-zero row
    pub const fn zero(user_id: UserId) -> Self {
        Self {
            user_id,
            total_reactions: 0,
            total_tip: 0,
            total_livecomments: 0,
        }
    }

    /// Ranking score: reactions plus tips
    #[inline]
    pub fn score(&self) -> i64 {
        self.total_reactions.saturating_add(self.total_tip)
    }

    /// Row with `delta` added, or `None` on counter overflow
    pub fn checked_apply(&self, delta: ScoreDelta) -> Option<Self> {
        Some(Self {
            user_id: self.user_id,
            total_reactions: self.total_reactions.checked_add(delta.reactions)?,
            total_tip: self.total_tip.checked_add(delta.tip)?,
            total_livecomments: self.total_livecomments.checked_add(delta.livecomments)?,
        })
    }
}

/// Aggregate row for one livestream
///
/// Created together with the livestream and updated in the same transaction
/// as its owner's [`UserScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LivestreamScore {
    pub livestream_id: LivestreamId,
    pub total_reactions: i64,
    pub total_tip: i64,
    pub total_livecomments: i64,
    /// Largest single tip received, 0 without any comment
    pub max_tip: i64,
}

impl LivestreamScore {
    pub const fn zero(livestream_id: LivestreamId) -> Self {
        Self {
            livestream_id,
            total_reactions: 0,
            total_tip: 0,
            total_livecomments: 0,
            max_tip: 0,
        }
    }

    /// Ranking score: reactions plus tips
    #[inline]
    pub fn score(&self) -> i64 {
        self.total_reactions.saturating_add(self.total_tip)
    }

    /// Row with the delta of a single event added, or `None` on overflow.
    /// `max_tip` only tracks correctly when each call carries one event.
    pub fn checked_apply(&self, delta: ScoreDelta) -> Option<Self> {
        Some(Self {
            livestream_id: self.livestream_id,
            total_reactions: self.total_reactions.checked_add(delta.reactions)?,
            total_tip: self.total_tip.checked_add(delta.tip)?,
            total_livecomments: self.total_livecomments.checked_add(delta.livecomments)?,
            max_tip: self.max_tip.max(delta.tip),
        })
    }
}

/// Change applied to a score row by one or more ledger events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreDelta {
    pub reactions: i64,
    pub tip: i64,
    pub livecomments: i64,
}

impl ScoreDelta {
    pub const ZERO: Self = Self {
        reactions: 0,
        tip: 0,
        livecomments: 0,
    };

    /// Delta contributed by one reaction
    pub const fn reaction() -> Self {
        Self {
            reactions: 1,
            tip: 0,
            livecomments: 0,
        }
    }

    /// Delta contributed by one comment carrying `tip`
    pub const fn comment(tip: i64) -> Self {
        Self {
            reactions: 0,
            tip,
            livecomments: 1,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// No component would decrease a counter
    #[inline]
    pub fn is_non_negative(&self) -> bool {
        self.reactions >= 0 && self.tip >= 0 && self.livecomments >= 0
    }
}

impl Add for ScoreDelta {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            reactions: self.reactions.saturating_add(rhs.reactions),
            tip: self.tip.saturating_add(rhs.tip),
            livecomments: self.livecomments.saturating_add(rhs.livecomments),
        }
    }
}

impl From<&NewReaction> for ScoreDelta {
    fn from(_: &NewReaction) -> Self {
        Self::reaction()
    }
}

impl From<&NewComment> for ScoreDelta {
    fn from(comment: &NewComment) -> Self {
        Self::comment(comment.tip())
    }
}
