//! Domain entities - core business objects

mod comment;
mod livestream;
mod reaction;
mod score;
mod user;

pub use comment::{CommentEvent, NewComment};
pub use livestream::{Livestream, NewLivestream};
pub use reaction::{NewReaction, ReactionEvent};
pub use score::{LivestreamScore, ScoreDelta, UserScore};
pub use user::{NewUser, User};
