//! Database models - SQLx-compatible structs for PostgreSQL tables

mod comment;
mod livestream;
mod reaction;
mod score;
mod user;

pub use comment::CommentModel;
pub use livestream::LivestreamModel;
pub use reaction::ReactionModel;
pub use score::{LivestreamScoreModel, UserScoreModel};
pub use user::UserModel;
