//! Score row models -> entity mappers

use score_core::entities::{LivestreamScore, UserScore};
use score_core::value_objects::{LivestreamId, UserId};

use crate::models::{LivestreamScoreModel, UserScoreModel};

impl From<UserScoreModel> for UserScore {
    fn from(model: UserScoreModel) -> Self {
        UserScore {
            user_id: UserId::new(model.user_id),
            total_reactions: model.total_reactions,
            total_tip: model.total_tip,
            total_livecomments: model.total_livecomments,
        }
    }
}

impl From<LivestreamScoreModel> for LivestreamScore {
    fn from(model: LivestreamScoreModel) -> Self {
        LivestreamScore {
            livestream_id: LivestreamId::new(model.livestream_id),
            total_reactions: model.total_reactions,
            total_tip: model.total_tip,
            total_livecomments: model.total_livecomments,
            max_tip: model.max_tip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_model_mapping() {
        let score = UserScore::from(UserScoreModel {
            user_id: 8,
            total_reactions: 3,
            total_tip: 150,
            total_livecomments: 2,
        });
        assert_eq!(score.user_id, UserId::new(8));
        assert_eq!(score.total_reactions, 3);
        assert_eq!(score.total_tip, 150);
        assert_eq!(score.total_livecomments, 2);
    }

    #[test]
    fn test_livestream_score_model_mapping() {
        let score = LivestreamScore::from(LivestreamScoreModel {
            livestream_id: 4,
            total_reactions: 1,
            total_tip: 90,
            total_livecomments: 2,
            max_tip: 60,
        });
        assert_eq!(score.livestream_id, LivestreamId::new(4));
        assert_eq!(score.max_tip, 60);
        assert_eq!(score.score(), 91);
    }
}
