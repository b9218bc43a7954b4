//! User model -> entity mapper

use score_core::entities::User;
use score_core::value_objects::UserId;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::new(model.id),
            name: model.name,
            display_name: model.display_name,
            created_at: model.created_at,
        }
    }
}
