use crate::{
    error::{AppError, AppResult},
    models::{follow, profile, user, Follow, Profile, ProfileModel, User, UserModel},
    services::{
        notification::Notifier,
        offer::{OfferService, OfferView},
        post::{PostService, PostView},
        relationship::{RelationshipService, Visibility},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use utoipa::ToSchema;

pub const MAX_BIO_LEN: usize = 100;

pub fn user_path(username: &str) -> String {
    format!("/api/v1/users/{}", username)
}

/// Name card shown in directories, follower lists and on profile pages.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberCard {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
}

impl MemberCard {
    pub fn new(user: &UserModel, avatar_url: Option<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfilePage {
    pub member: MemberCard,
    pub bio: Option<String>,
    pub domain: String,
    pub is_business: bool,
    pub cv_url: Option<String>,
    pub followers: u64,
    pub following: u64,
    /// False when the viewer blocked this member: only the identity is shown.
    pub show_content: bool,
    pub viewer_follows: bool,
    pub viewer_blocks: bool,
    pub posts: Vec<PostView>,
    /// Only filled for business profiles.
    pub offers: Vec<OfferView>,
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub domain: Option<String>,
    pub avatar_url: Option<String>,
    pub cv_url: Option<String>,
}

pub struct UserService {
    db: DatabaseConnection,
    notifier: Notifier,
}

impl UserService {
    pub fn new(db: DatabaseConnection, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<UserModel> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn profile_of(&self, user_id: i32) -> AppResult<ProfileModel> {
        Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Apply the fields that are set; `None` leaves a field untouched.
    pub async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> AppResult<ProfileModel> {
        if let Some(bio) = &update.bio {
            if bio.chars().count() > MAX_BIO_LEN {
                return Err(AppError::Validation(format!(
                    "Bio must be at most {} characters",
                    MAX_BIO_LEN
                )));
            }
        }

        let existing = self.profile_of(user_id).await?;
        let mut active: profile::ActiveModel = existing.into();
        if let Some(bio) = update.bio {
            active.bio = sea_orm::ActiveValue::Set(Some(bio));
        }
        if let Some(domain) = update.domain {
            active.domain = sea_orm::ActiveValue::Set(domain);
        }
        if let Some(url) = update.avatar_url {
            active.avatar_url = sea_orm::ActiveValue::Set(Some(url));
        }
        if let Some(url) = update.cv_url {
            active.cv_url = sea_orm::ActiveValue::Set(Some(url));
        }
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Everyone except the caller, by username, for starting conversations.
    pub async fn directory(
        &self,
        viewer_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<MemberCard>, u64)> {
        let paginator = User::find()
            .filter(user::Column::Id.ne(viewer_id))
            .order_by_asc(user::Column::Username)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((self.cards(users).await?, total))
    }

    /// Attach avatars to a list of users, keeping its order.
    pub async fn cards(&self, users: Vec<UserModel>) -> AppResult<Vec<MemberCard>> {
        let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
        let avatars: std::collections::HashMap<i32, Option<String>> = Profile::find()
            .filter(profile::Column::UserId.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p.avatar_url))
            .collect();
        Ok(users
            .iter()
            .map(|u| MemberCard::new(u, avatars.get(&u.id).cloned().flatten()))
            .collect())
    }

    /// A member's page as `viewer` may see it. When the owner has blocked the
    /// viewer, the viewer is sent to their own page instead.
    pub async fn profile_page(&self, viewer: Option<i32>, username: &str) -> AppResult<ProfilePage> {
        let owner = self.get_by_username(username).await?;
        let relationships = RelationshipService::new(self.db.clone(), self.notifier.clone());

        let visibility = relationships.visibility(viewer, owner.id).await?;
        if let (Visibility::Hidden, Some(viewer_id)) = (visibility, viewer) {
            let viewer = self.get_by_id(viewer_id).await?;
            tracing::debug!(owner = owner.id, viewer = viewer.id, "profile hidden by block");
            return Err(AppError::redirect(user_path(&viewer.username)));
        }

        let (viewer_follows, viewer_blocks) = match viewer {
            Some(v) if v != owner.id => (
                relationships.is_following(v, owner.id).await?,
                relationships.is_blocking(v, owner.id).await?,
            ),
            _ => (false, false),
        };

        self.build_page(owner, visibility == Visibility::Full, viewer_follows, viewer_blocks)
            .await
    }

    /// Full page without any viewer context, used by the staff console.
    pub async fn staff_view(&self, user_id: i32) -> AppResult<ProfilePage> {
        let owner = self.get_by_id(user_id).await?;
        self.build_page(owner, true, false, false).await
    }

    async fn build_page(
        &self,
        owner: UserModel,
        show_content: bool,
        viewer_follows: bool,
        viewer_blocks: bool,
    ) -> AppResult<ProfilePage> {
        let profile = self.profile_of(owner.id).await?;

        let followers = Follow::find()
            .filter(follow::Column::FollowingId.eq(owner.id))
            .count(&self.db)
            .await?;
        let following = Follow::find()
            .filter(follow::Column::FollowerId.eq(owner.id))
            .count(&self.db)
            .await?;

        let (posts, offers) = if show_content {
            let posts = PostService::new(self.db.clone(), self.notifier.clone())
                .by_author(owner.id)
                .await?;
            let offers = if profile.is_business {
                OfferService::new(self.db.clone(), self.notifier.clone())
                    .by_author(owner.id)
                    .await?
            } else {
                vec![]
            };
            (posts, offers)
        } else {
            (vec![], vec![])
        };

        Ok(ProfilePage {
            member: MemberCard::new(&owner, profile.avatar_url),
            bio: profile.bio,
            domain: profile.domain,
            is_business: profile.is_business,
            cv_url: profile.cv_url,
            followers,
            following,
            show_content,
            viewer_follows,
            viewer_blocks,
            posts,
            offers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_path_is_api_route() {
        assert_eq!(user_path("alice"), "/api/v1/users/alice");
    }
}
