use crate::{
    error::{AppError, AppResult},
    models::{block, follow, user, Block, Follow, User, UserModel},
    services::{
        message::MessageService,
        notification::{NotificationKind, NotificationService, Notifier},
    },
};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;

/// How much of a member's page a viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Full,
    /// The viewer blocked the owner: name and bio only.
    IdentityOnly,
    /// The owner blocked the viewer: send the viewer away.
    Hidden,
}

pub struct RelationshipService {
    db: DatabaseConnection,
    notifier: Notifier,
}

impl RelationshipService {
    pub fn new(db: DatabaseConnection, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Follow, or unfollow when already following. Returns true when the
    /// caller now follows `target`.
    pub async fn toggle_follow(&self, from: &UserModel, target: &UserModel) -> AppResult<bool> {
        if from.id == target.id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        let txn = self.db.begin().await?;
        let removed = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(from.id))
            .filter(follow::Column::FollowingId.eq(target.id))
            .exec(&txn)
            .await?;
        let following = removed.rows_affected == 0;
        if following {
            Follow::insert(follow::ActiveModel {
                follower_id: sea_orm::ActiveValue::Set(from.id),
                following_id: sea_orm::ActiveValue::Set(target.id),
                created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([follow::Column::FollowerId, follow::Column::FollowingId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        }
        txn.commit().await?;

        if following {
            NotificationService::new(self.db.clone(), self.notifier.clone())
                .notify(
                    target.id,
                    NotificationKind::NewFollower {
                        follower: from.username.clone(),
                    },
                )
                .await?;
        }
        Ok(following)
    }

    /// Block, or unblock when already blocking. Either way a system line is
    /// posted into the pair's conversation. Returns true when now blocking.
    pub async fn toggle_block(&self, from: &UserModel, target: &UserModel) -> AppResult<bool> {
        if from.id == target.id {
            return Err(AppError::Validation("Cannot block yourself".to_string()));
        }

        let txn = self.db.begin().await?;
        let removed = Block::delete_many()
            .filter(block::Column::BlockerId.eq(from.id))
            .filter(block::Column::BlockedId.eq(target.id))
            .exec(&txn)
            .await?;
        let blocking = removed.rows_affected == 0;
        if blocking {
            Block::insert(block::ActiveModel {
                blocker_id: sea_orm::ActiveValue::Set(from.id),
                blocked_id: sea_orm::ActiveValue::Set(target.id),
                created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([block::Column::BlockerId, block::Column::BlockedId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        }
        txn.commit().await?;

        let verb = if blocking { "blocked" } else { "unblocked" };
        let notice = format!("{} has {} {}", from.username, verb, target.username);
        MessageService::new(self.db.clone(), self.notifier.clone())
            .send(from, target, &notice, None, true)
            .await?;

        tracing::info!(blocker = from.id, blocked = target.id, blocking, "block toggled");
        Ok(blocking)
    }

    pub async fn is_following(&self, follower_id: i32, following_id: i32) -> AppResult<bool> {
        let count = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn is_blocking(&self, blocker_id: i32, blocked_id: i32) -> AppResult<bool> {
        let count = Block::find()
            .filter(block::Column::BlockerId.eq(blocker_id))
            .filter(block::Column::BlockedId.eq(blocked_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn blocked_either_way(&self, a: i32, b: i32) -> AppResult<bool> {
        Ok(self.is_blocking(a, b).await? || self.is_blocking(b, a).await?)
    }

    /// What `viewer` may see of `owner`'s page. Anonymous visitors and the
    /// owner see everything.
    pub async fn visibility(&self, viewer: Option<i32>, owner: i32) -> AppResult<Visibility> {
        let Some(viewer) = viewer.filter(|v| *v != owner) else {
            return Ok(Visibility::Full);
        };
        if self.is_blocking(owner, viewer).await? {
            return Ok(Visibility::Hidden);
        }
        if self.is_blocking(viewer, owner).await? {
            return Ok(Visibility::IdentityOnly);
        }
        Ok(Visibility::Full)
    }

    /// Ids of everyone following `user_id`, for fan-out notifications.
    pub async fn follower_ids(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let rows = Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|f| f.follower_id).collect())
    }

    pub async fn list_followers(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let ids = paginator
            .fetch_page(page.saturating_sub(1))
            .await?
            .into_iter()
            .map(|f| f.follower_id)
            .collect();
        Ok((self.users_in_order(ids).await?, total))
    }

    pub async fn list_following(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let ids = paginator
            .fetch_page(page.saturating_sub(1))
            .await?
            .into_iter()
            .map(|f| f.following_id)
            .collect();
        Ok((self.users_in_order(ids).await?, total))
    }

    pub async fn list_blocked(&self, user_id: i32) -> AppResult<Vec<UserModel>> {
        let ids = Block::find()
            .filter(block::Column::BlockerId.eq(user_id))
            .order_by_desc(block::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|b| b.blocked_id)
            .collect();
        self.users_in_order(ids).await
    }

    async fn users_in_order(&self, ids: Vec<i32>) -> AppResult<Vec<UserModel>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut by_id: HashMap<i32, UserModel> = User::find()
            .filter(user::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        Ok(ids.into_iter().filter_map(|id| by_id.remove(&id)).collect())
    }
}
