use crate::{
    error::{AppError, AppResult},
    models::{post, post_like, profile, user, Post, PostLike, PostModel, Profile, User, UserModel},
    services::{
        notification::{NotificationKind, NotificationService, Notifier},
        relationship::RelationshipService,
        topic::{self, TopicService},
        Submission,
    },
    utils::render_content,
};
use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

pub const FEED_PATH: &str = "/api/v1/posts";

/// Likes are allowed up to and including this many strikes.
pub const MAX_STRIKES_TO_LIKE: i32 = 2;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostView {
    pub id: i32,
    pub user_id: i32,
    pub author: String,
    pub content: String,
    pub content_html: String,
    pub image_url: Option<String>,
    pub comment_id: Option<i32>,
    pub likes: u64,
    pub topics: Vec<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<PostView>,
}

pub struct NewPost {
    pub content: String,
    pub image_url: Option<String>,
    pub topics: String,
    /// Set when the post is a comment on another post.
    pub parent_id: Option<i32>,
}

pub fn post_path(id: i32) -> String {
    format!("{}/{}", FEED_PATH, id)
}

pub struct PostService {
    db: DatabaseConnection,
    notifier: Notifier,
}

impl PostService {
    pub fn new(db: DatabaseConnection, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Live top-level posts, newest first.
    pub async fn feed(&self, page: u64, per_page: u64) -> AppResult<(Vec<PostView>, u64)> {
        let paginator = Post::find()
            .filter(post::Column::IsDelete.eq(false))
            .filter(post::Column::CommentId.is_null())
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((self.hydrate(posts).await?, total))
    }

    /// Live posts of one author, newest first.
    pub async fn by_author(&self, user_id: i32) -> AppResult<Vec<PostView>> {
        let posts = Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .filter(post::Column::IsDelete.eq(false))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await?;
        self.hydrate(posts).await
    }

    /// Live posts tagged `name`. An unknown topic sends the caller back to the
    /// feed.
    pub async fn by_topic(&self, name: &str) -> AppResult<Vec<PostView>> {
        let Some(tag) = TopicService::new(self.db.clone()).find_by_name(name).await? else {
            return Err(AppError::redirect(FEED_PATH));
        };
        let ids = topic::post_ids_for(&self.db, tag.id).await?;
        let posts = Post::find()
            .filter(post::Column::Id.is_in(ids))
            .filter(post::Column::IsDelete.eq(false))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.hydrate(posts).await
    }

    /// A post and its live comments, newest first. Missing or removed posts,
    /// and posts across a block in either direction, redirect to the feed.
    pub async fn detail(&self, viewer: Option<i32>, post_id: i32) -> AppResult<PostDetail> {
        let post = self.visible_post(viewer, post_id).await?;
        let comments = Post::find()
            .filter(post::Column::CommentId.eq(post.id))
            .filter(post::Column::IsDelete.eq(false))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await?;

        let mut views = self.hydrate(vec![post]).await?;
        let post = views.pop().ok_or(AppError::NotFound)?;
        Ok(PostDetail {
            post,
            comments: self.hydrate(comments).await?,
        })
    }

    /// Any post, removed or not, for staff review.
    pub async fn find_view(&self, post_id: i32) -> AppResult<Option<PostView>> {
        let Some(found) = Post::find_by_id(post_id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![found]).await?.pop())
    }

    async fn visible_post(&self, viewer: Option<i32>, post_id: i32) -> AppResult<PostModel> {
        let post = Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .filter(|p| !p.is_delete)
            .ok_or_else(|| AppError::redirect(FEED_PATH))?;

        if let Some(viewer) = viewer {
            let relationships = RelationshipService::new(self.db.clone(), self.notifier.clone());
            if relationships.blocked_either_way(viewer, post.user_id).await? {
                return Err(AppError::redirect(FEED_PATH));
            }
        }
        Ok(post)
    }

    /// Publish a post or a comment. Members with any active strike are
    /// turned away before anything is stored.
    pub async fn create(&self, author: &UserModel, new: NewPost) -> AppResult<Submission<PostModel>> {
        if strikes_of(&self.db, author.id).await? != 0 {
            tracing::debug!(user_id = author.id, "post rejected, active strikes");
            return Ok(Submission::Rejected);
        }

        let parent = match new.parent_id {
            Some(parent_id) => Some(self.visible_post(Some(author.id), parent_id).await?),
            None => None,
        };

        let txn = self.db.begin().await?;
        let saved = post::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(author.id),
            content: sea_orm::ActiveValue::Set(new.content),
            image_url: sea_orm::ActiveValue::Set(new.image_url),
            comment_id: sea_orm::ActiveValue::Set(parent.as_ref().map(|p| p.id)),
            is_delete: sea_orm::ActiveValue::Set(false),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        topic::tag_post(&txn, saved.id, &new.topics).await?;
        txn.commit().await?;

        let notifications = NotificationService::new(self.db.clone(), self.notifier.clone());
        match parent {
            Some(parent) => {
                if parent.user_id != author.id {
                    notifications
                        .notify(
                            parent.user_id,
                            NotificationKind::NewComment {
                                author: author.username.clone(),
                                post_id: parent.id,
                            },
                        )
                        .await?;
                }
            }
            None => {
                let followers = RelationshipService::new(self.db.clone(), self.notifier.clone())
                    .follower_ids(author.id)
                    .await?;
                notifications
                    .notify_all(
                        &followers,
                        NotificationKind::NewPost {
                            author: author.username.clone(),
                            post_id: saved.id,
                        },
                    )
                    .await?;
            }
        }

        Ok(Submission::Accepted(saved))
    }

    /// Soft-delete the caller's own post. Anyone else is sent back to it.
    pub async fn delete(&self, user_id: i32, post_id: i32) -> AppResult<()> {
        let post = Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if post.user_id != user_id {
            return Err(AppError::redirect(post_path(post_id)));
        }

        let mut active: post::ActiveModel = post.into();
        active.is_delete = sea_orm::ActiveValue::Set(true);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Like, or unlike when already liked. Returns the new state and count.
    pub async fn toggle_like(&self, user_id: i32, post_id: i32) -> AppResult<(bool, u64)> {
        if strikes_of(&self.db, user_id).await? > MAX_STRIKES_TO_LIKE {
            return Err(AppError::Suspended);
        }
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .filter(|p| !p.is_delete)
            .ok_or(AppError::NotFound)?;

        let txn = self.db.begin().await?;
        let removed = PostLike::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        let liked = removed.rows_affected == 0;
        if liked {
            PostLike::insert(post_like::ActiveModel {
                post_id: sea_orm::ActiveValue::Set(post_id),
                user_id: sea_orm::ActiveValue::Set(user_id),
                created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            })
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        }
        let likes = PostLike::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&txn)
            .await?;
        txn.commit().await?;

        Ok((liked, likes))
    }

    async fn hydrate(&self, posts: Vec<PostModel>) -> AppResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        let authors = usernames(&self.db, posts.iter().map(|p| p.user_id).collect()).await?;
        let mut topics = topic::names_for_posts(&self.db, &ids).await?;

        let mut likes: HashMap<i32, u64> = HashMap::new();
        for like in PostLike::find()
            .filter(post_like::Column::PostId.is_in(ids))
            .all(&self.db)
            .await?
        {
            *likes.entry(like.post_id).or_default() += 1;
        }

        Ok(posts
            .into_iter()
            .map(|p| PostView {
                id: p.id,
                user_id: p.user_id,
                author: authors.get(&p.user_id).cloned().unwrap_or_default(),
                content_html: render_content(&p.content),
                content: p.content,
                image_url: p.image_url,
                comment_id: p.comment_id,
                likes: likes.get(&p.id).copied().unwrap_or(0),
                topics: topics.remove(&p.id).unwrap_or_default(),
                created_at: p.created_at,
            })
            .collect())
    }
}

/// Current strike count; members without a profile count as clean.
pub(crate) async fn strikes_of(db: &DatabaseConnection, user_id: i32) -> AppResult<i32> {
    Ok(Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .map(|p| p.strikes)
        .unwrap_or(0))
}

pub(crate) async fn usernames(
    db: &DatabaseConnection,
    ids: Vec<i32>,
) -> AppResult<HashMap<i32, String>> {
    Ok(User::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect())
}

/// Staff removal of a single post.
pub(crate) async fn soft_delete_post<C: ConnectionTrait>(db: &C, post_id: i32) -> AppResult<u64> {
    let result = Post::update_many()
        .col_expr(post::Column::IsDelete, Expr::value(true))
        .filter(post::Column::Id.eq(post_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
