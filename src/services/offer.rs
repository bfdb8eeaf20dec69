use crate::{
    error::{AppError, AppResult},
    models::{offer, offer_like, Offer, OfferLike, OfferModel, User, UserModel},
    services::{
        message::MessageService,
        notification::{NotificationKind, NotificationService, Notifier},
        post::{strikes_of, usernames, MAX_STRIKES_TO_LIKE},
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

pub const OFFERS_PATH: &str = "/api/v1/offers";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OfferView {
    pub id: i32,
    pub user_id: i32,
    pub author: String,
    pub head: String,
    pub content: String,
    pub content_html: String,
    pub image_url: Option<String>,
    pub likes: u64,
    pub topics: Vec<String>,
    pub created_at: NaiveDateTime,
}

pub struct NewOffer {
    pub head: String,
    pub content: String,
    pub image_url: Option<String>,
    pub topics: String,
}

pub fn offer_path(id: i32) -> String {
    format!("{}/{}", OFFERS_PATH, id)
}

pub struct OfferService {
    db: DatabaseConnection,
    notifier: Notifier,
}

impl OfferService {
    pub fn new(db: DatabaseConnection, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn feed(&self, page: u64, per_page: u64) -> AppResult<(Vec<OfferView>, u64)> {
        let paginator = Offer::find()
            .filter(offer::Column::IsDelete.eq(false))
            .order_by_desc(offer::Column::CreatedAt)
            .order_by_desc(offer::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let offers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((self.hydrate(offers).await?, total))
    }

    pub async fn by_author(&self, user_id: i32) -> AppResult<Vec<OfferView>> {
        let offers = Offer::find()
            .filter(offer::Column::UserId.eq(user_id))
            .filter(offer::Column::IsDelete.eq(false))
            .order_by_desc(offer::Column::CreatedAt)
            .order_by_desc(offer::Column::Id)
            .all(&self.db)
            .await?;
        self.hydrate(offers).await
    }

    pub async fn by_topic(&self, name: &str) -> AppResult<Vec<OfferView>> {
        let Some(tag) = TopicService::new(self.db.clone()).find_by_name(name).await? else {
            return Err(AppError::redirect(OFFERS_PATH));
        };
        let ids = topic::offer_ids_for(&self.db, tag.id).await?;
        let offers = Offer::find()
            .filter(offer::Column::Id.is_in(ids))
            .filter(offer::Column::IsDelete.eq(false))
            .order_by_desc(offer::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.hydrate(offers).await
    }

    pub async fn detail(&self, viewer: Option<i32>, offer_id: i32) -> AppResult<OfferView> {
        let offer = self.visible_offer(viewer, offer_id).await?;
        self.hydrate(vec![offer])
            .await?
            .pop()
            .ok_or(AppError::NotFound)
    }

    /// Any offer, removed or not, for staff review.
    pub async fn find_view(&self, offer_id: i32) -> AppResult<Option<OfferView>> {
        let Some(found) = Offer::find_by_id(offer_id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![found]).await?.pop())
    }

    async fn visible_offer(&self, viewer: Option<i32>, offer_id: i32) -> AppResult<OfferModel> {
        let offer = Offer::find_by_id(offer_id)
            .one(&self.db)
            .await?
            .filter(|o| !o.is_delete)
            .ok_or_else(|| AppError::redirect(OFFERS_PATH))?;

        if let Some(viewer) = viewer {
            let relationships = RelationshipService::new(self.db.clone(), self.notifier.clone());
            if relationships.blocked_either_way(viewer, offer.user_id).await? {
                return Err(AppError::redirect(OFFERS_PATH));
            }
        }
        Ok(offer)
    }

    pub async fn create(
        &self,
        author: &UserModel,
        new: NewOffer,
    ) -> AppResult<Submission<OfferModel>> {
        if strikes_of(&self.db, author.id).await? != 0 {
            tracing::debug!(user_id = author.id, "offer rejected, active strikes");
            return Ok(Submission::Rejected);
        }

        let txn = self.db.begin().await?;
        let saved = offer::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(author.id),
            head: sea_orm::ActiveValue::Set(new.head),
            content: sea_orm::ActiveValue::Set(new.content),
            image_url: sea_orm::ActiveValue::Set(new.image_url),
            is_delete: sea_orm::ActiveValue::Set(false),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        topic::tag_offer(&txn, saved.id, &new.topics).await?;
        txn.commit().await?;

        let followers = RelationshipService::new(self.db.clone(), self.notifier.clone())
            .follower_ids(author.id)
            .await?;
        NotificationService::new(self.db.clone(), self.notifier.clone())
            .notify_all(
                &followers,
                NotificationKind::NewOffer {
                    author: author.username.clone(),
                    offer_id: saved.id,
                },
            )
            .await?;

        Ok(Submission::Accepted(saved))
    }

    pub async fn delete(&self, user_id: i32, offer_id: i32) -> AppResult<()> {
        let offer = Offer::find_by_id(offer_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if offer.user_id != user_id {
            return Err(AppError::redirect(offer_path(offer_id)));
        }

        let mut active: offer::ActiveModel = offer.into();
        active.is_delete = sea_orm::ActiveValue::Set(true);
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn toggle_like(&self, user_id: i32, offer_id: i32) -> AppResult<(bool, u64)> {
        if strikes_of(&self.db, user_id).await? > MAX_STRIKES_TO_LIKE {
            return Err(AppError::Suspended);
        }
        Offer::find_by_id(offer_id)
            .one(&self.db)
            .await?
            .filter(|o| !o.is_delete)
            .ok_or(AppError::NotFound)?;

        let txn = self.db.begin().await?;
        let removed = OfferLike::delete_many()
            .filter(offer_like::Column::OfferId.eq(offer_id))
            .filter(offer_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        let liked = removed.rows_affected == 0;
        if liked {
            OfferLike::insert(offer_like::ActiveModel {
                offer_id: sea_orm::ActiveValue::Set(offer_id),
                user_id: sea_orm::ActiveValue::Set(user_id),
                created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            })
            .on_conflict(
                OnConflict::columns([offer_like::Column::OfferId, offer_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        }
        let likes = OfferLike::find()
            .filter(offer_like::Column::OfferId.eq(offer_id))
            .count(&txn)
            .await?;
        txn.commit().await?;

        Ok((liked, likes))
    }

    /// Send the offer's link to its owner as a chat message from the
    /// applicant. Returns the owner's username.
    pub async fn apply(
        &self,
        applicant: &UserModel,
        offer_id: i32,
        origin: &str,
    ) -> AppResult<String> {
        let offer = self.visible_offer(Some(applicant.id), offer_id).await?;
        let owner = User::find_by_id(offer.user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let link = format!("{}{}", origin.trim_end_matches('/'), offer_path(offer.id));
        MessageService::new(self.db.clone(), self.notifier.clone())
            .send(applicant, &owner, &link, None, false)
            .await?;

        tracing::info!(applicant = applicant.id, offer_id, "applied to offer");
        Ok(owner.username)
    }

    async fn hydrate(&self, offers: Vec<OfferModel>) -> AppResult<Vec<OfferView>> {
        if offers.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i32> = offers.iter().map(|o| o.id).collect();
        let authors = usernames(&self.db, offers.iter().map(|o| o.user_id).collect()).await?;
        let mut topics = topic::names_for_offers(&self.db, &ids).await?;

        let mut likes: HashMap<i32, u64> = HashMap::new();
        for like in OfferLike::find()
            .filter(offer_like::Column::OfferId.is_in(ids))
            .all(&self.db)
            .await?
        {
            *likes.entry(like.offer_id).or_default() += 1;
        }

        Ok(offers
            .into_iter()
            .map(|o| OfferView {
                id: o.id,
                user_id: o.user_id,
                author: authors.get(&o.user_id).cloned().unwrap_or_default(),
                head: o.head,
                content_html: render_content(&o.content),
                content: o.content,
                image_url: o.image_url,
                likes: likes.get(&o.id).copied().unwrap_or(0),
                topics: topics.remove(&o.id).unwrap_or_default(),
                created_at: o.created_at,
            })
            .collect())
    }
}

/// Staff removal of a single offer.
pub(crate) async fn soft_delete_offer<C: ConnectionTrait>(db: &C, offer_id: i32) -> AppResult<u64> {
    let result = Offer::update_many()
        .col_expr(offer::Column::IsDelete, Expr::value(true))
        .filter(offer::Column::Id.eq(offer_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
