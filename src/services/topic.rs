use crate::{
    error::AppResult,
    models::{offer_topic, post_topic, topic, OfferTopic, PostTopic, Topic, TopicModel},
    utils::parse_topics,
};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use std::collections::HashMap;

pub struct TopicService {
    db: DatabaseConnection,
}

impl TopicService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<TopicModel>> {
        Ok(Topic::find()
            .filter(topic::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    pub async fn list(&self) -> AppResult<Vec<TopicModel>> {
        Ok(Topic::find()
            .order_by_asc(topic::Column::Name)
            .all(&self.db)
            .await?)
    }
}

/// Reuse or create a topic row per parsed name and return their ids.
async fn resolve<C: ConnectionTrait>(db: &C, raw: &str) -> AppResult<Vec<i32>> {
    let names = parse_topics(raw);
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        Topic::insert(topic::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.clone()),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(topic::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

        if let Some(existing) = Topic::find()
            .filter(topic::Column::Name.eq(name.as_str()))
            .one(db)
            .await?
        {
            ids.push(existing.id);
        }
    }
    Ok(ids)
}

/// Tag a post with every topic found in `raw`.
pub async fn tag_post<C: ConnectionTrait>(db: &C, post_id: i32, raw: &str) -> AppResult<usize> {
    let ids = resolve(db, raw).await?;
    for topic_id in &ids {
        PostTopic::insert(post_topic::ActiveModel {
            post_id: sea_orm::ActiveValue::Set(post_id),
            topic_id: sea_orm::ActiveValue::Set(*topic_id),
        })
        .on_conflict(
            OnConflict::columns([post_topic::Column::PostId, post_topic::Column::TopicId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    }
    Ok(ids.len())
}

/// Tag an offer with every topic found in `raw`.
pub async fn tag_offer<C: ConnectionTrait>(db: &C, offer_id: i32, raw: &str) -> AppResult<usize> {
    let ids = resolve(db, raw).await?;
    for topic_id in &ids {
        OfferTopic::insert(offer_topic::ActiveModel {
            offer_id: sea_orm::ActiveValue::Set(offer_id),
            topic_id: sea_orm::ActiveValue::Set(*topic_id),
        })
        .on_conflict(
            OnConflict::columns([offer_topic::Column::OfferId, offer_topic::Column::TopicId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    }
    Ok(ids.len())
}

/// Topic names per post id.
pub async fn names_for_posts(
    db: &DatabaseConnection,
    post_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<String>>> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let links = PostTopic::find()
        .filter(post_topic::Column::PostId.is_in(post_ids.to_vec()))
        .all(db)
        .await?;
    let names = topic_names(db, links.iter().map(|l| l.topic_id).collect()).await?;

    let mut out: HashMap<i32, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(name) = names.get(&link.topic_id) {
            out.entry(link.post_id).or_default().push(name.clone());
        }
    }
    Ok(out)
}

/// Topic names per offer id.
pub async fn names_for_offers(
    db: &DatabaseConnection,
    offer_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<String>>> {
    if offer_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let links = OfferTopic::find()
        .filter(offer_topic::Column::OfferId.is_in(offer_ids.to_vec()))
        .all(db)
        .await?;
    let names = topic_names(db, links.iter().map(|l| l.topic_id).collect()).await?;

    let mut out: HashMap<i32, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(name) = names.get(&link.topic_id) {
            out.entry(link.offer_id).or_default().push(name.clone());
        }
    }
    Ok(out)
}

async fn topic_names(db: &DatabaseConnection, ids: Vec<i32>) -> AppResult<HashMap<i32, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(Topic::find()
        .filter(topic::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect())
}

/// Ids of posts tagged with `topic_id`.
pub async fn post_ids_for(db: &DatabaseConnection, topic_id: i32) -> AppResult<Vec<i32>> {
    Ok(PostTopic::find()
        .filter(post_topic::Column::TopicId.eq(topic_id))
        .all(db)
        .await?
        .into_iter()
        .map(|l| l.post_id)
        .collect())
}

/// Ids of offers tagged with `topic_id`.
pub async fn offer_ids_for(db: &DatabaseConnection, topic_id: i32) -> AppResult<Vec<i32>> {
    Ok(OfferTopic::find()
        .filter(offer_topic::Column::TopicId.eq(topic_id))
        .all(db)
        .await?
        .into_iter()
        .map(|l| l.offer_id)
        .collect())
}
