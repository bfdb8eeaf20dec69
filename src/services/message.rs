use crate::{
    error::{AppError, AppResult},
    models::{message, user, Message, MessageModel, User, UserModel},
    services::{
        notification::{NotificationKind, NotificationService, Notifier},
        relationship::RelationshipService,
    },
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Latest message exchanged with one counterpart.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ThreadSummary {
    pub counterpart_id: i32,
    pub counterpart: String,
    #[schema(value_type = Object)]
    pub last_message: MessageModel,
}

/// What a member typed into the chat box.
#[derive(Debug, Default)]
pub struct Draft {
    pub body: Option<String>,
    pub image_url: Option<String>,
}

pub struct MessageService {
    db: DatabaseConnection,
    notifier: Notifier,
}

impl MessageService {
    pub fn new(db: DatabaseConnection, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// One entry per counterpart, the newest message of each, ordered by
    /// counterpart username. Notes to self are left out.
    pub async fn thread_list(&self, user_id: i32) -> AppResult<Vec<ThreadSummary>> {
        let messages = Message::find()
            .filter(
                Condition::any()
                    .add(message::Column::SenderId.eq(user_id))
                    .add(message::Column::RecipientId.eq(user_id)),
            )
            .filter(Expr::col(message::Column::SenderId).ne(Expr::col(message::Column::RecipientId)))
            .all(&self.db)
            .await?;

        let counterpart_ids: Vec<i32> = messages
            .iter()
            .map(|m| counterpart_of(user_id, m))
            .collect();
        let usernames: HashMap<i32, String> = User::find()
            .filter(user::Column::Id.is_in(counterpart_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(collapse_threads(user_id, messages, &usernames))
    }

    /// Both directions between `a` and `b`, oldest first. Every message
    /// `a` sent to `b` is marked read on the way, so `b` is the reader.
    /// With `a == b` only notes to self are returned.
    pub async fn get_all_messages(&self, a: i32, b: i32) -> AppResult<Vec<MessageModel>> {
        Message::update_many()
            .col_expr(message::Column::IsRead, Expr::value(true))
            .filter(message::Column::SenderId.eq(a))
            .filter(message::Column::RecipientId.eq(b))
            .filter(message::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;

        self.conversation(a, b).await
    }

    /// Same listing as `get_all_messages` without touching read flags. Used
    /// when staff review a reported conversation.
    pub async fn conversation(&self, a: i32, b: i32) -> AppResult<Vec<MessageModel>> {
        let messages = Message::find()
            .filter(pair_condition(a, b))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await?;
        Ok(messages)
    }

    /// Persist a message. The first message between two members is preceded
    /// by a system line announcing the conversation. The recipient is
    /// notified once the rows are committed.
    pub async fn send(
        &self,
        sender: &UserModel,
        recipient: &UserModel,
        body: &str,
        image_url: Option<String>,
        is_system: bool,
    ) -> AppResult<MessageModel> {
        let txn = self.db.begin().await?;

        let prior = Message::find()
            .filter(pair_condition(sender.id, recipient.id))
            .count(&txn)
            .await?;
        if prior == 0 {
            let opener = format!(
                "{} has started a conversation with {}",
                sender.username, recipient.username
            );
            insert_message(&txn, sender.id, recipient.id, &opener, None, true).await?;
        }

        let saved =
            insert_message(&txn, sender.id, recipient.id, body, image_url, is_system).await?;
        txn.commit().await?;

        if sender.id != recipient.id {
            NotificationService::new(self.db.clone(), self.notifier.clone())
                .notify(
                    recipient.id,
                    NotificationKind::NewMessage {
                        sender: sender.username.clone(),
                    },
                )
                .await?;
        }

        Ok(saved)
    }

    /// Chat box submission. Refused while either member blocks the other;
    /// an attached image replaces the text with `Image`.
    pub async fn send_from_member(
        &self,
        sender: &UserModel,
        recipient: &UserModel,
        draft: Draft,
    ) -> AppResult<MessageModel> {
        let relationships = RelationshipService::new(self.db.clone(), self.notifier.clone());
        if relationships
            .blocked_either_way(sender.id, recipient.id)
            .await?
        {
            return Err(AppError::redirect(thread_path(&recipient.username)));
        }

        let body = match (&draft.image_url, draft.body.as_deref().map(str::trim)) {
            (Some(_), _) => "Image".to_string(),
            (None, Some(text)) if !text.is_empty() => text.to_string(),
            _ => {
                return Err(AppError::Validation(
                    "Message must have text or an image".to_string(),
                ))
            }
        };

        self.send(sender, recipient, &body, draft.image_url, false)
            .await
    }
}

pub fn thread_path(username: &str) -> String {
    format!("/api/v1/messages/{}", username)
}

fn pair_condition(a: i32, b: i32) -> Condition {
    if a == b {
        return Condition::all()
            .add(message::Column::SenderId.eq(a))
            .add(message::Column::RecipientId.eq(a));
    }
    Condition::any()
        .add(
            Condition::all()
                .add(message::Column::SenderId.eq(a))
                .add(message::Column::RecipientId.eq(b)),
        )
        .add(
            Condition::all()
                .add(message::Column::SenderId.eq(b))
                .add(message::Column::RecipientId.eq(a)),
        )
}

async fn insert_message<C: ConnectionTrait>(
    db: &C,
    sender_id: i32,
    recipient_id: i32,
    body: &str,
    image_url: Option<String>,
    is_system: bool,
) -> AppResult<MessageModel> {
    let model = message::ActiveModel {
        sender_id: sea_orm::ActiveValue::Set(sender_id),
        recipient_id: sea_orm::ActiveValue::Set(recipient_id),
        body: sea_orm::ActiveValue::Set(body.to_string()),
        image_url: sea_orm::ActiveValue::Set(image_url),
        is_read: sea_orm::ActiveValue::Set(false),
        is_system: sea_orm::ActiveValue::Set(is_system),
        created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

fn counterpart_of(user_id: i32, message: &MessageModel) -> i32 {
    if message.sender_id == user_id {
        message.recipient_id
    } else {
        message.sender_id
    }
}

/// Sort by counterpart name then newest first, keep the first row per
/// counterpart.
fn collapse_threads(
    user_id: i32,
    mut messages: Vec<MessageModel>,
    usernames: &HashMap<i32, String>,
) -> Vec<ThreadSummary> {
    let name = |m: &MessageModel| {
        usernames
            .get(&counterpart_of(user_id, m))
            .cloned()
            .unwrap_or_default()
    };
    messages.sort_by(|x, y| {
        name(x)
            .cmp(&name(y))
            .then(y.created_at.cmp(&x.created_at))
            .then(y.id.cmp(&x.id))
    });

    let mut threads: Vec<ThreadSummary> = Vec::new();
    for message in messages {
        let counterpart_id = counterpart_of(user_id, &message);
        if threads
            .last()
            .is_some_and(|t| t.counterpart_id == counterpart_id)
        {
            continue;
        }
        threads.push(ThreadSummary {
            counterpart_id,
            counterpart: name(&message),
            last_message: message,
        });
    }
    threads
}

/// Re-sort a thread list so the most recently active conversation is first.
pub fn order_by_recent(threads: &mut [ThreadSummary]) {
    threads.sort_by(|x, y| {
        y.last_message
            .created_at
            .cmp(&x.last_message.created_at)
            .then(y.last_message.id.cmp(&x.last_message.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn msg(id: i32, sender_id: i32, recipient_id: i32, minute: u32) -> MessageModel {
        MessageModel {
            id,
            sender_id,
            recipient_id,
            body: format!("m{}", id),
            image_url: None,
            is_read: false,
            is_system: false,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap(),
        }
    }

    fn names() -> HashMap<i32, String> {
        HashMap::from([
            (2, "zoe".to_string()),
            (3, "bob".to_string()),
            (4, "mia".to_string()),
        ])
    }

    #[test]
    fn one_thread_per_counterpart_with_newest_message() {
        let messages = vec![
            msg(1, 1, 2, 0),
            msg(2, 2, 1, 5),
            msg(3, 3, 1, 1),
            msg(4, 1, 3, 2),
            msg(5, 1, 4, 9),
        ];
        let threads = collapse_threads(1, messages, &names());
        let summary: Vec<(&str, i32)> = threads
            .iter()
            .map(|t| (t.counterpart.as_str(), t.last_message.id))
            .collect();
        assert_eq!(summary, vec![("bob", 4), ("mia", 5), ("zoe", 2)]);
    }

    #[test]
    fn recent_order_puts_latest_first() {
        let messages = vec![msg(1, 1, 2, 30), msg(2, 3, 1, 10), msg(3, 1, 4, 20)];
        let mut threads = collapse_threads(1, messages, &names());
        order_by_recent(&mut threads);
        let ids: Vec<i32> = threads.iter().map(|t| t.last_message.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn same_timestamp_breaks_ties_by_id() {
        let messages = vec![msg(7, 1, 2, 0), msg(8, 2, 1, 0)];
        let threads = collapse_threads(1, messages, &names());
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].last_message.id, 8);
    }
}
