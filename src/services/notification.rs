use crate::{
    error::AppResult,
    models::{notification, profile, user, Notification, NotificationModel, Profile, User},
    services::email::EmailService,
    websocket::hub::NotificationHub,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;

/// Mail is sent on every `MAIL_EVERY`-th event once the counter has reached it.
pub const MAIL_EVERY: i32 = 10;

/// Delivery channels shared by every notification.
#[derive(Clone)]
pub struct Notifier {
    pub hub: NotificationHub,
    pub email: EmailService,
}

/// What happened. Each kind fixes the title, text and deep link a recipient
/// sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    NewFollower { follower: String },
    NewPost { author: String, post_id: i32 },
    NewOffer { author: String, offer_id: i32 },
    NewComment { author: String, post_id: i32 },
    NewMessage { sender: String },
    Strike { strikes: i32 },
}

impl NotificationKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::NewFollower { .. } => "New follower",
            Self::NewPost { .. } => "New post",
            Self::NewOffer { .. } => "New offer",
            Self::NewComment { .. } => "New comment",
            Self::NewMessage { .. } => "New message",
            Self::Strike { strikes } if *strikes >= 3 => "ALERT",
            Self::Strike { .. } => "New strike",
        }
    }

    pub fn content(&self) -> String {
        match self {
            Self::NewFollower { follower } => format!("{} has followed you", follower),
            Self::NewPost { author, .. } => format!("{} has made a new post", author),
            Self::NewOffer { author, .. } => format!("{} has made a new offer", author),
            Self::NewComment { author, .. } => format!("{} has commented your post", author),
            Self::NewMessage { sender } => format!("{} has sent you a message", sender),
            Self::Strike { strikes } if *strikes >= 3 => {
                "You have been permanently suspended".to_string()
            }
            Self::Strike { .. } => "You've received a strike".to_string(),
        }
    }

    pub fn link(&self) -> String {
        match self {
            Self::NewFollower { follower } => format!("/api/v1/users/{}", follower),
            Self::NewPost { post_id, .. } | Self::NewComment { post_id, .. } => {
                format!("/api/v1/posts/{}", post_id)
            }
            Self::NewOffer { offer_id, .. } => format!("/api/v1/offers/{}", offer_id),
            Self::NewMessage { sender } => format!("/api/v1/messages/{}", sender),
            Self::Strike { .. } => "/api/v1/notifications/strikes".to_string(),
        }
    }

    /// Strike notices always mail; everything else goes through the
    /// per-recipient throttle.
    fn always_mails(&self) -> bool {
        matches!(self, Self::Strike { .. })
    }
}

#[derive(Debug, Serialize)]
struct Push<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a NotificationModel,
}

pub struct NotificationService {
    db: DatabaseConnection,
    notifier: Notifier,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Store the notification, push it to open sockets and mail it subject to
    /// throttling. Mail failures are logged, never returned.
    pub async fn notify(
        &self,
        recipient_id: i32,
        kind: NotificationKind,
    ) -> AppResult<NotificationModel> {
        let now = chrono::Utc::now().naive_utc();
        let saved = notification::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(recipient_id),
            title: sea_orm::ActiveValue::Set(kind.title().to_string()),
            content: sea_orm::ActiveValue::Set(kind.content()),
            link: sea_orm::ActiveValue::Set(Some(kind.link())),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        self.notifier.hub.push(
            recipient_id,
            &Push {
                kind: "notification",
                data: &saved,
            },
        );

        let should_mail = kind.always_mails() || self.tick_mail_counter(recipient_id).await?;
        if should_mail {
            self.mail(recipient_id, &saved).await?;
        }

        Ok(saved)
    }

    /// Notify every id in `recipients`, e.g. all followers of an author.
    pub async fn notify_all(&self, recipients: &[i32], kind: NotificationKind) -> AppResult<()> {
        for recipient_id in recipients {
            self.notify(*recipient_id, kind.clone()).await?;
        }
        Ok(())
    }

    /// Returns true when this event should be mailed. Below the threshold the
    /// counter is incremented; at the threshold it is reset and mail goes out.
    async fn tick_mail_counter(&self, recipient_id: i32) -> AppResult<bool> {
        let bumped = Profile::update_many()
            .col_expr(
                profile::Column::Mails,
                Expr::col(profile::Column::Mails).add(1),
            )
            .filter(profile::Column::UserId.eq(recipient_id))
            .filter(profile::Column::Mails.lt(MAIL_EVERY))
            .exec(&self.db)
            .await?;
        if bumped.rows_affected > 0 {
            return Ok(false);
        }

        let reset = Profile::update_many()
            .col_expr(profile::Column::Mails, Expr::value(0))
            .filter(profile::Column::UserId.eq(recipient_id))
            .filter(profile::Column::Mails.gte(MAIL_EVERY))
            .exec(&self.db)
            .await?;
        Ok(reset.rows_affected > 0)
    }

    async fn mail(&self, recipient_id: i32, notification: &NotificationModel) -> AppResult<()> {
        let Some(recipient) = User::find_by_id(recipient_id).one(&self.db).await? else {
            return Ok(());
        };
        if let Err(e) = self
            .notifier
            .email
            .send_notification_email(&recipient.email, &notification.title, &notification.content)
            .await
        {
            tracing::warn!(recipient_id, "Failed to mail notification: {e}");
        }
        Ok(())
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<NotificationModel>, u64)> {
        let paginator = Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Usernames of the admins a suspended member can appeal to.
    pub async fn admin_usernames(&self) -> AppResult<Vec<String>> {
        let admins = User::find()
            .filter(user::Column::Role.eq(user::ROLE_ADMIN))
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;
        Ok(admins.into_iter().map(|u| u.username).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_strike_reads_as_suspension() {
        let kind = NotificationKind::Strike { strikes: 3 };
        assert_eq!(kind.title(), "ALERT");
        assert_eq!(kind.content(), "You have been permanently suspended");
        assert_eq!(kind.link(), "/api/v1/notifications/strikes");
    }

    #[test]
    fn strikes_past_the_third_still_read_as_suspension() {
        let kind = NotificationKind::Strike { strikes: 4 };
        assert_eq!(kind.title(), "ALERT");
        assert_eq!(kind.content(), "You have been permanently suspended");
    }

    #[test]
    fn early_strikes_are_plain_warnings() {
        let kind = NotificationKind::Strike { strikes: 1 };
        assert_eq!(kind.title(), "New strike");
        assert_eq!(kind.content(), "You've received a strike");
    }

    #[test]
    fn comment_links_to_parent_post() {
        let kind = NotificationKind::NewComment {
            author: "ana".to_string(),
            post_id: 9,
        };
        assert_eq!(kind.link(), "/api/v1/posts/9");
        assert_eq!(kind.content(), "ana has commented your post");
    }

    #[test]
    fn only_strikes_bypass_the_throttle() {
        assert!(NotificationKind::Strike { strikes: 2 }.always_mails());
        assert!(!NotificationKind::NewMessage {
            sender: "bo".to_string()
        }
        .always_mails());
    }
}
