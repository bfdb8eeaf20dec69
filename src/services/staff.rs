use crate::{
    error::{AppError, AppResult},
    models::{
        chat_report, offer_report, post_report, user_report, ChatReport, MessageModel, Offer,
        OfferReport, Post, PostReport, UserReport,
    },
    services::{
        message::MessageService,
        moderation::{ModerationService, StrikeOutcome},
        notification::Notifier,
        offer::{soft_delete_offer, OfferService, OfferView},
        post::{soft_delete_post, usernames, PostService, PostView},
        report::{close_report, ReportService, ReportTarget},
        request::{RequestKind, RequestService},
        user::{ProfilePage, UserService},
    },
    utils::clock::SharedClock,
};
use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use utoipa::ToSchema;

pub const OFFER_REPORTS_PATH: &str = "/api/v1/staff/offer-reports";
pub const POST_REPORTS_PATH: &str = "/api/v1/staff/post-reports";
pub const CHAT_REPORTS_PATH: &str = "/api/v1/staff/chat-reports";
pub const USER_REPORTS_PATH: &str = "/api/v1/staff/user-reports";

/// Queue sizes shown on the console home.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffHome {
    /// Members whose strikes expired during this visit.
    pub unstruck: u64,
    pub offer_reports: u64,
    pub post_reports: u64,
    pub chat_reports: u64,
    pub user_reports: u64,
    pub business_requests: u64,
    pub staff_requests: u64,
}

/// One entry in a report queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportEntry {
    pub id: i32,
    pub target_id: i32,
    /// Username of the reported member or of the content's author.
    pub target_user: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatReportEntry {
    pub id: i32,
    pub chat_user_id: i32,
    pub chat_user: String,
    pub reporter_id: i32,
    pub reporter: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostReportView {
    pub report: ReportEntry,
    pub post: PostView,
    pub reporters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OfferReportView {
    pub report: ReportEntry,
    pub offer: OfferView,
    pub reporters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserReportView {
    pub report: ReportEntry,
    pub profile: ProfilePage,
    pub reporters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatReportView {
    pub report: ChatReportEntry,
    pub messages: Vec<MessageModel>,
}

pub struct StaffService {
    db: DatabaseConnection,
    notifier: Notifier,
    clock: SharedClock,
}

impl StaffService {
    pub fn new(db: DatabaseConnection, notifier: Notifier, clock: SharedClock) -> Self {
        Self {
            db,
            notifier,
            clock,
        }
    }

    fn moderation(&self) -> ModerationService {
        ModerationService::new(self.db.clone(), self.notifier.clone(), self.clock.clone())
    }

    /// Opening the console also clears expired strikes.
    pub async fn home(&self) -> AppResult<StaffHome> {
        let unstruck = self.moderation().unstrike_expired().await?;
        let requests = RequestService::new(self.db.clone());

        Ok(StaffHome {
            unstruck,
            offer_reports: OfferReport::find().count(&self.db).await?,
            post_reports: PostReport::find().count(&self.db).await?,
            chat_reports: ChatReport::find().count(&self.db).await?,
            user_reports: UserReport::find().count(&self.db).await?,
            business_requests: requests.count(RequestKind::Business).await?,
            staff_requests: requests.count(RequestKind::Staff).await?,
        })
    }

    // Post reports

    pub async fn post_reports(&self) -> AppResult<Vec<ReportEntry>> {
        let reports = PostReport::find()
            .order_by_asc(post_report::Column::CreatedAt)
            .order_by_asc(post_report::Column::Id)
            .all(&self.db)
            .await?;
        let posts = Post::find()
            .filter(crate::models::post::Column::Id.is_in(reports.iter().map(|r| r.post_id)))
            .all(&self.db)
            .await?;
        let owners: std::collections::HashMap<i32, i32> =
            posts.iter().map(|p| (p.id, p.user_id)).collect();
        let entries = reports
            .into_iter()
            .map(|r| (r.id, r.post_id, owners.get(&r.post_id).copied(), r.created_at))
            .collect();
        self.entries(entries).await
    }

    pub async fn post_report(&self, report_id: i32) -> AppResult<PostReportView> {
        let report = PostReport::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::redirect(POST_REPORTS_PATH))?;
        let post = PostService::new(self.db.clone(), self.notifier.clone())
            .find_view(report.post_id)
            .await?
            .ok_or_else(|| AppError::redirect(POST_REPORTS_PATH))?;

        let mut entries = self
            .entries(vec![(report.id, post.id, Some(post.user_id), report.created_at)])
            .await?;
        let entry = entries.pop().ok_or(AppError::NotFound)?;
        let reporters = ReportService::new(self.db.clone())
            .reporters(ReportTarget::Post, report.id)
            .await?;

        Ok(PostReportView {
            report: entry,
            post,
            reporters,
        })
    }

    /// Take the post down, strike its author and close the report. Only the
    /// request that closes the report strikes.
    pub async fn remove_post(&self, report_id: i32) -> AppResult<StrikeOutcome> {
        let txn = self.db.begin().await?;
        let report = PostReport::find_by_id(report_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::redirect(POST_REPORTS_PATH))?;
        let post = Post::find_by_id(report.post_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::redirect(POST_REPORTS_PATH))?;

        if close_report(&txn, ReportTarget::Post, report.id).await? != 1 {
            return Err(AppError::redirect(POST_REPORTS_PATH));
        }
        soft_delete_post(&txn, post.id).await?;
        tracing::info!(post_id = post.id, report_id, "reported post removed");
        self.strike_and_commit(txn, post.user_id).await
    }

    // Offer reports

    pub async fn offer_reports(&self) -> AppResult<Vec<ReportEntry>> {
        let reports = OfferReport::find()
            .order_by_asc(offer_report::Column::CreatedAt)
            .order_by_asc(offer_report::Column::Id)
            .all(&self.db)
            .await?;
        let offers = Offer::find()
            .filter(crate::models::offer::Column::Id.is_in(reports.iter().map(|r| r.offer_id)))
            .all(&self.db)
            .await?;
        let owners: std::collections::HashMap<i32, i32> =
            offers.iter().map(|o| (o.id, o.user_id)).collect();
        let entries = reports
            .into_iter()
            .map(|r| (r.id, r.offer_id, owners.get(&r.offer_id).copied(), r.created_at))
            .collect();
        self.entries(entries).await
    }

    pub async fn offer_report(&self, report_id: i32) -> AppResult<OfferReportView> {
        let report = OfferReport::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::redirect(OFFER_REPORTS_PATH))?;
        let offer = OfferService::new(self.db.clone(), self.notifier.clone())
            .find_view(report.offer_id)
            .await?
            .ok_or_else(|| AppError::redirect(OFFER_REPORTS_PATH))?;

        let mut entries = self
            .entries(vec![(report.id, offer.id, Some(offer.user_id), report.created_at)])
            .await?;
        let entry = entries.pop().ok_or(AppError::NotFound)?;
        let reporters = ReportService::new(self.db.clone())
            .reporters(ReportTarget::Offer, report.id)
            .await?;

        Ok(OfferReportView {
            report: entry,
            offer,
            reporters,
        })
    }

    pub async fn remove_offer(&self, report_id: i32) -> AppResult<StrikeOutcome> {
        let txn = self.db.begin().await?;
        let report = OfferReport::find_by_id(report_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::redirect(OFFER_REPORTS_PATH))?;
        let offer = Offer::find_by_id(report.offer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::redirect(OFFER_REPORTS_PATH))?;

        if close_report(&txn, ReportTarget::Offer, report.id).await? != 1 {
            return Err(AppError::redirect(OFFER_REPORTS_PATH));
        }
        soft_delete_offer(&txn, offer.id).await?;
        tracing::info!(offer_id = offer.id, report_id, "reported offer removed");
        self.strike_and_commit(txn, offer.user_id).await
    }

    // User reports

    pub async fn user_reports(&self) -> AppResult<Vec<ReportEntry>> {
        let entries = UserReport::find()
            .order_by_asc(user_report::Column::CreatedAt)
            .order_by_asc(user_report::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.id, r.user_id, Some(r.user_id), r.created_at))
            .collect();
        self.entries(entries).await
    }

    pub async fn user_report(&self, report_id: i32) -> AppResult<UserReportView> {
        let report = UserReport::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::redirect(USER_REPORTS_PATH))?;
        let profile = UserService::new(self.db.clone(), self.notifier.clone())
            .staff_view(report.user_id)
            .await?;

        let mut entries = self
            .entries(vec![(report.id, report.user_id, Some(report.user_id), report.created_at)])
            .await?;
        let entry = entries.pop().ok_or(AppError::NotFound)?;
        let reporters = ReportService::new(self.db.clone())
            .reporters(ReportTarget::User, report.id)
            .await?;

        Ok(UserReportView {
            report: entry,
            profile,
            reporters,
        })
    }

    pub async fn strike_reported_user(&self, report_id: i32) -> AppResult<StrikeOutcome> {
        let txn = self.db.begin().await?;
        let report = UserReport::find_by_id(report_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::redirect(USER_REPORTS_PATH))?;
        if close_report(&txn, ReportTarget::User, report.id).await? != 1 {
            return Err(AppError::redirect(USER_REPORTS_PATH));
        }
        self.strike_and_commit(txn, report.user_id).await
    }

    /// Close a user, post or offer report without further action.
    pub async fn dismiss(&self, target: ReportTarget, report_id: i32) -> AppResult<()> {
        if close_report(&self.db, target, report_id).await? == 0 {
            return Err(AppError::redirect(queue_path(target)));
        }
        tracing::info!(?target, report_id, "report dismissed");
        Ok(())
    }

    // Chat reports

    pub async fn chat_reports(&self) -> AppResult<Vec<ChatReportEntry>> {
        let reports = ChatReport::find()
            .order_by_asc(chat_report::Column::CreatedAt)
            .order_by_asc(chat_report::Column::Id)
            .all(&self.db)
            .await?;
        let ids = reports
            .iter()
            .flat_map(|r| [r.chat_user_id, r.reporter_id])
            .collect();
        let names = usernames(&self.db, ids).await?;

        Ok(reports
            .into_iter()
            .map(|r| ChatReportEntry {
                id: r.id,
                chat_user_id: r.chat_user_id,
                chat_user: names.get(&r.chat_user_id).cloned().unwrap_or_default(),
                reporter_id: r.reporter_id,
                reporter: names.get(&r.reporter_id).cloned().unwrap_or_default(),
                created_at: r.created_at,
            })
            .collect())
    }

    async fn chat_entry(&self, report_id: i32) -> AppResult<ChatReportEntry> {
        let report = ChatReport::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::redirect(CHAT_REPORTS_PATH))?;
        let names = usernames(&self.db, vec![report.chat_user_id, report.reporter_id]).await?;
        Ok(ChatReportEntry {
            id: report.id,
            chat_user_id: report.chat_user_id,
            chat_user: names.get(&report.chat_user_id).cloned().unwrap_or_default(),
            reporter_id: report.reporter_id,
            reporter: names.get(&report.reporter_id).cloned().unwrap_or_default(),
            created_at: report.created_at,
        })
    }

    /// The reported conversation. Reading it here leaves unread flags alone.
    pub async fn chat_report(&self, report_id: i32) -> AppResult<ChatReportView> {
        let report = self.chat_entry(report_id).await?;
        let messages = MessageService::new(self.db.clone(), self.notifier.clone())
            .conversation(report.chat_user_id, report.reporter_id)
            .await?;
        Ok(ChatReportView { report, messages })
    }

    pub async fn strike_chat_user(&self, report_id: i32) -> AppResult<StrikeOutcome> {
        let txn = self.db.begin().await?;
        let report = ChatReport::find_by_id(report_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::redirect(CHAT_REPORTS_PATH))?;
        let closed = ChatReport::delete_by_id(report.id).exec(&txn).await?;
        if closed.rows_affected != 1 {
            return Err(AppError::redirect(CHAT_REPORTS_PATH));
        }
        self.strike_and_commit(txn, report.chat_user_id).await
    }

    pub async fn dismiss_chat(&self, report_id: i32) -> AppResult<()> {
        let report = self.chat_entry(report_id).await?;
        ChatReport::delete_by_id(report.id).exec(&self.db).await?;
        tracing::info!(report_id, "chat report dismissed");
        Ok(())
    }

    /// Strike inside the action's transaction, commit, then notify.
    async fn strike_and_commit(
        &self,
        txn: DatabaseTransaction,
        user_id: i32,
    ) -> AppResult<StrikeOutcome> {
        let moderation = self.moderation();
        let outcome = moderation.strike(&txn, user_id).await?;
        txn.commit().await?;
        moderation.announce(&outcome).await?;
        Ok(outcome)
    }

    async fn entries(
        &self,
        rows: Vec<(i32, i32, Option<i32>, NaiveDateTime)>,
    ) -> AppResult<Vec<ReportEntry>> {
        let names = usernames(&self.db, rows.iter().filter_map(|r| r.2).collect()).await?;
        Ok(rows
            .into_iter()
            .map(|(id, target_id, owner, created_at)| ReportEntry {
                id,
                target_id,
                target_user: owner
                    .and_then(|o| names.get(&o).cloned())
                    .unwrap_or_default(),
                created_at,
            })
            .collect())
    }
}

fn queue_path(target: ReportTarget) -> &'static str {
    match target {
        ReportTarget::User => USER_REPORTS_PATH,
        ReportTarget::Post => POST_REPORTS_PATH,
        ReportTarget::Offer => OFFER_REPORTS_PATH,
    }
}
