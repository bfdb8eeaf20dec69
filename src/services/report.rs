use crate::{
    error::{AppError, AppResult},
    models::{
        chat_report, offer, offer_report, post, post_report, report_reporter, user, user_report,
        ChatReport, Offer, OfferReport, Post, PostReport, ReportReporter, User, UserReport,
    },
};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, TransactionTrait,
};

/// Things a member can flag for staff. Each target has at most one open
/// report that collects every reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTarget {
    User,
    Post,
    Offer,
}

impl ReportTarget {
    pub fn kind(self) -> &'static str {
        match self {
            ReportTarget::User => report_reporter::KIND_USER,
            ReportTarget::Post => report_reporter::KIND_POST,
            ReportTarget::Offer => report_reporter::KIND_OFFER,
        }
    }
}

pub struct ReportService {
    db: DatabaseConnection,
}

impl ReportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a report on `target_id` or add the caller to the existing one.
    /// Returns the report id.
    pub async fn report(
        &self,
        reporter_id: i32,
        target: ReportTarget,
        target_id: i32,
    ) -> AppResult<i32> {
        self.ensure_reportable(reporter_id, target, target_id)
            .await?;

        let txn = self.db.begin().await?;
        let report_id = open_report(&txn, target, target_id).await?;
        ReportReporter::insert(report_reporter::ActiveModel {
            report_kind: sea_orm::ActiveValue::Set(target.kind().to_string()),
            report_id: sea_orm::ActiveValue::Set(report_id),
            user_id: sea_orm::ActiveValue::Set(reporter_id),
        })
        .on_conflict(
            OnConflict::columns([
                report_reporter::Column::ReportKind,
                report_reporter::Column::ReportId,
                report_reporter::Column::UserId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(reporter_id, ?target, target_id, report_id, "report filed");
        Ok(report_id)
    }

    /// Flag a conversation partner. One report per (partner, reporter).
    pub async fn report_chat(&self, reporter_id: i32, chat_user_id: i32) -> AppResult<bool> {
        if reporter_id == chat_user_id {
            return Err(AppError::Validation("Cannot report yourself".to_string()));
        }
        User::find_by_id(chat_user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let inserted = ChatReport::insert(chat_report::ActiveModel {
            chat_user_id: sea_orm::ActiveValue::Set(chat_user_id),
            reporter_id: sea_orm::ActiveValue::Set(reporter_id),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                chat_report::Column::ChatUserId,
                chat_report::Column::ReporterId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;

        tracing::info!(reporter_id, chat_user_id, "chat reported");
        Ok(inserted > 0)
    }

    /// Usernames of everyone who filed report `report_id`.
    pub async fn reporters(&self, target: ReportTarget, report_id: i32) -> AppResult<Vec<String>> {
        let ids: Vec<i32> = ReportReporter::find()
            .filter(report_reporter::Column::ReportKind.eq(target.kind()))
            .filter(report_reporter::Column::ReportId.eq(report_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        let mut names: Vec<String> = User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| u.username)
            .collect();
        names.sort();
        Ok(names)
    }

    async fn ensure_reportable(
        &self,
        reporter_id: i32,
        target: ReportTarget,
        target_id: i32,
    ) -> AppResult<()> {
        match target {
            ReportTarget::User => {
                if reporter_id == target_id {
                    return Err(AppError::Validation("Cannot report yourself".to_string()));
                }
                User::find_by_id(target_id)
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::NotFound)?;
            }
            ReportTarget::Post => {
                Post::find_by_id(target_id)
                    .filter(post::Column::IsDelete.eq(false))
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::NotFound)?;
            }
            ReportTarget::Offer => {
                Offer::find_by_id(target_id)
                    .filter(offer::Column::IsDelete.eq(false))
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::NotFound)?;
            }
        }
        Ok(())
    }
}

/// Insert the report row for a target if missing and return its id.
async fn open_report<C: ConnectionTrait>(
    db: &C,
    target: ReportTarget,
    target_id: i32,
) -> AppResult<i32> {
    let now = chrono::Utc::now().naive_utc();
    let id = match target {
        ReportTarget::User => {
            UserReport::insert(user_report::ActiveModel {
                user_id: sea_orm::ActiveValue::Set(target_id),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::column(user_report::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
            UserReport::find()
                .filter(user_report::Column::UserId.eq(target_id))
                .one(db)
                .await?
                .map(|r| r.id)
        }
        ReportTarget::Post => {
            PostReport::insert(post_report::ActiveModel {
                post_id: sea_orm::ActiveValue::Set(target_id),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::column(post_report::Column::PostId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
            PostReport::find()
                .filter(post_report::Column::PostId.eq(target_id))
                .one(db)
                .await?
                .map(|r| r.id)
        }
        ReportTarget::Offer => {
            OfferReport::insert(offer_report::ActiveModel {
                offer_id: sea_orm::ActiveValue::Set(target_id),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::column(offer_report::Column::OfferId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
            OfferReport::find()
                .filter(offer_report::Column::OfferId.eq(target_id))
                .one(db)
                .await?
                .map(|r| r.id)
        }
    };
    id.ok_or_else(|| AppError::Internal(anyhow::anyhow!("report row missing after insert")))
}

/// Close a report and forget its reporters. Returns how many report rows
/// went away, 0 when someone else closed it first.
pub(crate) async fn close_report<C: ConnectionTrait>(
    db: &C,
    target: ReportTarget,
    report_id: i32,
) -> AppResult<u64> {
    let closed = match target {
        ReportTarget::User => UserReport::delete_by_id(report_id).exec(db).await?,
        ReportTarget::Post => PostReport::delete_by_id(report_id).exec(db).await?,
        ReportTarget::Offer => OfferReport::delete_by_id(report_id).exec(db).await?,
    };
    ReportReporter::delete_many()
        .filter(report_reporter::Column::ReportKind.eq(target.kind()))
        .filter(report_reporter::Column::ReportId.eq(report_id))
        .exec(db)
        .await?;
    Ok(closed.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_kinds_are_distinct() {
        assert_eq!(ReportTarget::User.kind(), "user");
        assert_eq!(ReportTarget::Post.kind(), "post");
        assert_eq!(ReportTarget::Offer.kind(), "offer");
    }
}
