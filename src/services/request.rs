use crate::{
    error::{AppError, AppResult},
    models::{
        business_request, profile, staff_request, user, BusinessRequest, Profile, StaffRequest,
        User, UserModel,
    },
};
use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::Serialize;
use utoipa::ToSchema;

/// The two promotions a member can ask staff for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Business,
    Staff,
}

impl RequestKind {
    pub fn queue_path(self) -> &'static str {
        match self {
            RequestKind::Business => "/api/v1/staff/business-requests",
            RequestKind::Staff => "/api/v1/staff/staff-requests",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingRequest {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub created_at: NaiveDateTime,
}

pub struct RequestService {
    db: DatabaseConnection,
}

impl RequestService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// File a request for `member`. Returns false when one is already pending.
    pub async fn file(&self, member: &UserModel, kind: RequestKind) -> AppResult<bool> {
        match kind {
            RequestKind::Business => {
                let profile = Profile::find()
                    .filter(profile::Column::UserId.eq(member.id))
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::NotFound)?;
                if profile.is_business {
                    return Err(AppError::Conflict("Already a business account".to_string()));
                }
            }
            RequestKind::Staff => {
                if member.is_staff() {
                    return Err(AppError::Conflict("Already a staff member".to_string()));
                }
            }
        }

        let filed = file_request(&self.db, member.id, kind).await?;
        if filed {
            tracing::info!(user_id = member.id, ?kind, "promotion requested");
        }
        Ok(filed)
    }

    /// Pending requests, oldest first.
    pub async fn list(&self, kind: RequestKind) -> AppResult<Vec<PendingRequest>> {
        let rows: Vec<(i32, i32, NaiveDateTime)> = match kind {
            RequestKind::Business => BusinessRequest::find()
                .order_by_asc(business_request::Column::CreatedAt)
                .order_by_asc(business_request::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|r| (r.id, r.user_id, r.created_at))
                .collect(),
            RequestKind::Staff => StaffRequest::find()
                .order_by_asc(staff_request::Column::CreatedAt)
                .order_by_asc(staff_request::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|r| (r.id, r.user_id, r.created_at))
                .collect(),
        };

        let ids: Vec<i32> = rows.iter().map(|(_, user_id, _)| *user_id).collect();
        let names: std::collections::HashMap<i32, String> = User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(id, user_id, created_at)| PendingRequest {
                id,
                user_id,
                username: names.get(&user_id).cloned().unwrap_or_default(),
                created_at,
            })
            .collect())
    }

    pub async fn count(&self, kind: RequestKind) -> AppResult<u64> {
        let total = match kind {
            RequestKind::Business => BusinessRequest::find().count(&self.db).await?,
            RequestKind::Staff => StaffRequest::find().count(&self.db).await?,
        };
        Ok(total)
    }

    /// A single pending request. A request that is gone sends staff back to
    /// the queue.
    pub async fn get(&self, kind: RequestKind, id: i32) -> AppResult<PendingRequest> {
        let found = match kind {
            RequestKind::Business => BusinessRequest::find_by_id(id)
                .one(&self.db)
                .await?
                .map(|r| (r.user_id, r.created_at)),
            RequestKind::Staff => StaffRequest::find_by_id(id)
                .one(&self.db)
                .await?
                .map(|r| (r.user_id, r.created_at)),
        };
        let (user_id, created_at) = found.ok_or_else(|| AppError::redirect(kind.queue_path()))?;
        let member = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::redirect(kind.queue_path()))?;

        Ok(PendingRequest {
            id,
            user_id,
            username: member.username,
            created_at,
        })
    }

    /// Grant the promotion and close the request in one transaction.
    pub async fn accept(&self, kind: RequestKind, id: i32) -> AppResult<i32> {
        let pending = self.get(kind, id).await?;
        let now = chrono::Utc::now().naive_utc();

        let txn = self.db.begin().await?;
        match kind {
            RequestKind::Business => {
                Profile::update_many()
                    .col_expr(profile::Column::IsBusiness, Expr::value(true))
                    .col_expr(profile::Column::UpdatedAt, Expr::value(now))
                    .filter(profile::Column::UserId.eq(pending.user_id))
                    .exec(&txn)
                    .await?;
            }
            RequestKind::Staff => {
                // Admins already outrank staff.
                User::update_many()
                    .col_expr(user::Column::Role, Expr::value(user::ROLE_STAFF))
                    .col_expr(user::Column::UpdatedAt, Expr::value(now))
                    .filter(user::Column::Id.eq(pending.user_id))
                    .filter(user::Column::Role.ne(user::ROLE_ADMIN))
                    .exec(&txn)
                    .await?;
            }
        }
        close_request(&txn, kind, id).await?;
        txn.commit().await?;

        tracing::info!(user_id = pending.user_id, ?kind, "promotion granted");
        Ok(pending.user_id)
    }

    pub async fn deny(&self, kind: RequestKind, id: i32) -> AppResult<()> {
        let pending = self.get(kind, id).await?;
        close_request(&self.db, kind, id).await?;
        tracing::info!(user_id = pending.user_id, ?kind, "promotion denied");
        Ok(())
    }
}

/// Insert a pending request unless the member already has one.
pub(crate) async fn file_request<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    kind: RequestKind,
) -> AppResult<bool> {
    let now = chrono::Utc::now().naive_utc();
    let inserted = match kind {
        RequestKind::Business => {
            BusinessRequest::insert(business_request::ActiveModel {
                user_id: sea_orm::ActiveValue::Set(user_id),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::column(business_request::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?
        }
        RequestKind::Staff => {
            StaffRequest::insert(staff_request::ActiveModel {
                user_id: sea_orm::ActiveValue::Set(user_id),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::column(staff_request::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?
        }
    };
    Ok(inserted > 0)
}

async fn close_request<C: ConnectionTrait>(db: &C, kind: RequestKind, id: i32) -> AppResult<()> {
    match kind {
        RequestKind::Business => {
            BusinessRequest::delete_by_id(id).exec(db).await?;
        }
        RequestKind::Staff => {
            StaffRequest::delete_by_id(id).exec(db).await?;
        }
    }
    Ok(())
}
