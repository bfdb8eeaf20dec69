use crate::{
    error::{AppError, AppResult},
    models::{follow, offer, post, profile, user, Follow, Offer, Post, Profile, User},
    services::notification::{NotificationKind, NotificationService, Notifier},
    utils::clock::SharedClock,
};
use chrono::{Duration, NaiveDateTime};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Where a member stands after a strike. The count alone decides the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StrikeTier {
    Warned,
    Probation,
    Suspended,
}

impl StrikeTier {
    /// `None` for a clean record.
    pub fn from_count(strikes: i32) -> Option<Self> {
        match strikes {
            i32::MIN..=0 => None,
            1 => Some(Self::Warned),
            2 => Some(Self::Probation),
            _ => Some(Self::Suspended),
        }
    }

    /// How long until the sweep clears the record, counted from the strike.
    pub fn expiry(self) -> Duration {
        match self {
            Self::Warned => Duration::days(7),
            Self::Probation => Duration::days(28),
            Self::Suspended => Duration::days(365),
        }
    }

    /// Staff lose console access on their first strike. Admins are exempt.
    pub fn demotes_staff(self) -> bool {
        self == Self::Warned
    }

    pub fn purges(self) -> bool {
        self == Self::Suspended
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StrikeOutcome {
    pub user_id: i32,
    pub strikes: i32,
    pub tier: StrikeTier,
    pub strike_date: NaiveDateTime,
    pub demoted: bool,
    pub purged: bool,
}

pub struct ModerationService {
    db: DatabaseConnection,
    notifier: Notifier,
    clock: SharedClock,
}

impl ModerationService {
    pub fn new(db: DatabaseConnection, notifier: Notifier, clock: SharedClock) -> Self {
        Self {
            db,
            notifier,
            clock,
        }
    }

    /// Add one strike and apply the tier it lands on, inside the caller's
    /// transaction so the strike commits or rolls back with the action that
    /// caused it. The increment is a single `strikes = strikes + 1`
    /// statement so concurrent strikes all count. Call `announce` once the
    /// transaction has committed.
    pub async fn strike<C: ConnectionTrait>(
        &self,
        txn: &C,
        user_id: i32,
    ) -> AppResult<StrikeOutcome> {
        let member = User::find_by_id(user_id)
            .one(txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let bumped = Profile::update_many()
            .col_expr(
                profile::Column::Strikes,
                Expr::col(profile::Column::Strikes).add(1),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(txn)
            .await?;
        if bumped.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        let current = Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(txn)
            .await?
            .ok_or(AppError::NotFound)?;
        let strikes = current.strikes;
        let tier = StrikeTier::from_count(strikes)
            .ok_or_else(|| anyhow::anyhow!("strike count {} after increment", strikes))?;

        let now = self.clock.now();
        let strike_date = now + tier.expiry();
        let mut active: profile::ActiveModel = current.into();
        active.strike_date = sea_orm::ActiveValue::Set(strike_date);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(txn).await?;

        let demoted = tier.demotes_staff() && member.role == user::ROLE_STAFF;
        if demoted {
            let mut active: user::ActiveModel = member.into();
            active.role = sea_orm::ActiveValue::Set(user::ROLE_USER.to_string());
            active.updated_at = sea_orm::ActiveValue::Set(now);
            active.update(txn).await?;
        }

        let purged = tier.purges();
        if purged {
            purge(txn, user_id).await?;
        }

        Ok(StrikeOutcome {
            user_id,
            strikes,
            tier,
            strike_date,
            demoted,
            purged,
        })
    }

    /// Log a committed strike and tell the member about it.
    pub async fn announce(&self, outcome: &StrikeOutcome) -> AppResult<()> {
        tracing::info!(
            user_id = outcome.user_id,
            strikes = outcome.strikes,
            tier = ?outcome.tier,
            demoted = outcome.demoted,
            purged = outcome.purged,
            "strike applied"
        );

        NotificationService::new(self.db.clone(), self.notifier.clone())
            .notify(
                outcome.user_id,
                NotificationKind::Strike {
                    strikes: outcome.strikes,
                },
            )
            .await?;
        Ok(())
    }

    /// Clear every record whose expiry has passed. Returns how many members
    /// were reset; a second run right after is a no-op.
    pub async fn unstrike_expired(&self) -> AppResult<u64> {
        unstrike_expired(&self.db, self.clock.now()).await
    }
}

/// Reset strikes to 0 for every profile with `strike_date < now`.
pub async fn unstrike_expired<C: ConnectionTrait>(db: &C, now: NaiveDateTime) -> AppResult<u64> {
    let result = Profile::update_many()
        .col_expr(profile::Column::Strikes, Expr::value(0))
        .filter(profile::Column::StrikeDate.lt(now))
        .filter(profile::Column::Strikes.ne(0))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!(reset = result.rows_affected, "expired strikes cleared");
    }
    Ok(result.rows_affected)
}

/// Hide everything the member authored and cut every follow edge touching
/// them. Blocks stay in place.
async fn purge<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<()> {
    let posts = Post::update_many()
        .col_expr(post::Column::IsDelete, Expr::value(true))
        .filter(post::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    let offers = Offer::update_many()
        .col_expr(offer::Column::IsDelete, Expr::value(true))
        .filter(offer::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    let follows = Follow::delete_many()
        .filter(
            Condition::any()
                .add(follow::Column::FollowerId.eq(user_id))
                .add(follow::Column::FollowingId.eq(user_id)),
        )
        .exec(db)
        .await?;

    tracing::warn!(
        user_id,
        posts = posts.rows_affected,
        offers = offers.rows_affected,
        follows = follows.rows_affected,
        "suspended member purged"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_the_count() {
        assert_eq!(StrikeTier::from_count(0), None);
        assert_eq!(StrikeTier::from_count(1), Some(StrikeTier::Warned));
        assert_eq!(StrikeTier::from_count(2), Some(StrikeTier::Probation));
        assert_eq!(StrikeTier::from_count(3), Some(StrikeTier::Suspended));
        assert_eq!(StrikeTier::from_count(7), Some(StrikeTier::Suspended));
    }

    #[test]
    fn expiry_grows_with_each_tier() {
        assert_eq!(StrikeTier::Warned.expiry(), Duration::days(7));
        assert_eq!(StrikeTier::Probation.expiry(), Duration::days(28));
        assert_eq!(StrikeTier::Suspended.expiry(), Duration::days(365));
    }

    #[test]
    fn only_first_strike_demotes_and_only_third_purges() {
        assert!(StrikeTier::Warned.demotes_staff());
        assert!(!StrikeTier::Probation.demotes_staff());
        assert!(!StrikeTier::Probation.purges());
        assert!(StrikeTier::Suspended.purges());
    }
}
