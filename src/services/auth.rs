use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{client, client_ban, profile, user, Client, ClientBan, User, UserModel},
    services::{
        email::EmailService,
        request::{file_request, RequestKind},
    },
    utils::{encode_access_token, hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    TransactionTrait,
};

/// Account fields shared by both registration forms.
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// A client domain together with the addresses banned under it.
pub struct ClientRules {
    pub domain: String,
    pub bans: Vec<client_ban::Model>,
}

/// Personal accounts need a mail under a known client domain that no ban of
/// that client matches.
pub fn check_personal_mail(email: &str, clients: &[ClientRules]) -> Result<(), String> {
    let mut matched = false;
    for rules in clients.iter().filter(|c| email.contains(&c.domain)) {
        if let Some(ban) = rules.bans.iter().find(|b| email.contains(&b.mail)) {
            return Err(format!("{} is not allowed to use Hexagon", ban.name));
        }
        matched = true;
    }
    if matched {
        Ok(())
    } else {
        Err("You must register with a valid mail".to_string())
    }
}

/// Business accounts must not use any client's mail domain.
pub fn check_business_mail(email: &str, clients: &[ClientRules]) -> Result<(), String> {
    if clients.iter().any(|c| email.contains(&c.domain)) {
        return Err("You must register as a student".to_string());
    }
    Ok(())
}

pub struct AuthService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            config: AuthConfig::from_env(),
        }
    }

    /// Register a personal account. Returns the new user and an access token.
    pub async fn register_personal(
        &self,
        form: Registration,
        email_service: &EmailService,
    ) -> AppResult<(UserModel, String)> {
        let clients = self.client_rules().await?;
        check_personal_mail(&form.email, &clients).map_err(AppError::Validation)?;
        self.register(form, None, email_service).await
    }

    /// Register a business account with its public domain and file a
    /// business request for staff.
    pub async fn register_business(
        &self,
        form: Registration,
        domain: String,
        email_service: &EmailService,
    ) -> AppResult<(UserModel, String)> {
        let clients = self.client_rules().await?;
        check_business_mail(&form.email, &clients).map_err(AppError::Validation)?;
        self.register(form, Some(domain), email_service).await
    }

    async fn register(
        &self,
        form: Registration,
        business_domain: Option<String>,
        email_service: &EmailService,
    ) -> AppResult<(UserModel, String)> {
        if self.user_exists(&form.username, &form.email).await? {
            return Err(AppError::Validation(
                "Username or email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&form.password)?;
        let now = chrono::Utc::now().naive_utc();
        let token = uuid::Uuid::new_v4().to_string();
        let expires = now + chrono::Duration::hours(24);

        let txn = self.db.begin().await?;
        let user = user::ActiveModel {
            username: sea_orm::ActiveValue::Set(form.username),
            email: sea_orm::ActiveValue::Set(form.email),
            first_name: sea_orm::ActiveValue::Set(form.first_name),
            last_name: sea_orm::ActiveValue::Set(form.last_name),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            role: sea_orm::ActiveValue::Set(user::ROLE_USER.to_string()),
            email_verified: sea_orm::ActiveValue::Set(false),
            email_verification_token: sea_orm::ActiveValue::Set(Some(token.clone())),
            email_verification_expires: sea_orm::ActiveValue::Set(Some(expires)),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let business_account = business_domain.is_some();
        profile::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user.id),
            bio: sea_orm::ActiveValue::Set(None),
            avatar_url: sea_orm::ActiveValue::Set(None),
            is_business: sea_orm::ActiveValue::Set(false),
            domain: sea_orm::ActiveValue::Set(
                business_domain.unwrap_or_else(|| profile::DEFAULT_DOMAIN.to_string()),
            ),
            strikes: sea_orm::ActiveValue::Set(0),
            strike_date: sea_orm::ActiveValue::Set(now),
            cv_url: sea_orm::ActiveValue::Set(None),
            mails: sea_orm::ActiveValue::Set(0),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if business_account {
            file_request(&txn, user.id, RequestKind::Business).await?;
        }
        txn.commit().await?;

        tracing::info!(user_id = user.id, business_account, "account registered");

        if let Err(e) = email_service
            .send_verification_email(&user.email, &token)
            .await
        {
            tracing::warn!("Failed to send verification email: {e}");
        }

        let access_token = encode_access_token(user.id)?;
        Ok((user, access_token))
    }

    /// Returns the user and an access token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(UserModel, String)> {
        let user = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }
        if self.config.require_email_verification && !user.email_verified {
            return Err(AppError::Validation(
                "Please verify your email before logging in".to_string(),
            ));
        }

        let access_token = encode_access_token(user.id)?;
        Ok((user, access_token))
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn verify_email(&self, token: &str) -> AppResult<()> {
        let user = User::find()
            .filter(user::Column::EmailVerificationToken.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid verification token".to_string()))?;

        if let Some(expires) = user.email_verification_expires {
            if chrono::Utc::now().naive_utc() > expires {
                return Err(AppError::Validation(
                    "Verification token has expired".to_string(),
                ));
            }
        }

        let mut active: user::ActiveModel = user.into();
        active.email_verified = sea_orm::ActiveValue::Set(true);
        active.email_verification_token = sea_orm::ActiveValue::Set(None);
        active.email_verification_expires = sea_orm::ActiveValue::Set(None);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn user_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(
                sea_orm::Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn client_rules(&self) -> AppResult<Vec<ClientRules>> {
        let clients = Client::find().find_with_related(ClientBan).all(&self.db).await?;
        Ok(clients
            .into_iter()
            .map(|(client, bans): (client::Model, Vec<client_ban::Model>)| ClientRules {
                domain: client.domain,
                bans,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<ClientRules> {
        vec![ClientRules {
            domain: "uni.edu".to_string(),
            bans: vec![client_ban::Model {
                id: 1,
                client_id: 1,
                name: "Mallory".to_string(),
                mail: "mallory@uni.edu".to_string(),
            }],
        }]
    }

    #[test]
    fn personal_mail_needs_client_domain() {
        assert!(check_personal_mail("alice@uni.edu", &rules()).is_ok());
        assert_eq!(
            check_personal_mail("alice@gmail.com", &rules()).unwrap_err(),
            "You must register with a valid mail"
        );
    }

    #[test]
    fn banned_mail_names_the_ban() {
        assert_eq!(
            check_personal_mail("mallory@uni.edu", &rules()).unwrap_err(),
            "Mallory is not allowed to use Hexagon"
        );
    }

    #[test]
    fn business_mail_must_be_outside_clients() {
        assert!(check_business_mail("hr@acme.com", &rules()).is_ok());
        assert_eq!(
            check_business_mail("hr@uni.edu", &rules()).unwrap_err(),
            "You must register as a student"
        );
    }
}
