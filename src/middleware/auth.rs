use crate::{
    error::{AppError, AppResult},
    models::{user, User},
    utils::jwt::decode_jwt,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// The signed-in caller, loaded fresh from the database on every request so
/// role changes and demotions apply immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role == user::ROLE_STAFF || self.role == user::ROLE_ADMIN
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token for an
/// existing user.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = bearer_user_id(&headers).ok_or(AppError::Unauthorized)?;

    let user = User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Staff console gate. Must run inside `auth_middleware`.
pub async fn staff_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let caller = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AppError::Unauthorized)?;
    require_staff(caller)?;
    Ok(next.run(request).await)
}

/// Non-staff callers are sent back to the front page.
pub fn require_staff(auth_user: &AuthUser) -> AppResult<()> {
    if auth_user.is_staff() {
        Ok(())
    } else {
        tracing::debug!(user_id = auth_user.user_id, "non-staff access to console");
        Err(AppError::redirect("/"))
    }
}

fn bearer_user_id(headers: &HeaderMap) -> Option<i32> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?
        .strip_prefix("Bearer ")?;
    if token.is_empty() {
        return None;
    }
    decode_jwt(token).ok()?.user_id()
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller id on public routes: `Some` for a valid token, `None` for anonymous
/// visitors. An invalid token is treated as anonymous.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<i32>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(Self(Some(auth_user.user_id)));
        }
        Ok(Self(bearer_user_id(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: &str) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "ana".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn staff_and_admin_pass_the_gate() {
        assert!(require_staff(&caller(user::ROLE_STAFF)).is_ok());
        assert!(require_staff(&caller(user::ROLE_ADMIN)).is_ok());
    }

    #[test]
    fn members_are_redirected_home() {
        match require_staff(&caller(user::ROLE_USER)) {
            Err(AppError::Redirect(location)) => assert_eq!(location, "/"),
            other => panic!("expected redirect, got {:?}", other.map(|_| ())),
        }
    }
}
