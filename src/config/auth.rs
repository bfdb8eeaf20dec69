use super::parse_bool_env;

#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    /// When set, login is refused until the address on file is confirmed.
    pub require_email_verification: bool,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            require_email_verification: parse_bool_env("REQUIRE_EMAIL_VERIFICATION", false),
        }
    }
}
