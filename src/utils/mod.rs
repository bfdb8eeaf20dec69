pub mod clock;
pub mod jwt;
pub mod password;
pub mod render;
pub mod topics;

pub use jwt::encode_access_token;
pub use password::{hash_password, verify_password};
pub use render::render_content;
pub use topics::parse_topics;
