pub mod auth;
pub mod message;
pub mod notification;
pub mod offer;
pub mod post;
pub mod relationship;
pub mod report;
pub mod staff;
pub mod topic;
pub mod upload;
pub mod user;

pub use auth::*;
