pub mod auth;
pub mod email;
pub mod message;
pub mod moderation;
pub mod notification;
pub mod offer;
pub mod post;
pub mod relationship;
pub mod report;
pub mod request;
pub mod staff;
pub mod topic;
pub mod upload;
pub mod user;

use crate::error::{AppError, AppResult};

/// Outcome of a content submission. Members with active strikes get
/// `Rejected`: nothing is stored and nobody is notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    Accepted(T),
    Rejected,
}

impl<T> Submission<T> {
    pub fn into_result(self) -> AppResult<T> {
        match self {
            Submission::Accepted(value) => Ok(value),
            Submission::Rejected => Err(AppError::Suspended),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Submission::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_submission_maps_to_suspended() {
        let rejected: Submission<i32> = Submission::Rejected;
        assert!(rejected.is_rejected());
        assert!(matches!(rejected.into_result(), Err(AppError::Suspended)));
        assert_eq!(Submission::Accepted(7).into_result().ok(), Some(7));
    }
}
