pub mod block;
pub mod business_request;
pub mod chat_report;
pub mod client;
pub mod client_ban;
pub mod follow;
pub mod message;
pub mod notification;
pub mod offer;
pub mod offer_like;
pub mod offer_report;
pub mod offer_topic;
pub mod post;
pub mod post_like;
pub mod post_report;
pub mod post_topic;
pub mod profile;
pub mod report_reporter;
pub mod staff_request;
pub mod topic;
pub mod user;
pub mod user_report;

pub use block::Entity as Block;
pub use business_request::{Entity as BusinessRequest, Model as BusinessRequestModel};
pub use chat_report::{Entity as ChatReport, Model as ChatReportModel};
pub use client::Entity as Client;
pub use client_ban::Entity as ClientBan;
pub use follow::Entity as Follow;
pub use message::{Entity as Message, Model as MessageModel};
pub use notification::{Entity as Notification, Model as NotificationModel};
pub use offer::{Entity as Offer, Model as OfferModel};
pub use offer_like::Entity as OfferLike;
pub use offer_report::{Entity as OfferReport, Model as OfferReportModel};
pub use offer_topic::Entity as OfferTopic;
pub use post::{Entity as Post, Model as PostModel};
pub use post_like::Entity as PostLike;
pub use post_report::{Entity as PostReport, Model as PostReportModel};
pub use post_topic::Entity as PostTopic;
pub use profile::{Entity as Profile, Model as ProfileModel};
pub use report_reporter::Entity as ReportReporter;
pub use staff_request::{Entity as StaffRequest, Model as StaffRequestModel};
pub use topic::{Entity as Topic, Model as TopicModel};
pub use user::{Entity as User, Model as UserModel};
pub use user_report::{Entity as UserReport, Model as UserReportModel};
