//! Application Services

pub mod follows;
pub mod media;
pub mod tweets;
pub mod users;

pub use follows::FollowService;
pub use media::ImageHost;
pub use tweets::TweetService;
pub use users::UserService;
