pub mod auth_services;
pub mod gateway;
pub mod post_services;
pub mod user_services;

pub use gateway::{CollectionIds, Gateway, GatewayError, GatewayResult};
pub use post_services::{FEED_PAGE_SIZE, RECENT_POSTS_LIMIT};
