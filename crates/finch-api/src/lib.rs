pub mod auth;
pub mod blocking;
pub mod channels;
pub mod markdown;
pub mod middleware;
pub mod pagination;
pub mod posts;
pub mod router;
pub mod users;
pub mod views;
