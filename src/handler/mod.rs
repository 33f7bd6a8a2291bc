pub mod admin;
pub mod auth;
pub mod chat;
pub mod listings;
pub mod reports;
pub mod users;
pub mod verification;
