pub mod auth;
pub mod career;
pub mod entry;
pub mod shared;
pub mod subject;
pub mod user;
pub mod vote;
