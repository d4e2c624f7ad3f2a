pub mod apple;
pub mod auth;
pub mod error;
pub mod profile;
pub mod spotify;
