pub mod auth;
pub mod build;
