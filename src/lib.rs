pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod ogp;
pub mod state;
