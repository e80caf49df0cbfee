pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod state;
