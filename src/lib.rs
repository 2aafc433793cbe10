pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod moderation;
pub mod posts;
pub mod state;

#[cfg(test)]
mod testing;
