pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod membership;
pub mod models;
pub mod services;
pub mod types;

pub use client::ApiClient;
pub use error::ClientError;
