//! Shared errors and configuration for Coursekit.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT access tokens

pub mod config;
pub mod error;
pub mod jwt;

pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, ServerConfig, StorageBackend, StorageSettings,
};
pub use error::AppError;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
