//! Core business logic for Coursekit.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence and object storage are reached through traits implemented elsewhere.
//!
//! # Modules
//!
//! - `course` - Course creation, lookup and deletion
//! - `material` - Per-course material records and their attachments
//! - `storage` - Upload staging and object storage via OpenDAL
//! - `user` - Accounts, login sessions and password reset

pub mod course;
pub mod material;
pub mod storage;
pub mod user;
