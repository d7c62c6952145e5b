//! Object storage for course material files using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//!
//! Uploads arrive in two steps. The transport streams the payload into a
//! [`StagingArea`], producing a [`StagedUpload`] backed by a temp file; the
//! [`StorageService`] then transfers it to the provider. The temp file is
//! released when the `StagedUpload` is dropped, whichever way the transfer went.
//!
//! ```text
//! ┌──────────────┐  chunks  ┌──────────────┐ transfer ┌──────────────────┐
//! │  multipart   │ ───────▶ │ StagingArea  │ ───────▶ │  StorageService  │
//! │  file field  │          │ (temp file)  │          │  op.write(key)   │
//! └──────────────┘          └──────────────┘          └──────────────────┘
//! ```

mod config;
mod error;
mod service;
mod staging;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, StoredFile};
pub use staging::{StagedUpload, StagingArea, StagingWriter};
