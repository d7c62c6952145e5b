//! Local staging of inbound uploads.
//!
//! Payloads are streamed into a named temp file before being handed to the
//! storage provider. The temp file lives exactly as long as its
//! [`StagedUpload`]; dropping it unlinks the file.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;

/// Directory where uploads are staged, plus the size cap applied while writing.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
    max_file_size: u64,
}

impl StagingArea {
    /// Create a staging area in `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    /// Create a staging area in the system temp directory.
    #[must_use]
    pub fn in_temp_dir(max_file_size: u64) -> Self {
        Self::new(std::env::temp_dir(), max_file_size)
    }

    /// Staging directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maximum number of bytes a single upload may stage.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Open a new temp file for writing an upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or temp file cannot be created.
    pub async fn open(&self) -> Result<StagingWriter, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let temp = tempfile::Builder::new()
            .prefix("coursekit-upload-")
            .tempfile_in(&self.dir)?;
        let file = tokio::fs::File::from_std(temp.reopen()?);

        Ok(StagingWriter {
            temp,
            file,
            written: 0,
            max_file_size: self.max_file_size,
        })
    }

    /// Stage an in-memory payload in one go.
    ///
    /// # Errors
    ///
    /// Same as [`StagingWriter::write_chunk`] and [`StagingWriter::finish`].
    pub async fn stage_bytes(
        &self,
        bytes: &[u8],
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<StagedUpload, StorageError> {
        let mut writer = self.open().await?;
        writer.write_chunk(bytes).await?;
        writer.finish(content_type, filename).await
    }
}

/// An upload being written to its temp file.
///
/// Dropping the writer before [`finish`](Self::finish) removes the partial file.
#[derive(Debug)]
pub struct StagingWriter {
    temp: NamedTempFile,
    file: tokio::fs::File,
    written: u64,
    max_file_size: u64,
}

impl StagingWriter {
    /// Append a chunk, enforcing the size cap.
    ///
    /// # Errors
    ///
    /// Returns `FileTooLarge` once the running total passes the cap, or an
    /// I/O error if the write fails.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        let size = self.written + chunk.len() as u64;
        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }
        self.file.write_all(chunk).await?;
        self.written = size;
        Ok(())
    }

    /// Bytes written so far.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush the file and attach the declared MIME type and original filename.
    ///
    /// # Errors
    ///
    /// Returns `EmptyUpload` if nothing was written, or an I/O error if the
    /// flush fails.
    pub async fn finish(
        mut self,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<StagedUpload, StorageError> {
        if self.written == 0 {
            return Err(StorageError::EmptyUpload);
        }
        self.file.flush().await?;
        self.file.sync_all().await?;

        Ok(StagedUpload {
            temp: self.temp,
            content_type: content_type.into(),
            filename: filename.into(),
            size: self.written,
        })
    }
}

/// A fully staged upload: temp file, declared MIME type and original filename.
#[derive(Debug)]
pub struct StagedUpload {
    temp: NamedTempFile,
    content_type: String,
    filename: String,
    size: u64,
}

impl StagedUpload {
    /// Path of the temp file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Declared MIME type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Original filename as sent by the client.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read the staged bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be read.
    pub async fn read(&self) -> Result<Vec<u8>, StorageError> {
        Ok(tokio::fs::read(self.path()).await?)
    }
}
