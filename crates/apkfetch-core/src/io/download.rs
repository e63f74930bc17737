//! Streaming artifact download with SHA-256 verification.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use reqwest::{RequestBuilder, StatusCode};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server busy (HTTP {0})")]
    Busy(u16),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Whether a status code means the server wants us to back off.
pub fn is_busy_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

/// Sends `request` and streams the body to `dest`, returning the hex SHA-256.
///
/// When `expected_sha256` is given the digest is compared case-insensitively;
/// on mismatch (or any failure after the file was created) the partial file
/// is removed.
pub async fn download_to_file(
    request: RequestBuilder,
    dest: &Path,
    expected_sha256: Option<&str>,
) -> Result<String, DownloadError> {
    let response = request
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if is_busy_status(status) {
        return Err(DownloadError::Busy(status.as_u16()));
    }
    if !status.is_success() {
        return Err(DownloadError::Status(status.as_u16()));
    }

    let result = stream_to_file(response, dest).await;
    let actual_hash = match result {
        Ok(hash) => hash,
        Err(e) => {
            tokio::fs::remove_file(dest).await.ok();
            return Err(e);
        }
    };

    if let Some(expected) = expected_sha256 {
        if !actual_hash.eq_ignore_ascii_case(expected) {
            tokio::fs::remove_file(dest).await.ok();
            return Err(DownloadError::HashMismatch {
                expected: expected.to_lowercase(),
                actual: actual_hash,
            });
        }
    }

    Ok(actual_hash)
}

async fn stream_to_file(response: reqwest::Response, dest: &Path) -> Result<String, DownloadError> {
    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.write_all(&chunk)?;
    }

    file.flush().await?;
    Ok(hex::encode(hasher.finalize()))
}
