use std::{io, path::PathBuf};

use thiserror::Error;

use crate::api::error::ApiError;

/// Failure of a single GET attempt, or of the whole retry budget.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to connect to download URL: {source}")]
    ConnectionFail {
        #[from]
        source: reqwest::Error,
    },

    #[error("Server returned status {status}")]
    BadStatus { status: u16 },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    AttemptsExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

/// Failure while persisting a fetched file.
#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to create destination directory {}: {source}", .path.display())]
    DirCreationError { path: PathBuf, source: io::Error },

    #[error("Failed to write file {}: {source}", .path.display())]
    FileIOError { path: PathBuf, source: io::Error },
}

/// Errors surfaced to callers of the producer operations.
#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("API request failed: {source}")]
    ApiError {
        #[from]
        source: ApiError,
    },

    #[error("Failed to map API response into {entity}: {source}")]
    MalformedResponse {
        entity: &'static str,
        source: serde_json::Error,
    },

    #[error("API returned an invalid response for {method}")]
    InvalidServerResponse { method: String },

    #[error("{entity} is missing an essential field {field}")]
    MissingField {
        entity: String,
        field: &'static str,
    },

    #[error("Invalid album id: {value}")]
    InvalidAlbumId { value: String },

    #[error("Failed to start download worker: {source}")]
    WorkerSpawnFail { source: io::Error },
}
