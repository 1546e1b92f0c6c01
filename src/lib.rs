//! # VK Media Downloader
//!
//! vk_media_downloader is a CLI utility and library to bulk download photos and
//! audio referenced by the VK API.
//!
//! Producers walk the API on the calling thread and push [`DownloadTask`]s into a
//! shared queue while a fixed pool of worker threads fetches and saves them. See
//! [`Downloader`] for the run lifecycle.
pub mod api;
pub mod cli;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod models;
mod pool;
pub mod queue;
pub mod signal;
pub mod task;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use api::{Api, HttpApi, Owner, Params};
pub use downloader::{Downloader, RunGuard};
pub use error::{DownloaderError, FetchError, WriteError};
pub use fetch::{Fetcher, Transport};
pub use models::{Album, AlbumId, Audio, Photo};
pub use pool::RunSummary;
pub use queue::TaskQueue;
pub use signal::CompletionSignal;
pub use task::DownloadTask;
