//! Run lifecycle and the per-media-kind producers.
//!
//! Every producer operation is one *run*: a [`RunGuard`] takes the run lock,
//! clears the completion signal and starts the worker pool, the producer walks the API on the calling
//! thread and fills the queue while the workers drain it, and the guard then
//! signals completion and joins every worker before anything is returned, on the
//! error path too.
//!
//! ```no_run
//! use std::path::Path;
//! use vk_media_downloader::{Downloader, Fetcher, HttpApi, Owner};
//!
//! # fn main() -> anyhow::Result<()> {
//! let api = HttpApi::new(reqwest::blocking::Client::new())
//!     .access_token(Some("token".to_string()));
//!
//! let downloader = Downloader::new(api, Fetcher::with_default_client()?).with_threads(8);
//!
//! let summary = downloader.audios(Path::new("music"), Owner::Current)?;
//! println!("{} files downloaded", summary.downloaded);
//! # Ok(())
//! # }
//! ```
use std::path::Path;
use std::sync::Arc;

use log::debug;
use parking_lot::MutexGuard;

use crate::api::{Api, Owner};
use crate::error::DownloaderError;
use crate::fetch::Fetcher;
use crate::models::{decode_list, Album, AlbumId, Audio, CountedList, Photo};
use crate::pool::{RunSummary, Shared, WorkerPool};
use crate::queue::TaskQueue;

/// Default number of download workers.
pub const DEFAULT_THREADS: usize = 4;

/// Page size used by `photos.getUserPhotos`.
const USER_PHOTOS_PAGE: u64 = 100;

/// Scoped ownership of a running worker pool.
///
/// Dropping the guard (for instance while a panicking producer unwinds) signals
/// completion and joins the workers, same as [`finish`](Self::finish).
///
/// A guard holds the downloader's run lock until its workers are joined, so a
/// second run started from another thread waits instead of resetting the signal
/// under the first one.
pub struct RunGuard<'a> {
    shared: &'a Shared,
    pool: Option<WorkerPool>,
    _running: MutexGuard<'a, ()>,
}

impl<'a> RunGuard<'a> {
    /// Waits for any other run to finish, resets the signal, then starts `workers` threads.
    pub(crate) fn start(shared: &'a Arc<Shared>, workers: usize) -> Result<Self, DownloaderError> {
        let running = shared.run_lock.lock();
        shared.signal.clear();

        let pool = WorkerPool::spawn(shared.clone(), workers)
            .map_err(|source| DownloaderError::WorkerSpawnFail { source })?;

        Ok(Self {
            shared: shared.as_ref(),
            pool: Some(pool),
            _running: running,
        })
    }

    /// Tells the workers no more tasks are coming and waits for them to drain the queue.
    pub fn finish(mut self) -> RunSummary {
        self.close()
    }

    fn close(&mut self) -> RunSummary {
        let Some(mut pool) = self.pool.take() else {
            return RunSummary::default();
        };

        self.shared.signal.signal();
        let summary = pool.join();
        debug!(
            "Run finished: {} downloaded, {} failed",
            summary.downloaded, summary.failed
        );
        summary
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Batch downloader for the photos and audio of an account.
///
/// The task queue and completion signal live as long as the downloader. The
/// signal is reset at the start of each run and the queue is always left empty
/// by the previous run's drain. Runs never overlap: a run started while another
/// one is in flight (from another thread) waits for it to be joined first.
pub struct Downloader<A> {
    api: A,
    threads: usize,
    shared: Arc<Shared>,
}

impl<A: Api> Downloader<A> {
    pub fn new(api: A, fetcher: Fetcher) -> Self {
        Self {
            api,
            threads: DEFAULT_THREADS,
            shared: Arc::new(Shared::new(fetcher)),
        }
    }

    /// Number of download workers per run. Zero is raised to one.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs `producer` on the calling thread while the pool downloads whatever it enqueues.
    ///
    /// Workers are started before `producer` is called and are always joined before
    /// this returns. A producer error is handed back only after the join, and tasks
    /// it enqueued before failing are still downloaded.
    pub fn run_parallel<F, E>(&self, producer: F) -> Result<RunSummary, E>
    where
        F: FnOnce(&TaskQueue) -> Result<(), E>,
        E: From<DownloaderError>,
    {
        let guard = RunGuard::start(&self.shared, self.threads)?;

        let produced = producer(&self.shared.queue);

        let summary = guard.finish();
        produced.map(|()| summary)
    }

    /// Downloads every photo of the given albums into `dest/<album id>/<photo id>.<ext>`.
    ///
    /// With no album list (or an empty one) the system albums are walked first,
    /// followed by every album `photos.getAlbums` reports for `owner`.
    pub fn album_photos(
        &self,
        dest: &Path,
        owner: Owner,
        album_ids: Option<&[AlbumId]>,
    ) -> Result<RunSummary, DownloaderError> {
        debug!("Downloading album photos of {} into {}", owner, dest.display());

        self.run_parallel(|queue| -> Result<(), DownloaderError> {
            let albums = match album_ids {
                Some(ids) if !ids.is_empty() => ids.to_vec(),
                _ => {
                    let listed: Vec<Album> = decode_list(
                        self.api.request("photos.getAlbums", &owner.params())?,
                        "photos.getAlbums",
                    )?;
                    AlbumId::SYSTEM
                        .into_iter()
                        .chain(listed.iter().map(|a| AlbumId::Id(a.aid)))
                        .collect()
                }
            };

            for album in albums {
                let mut params = owner.params();
                params.insert("aid".into(), album.to_string());

                let photos: Vec<Photo> =
                    decode_list(self.api.request("photos.get", &params)?, "photos.get")?;
                debug!("Album {} has {} photos", album, photos.len());

                for photo in photos {
                    queue.enqueue(photo.to_task(dest)?);
                }
            }
            Ok(())
        })
    }

    /// Downloads every photo `user` is tagged in, paging through `photos.getUserPhotos`.
    pub fn user_photos(
        &self,
        dest: &Path,
        user: Option<i64>,
    ) -> Result<RunSummary, DownloaderError> {
        let owner = Owner::from(user);
        debug!("Downloading photos of {} into {}", owner, dest.display());

        self.run_parallel(|queue| -> Result<(), DownloaderError> {
            let page = |offset: u64| -> Result<CountedList<Photo>, DownloaderError> {
                let mut params = owner.params();
                params.insert("count".into(), USER_PHOTOS_PAGE.to_string());
                if offset > 0 {
                    params.insert("offset".into(), offset.to_string());
                }
                CountedList::from_value(
                    self.api.request("photos.getUserPhotos", &params)?,
                    "photos.getUserPhotos",
                )
            };

            let first = page(0)?;
            let total = first.total;
            debug!("{} reports {} photos", owner, total);

            for photo in first.items {
                queue.enqueue(photo.to_task(dest)?);
            }

            let mut offset = USER_PHOTOS_PAGE;
            while offset < total {
                for photo in page(offset)?.items {
                    queue.enqueue(photo.to_task(dest)?);
                }
                offset += USER_PHOTOS_PAGE;
            }
            Ok(())
        })
    }

    /// Downloads every track of `owner` into `dest/<artist - title>.<ext>`.
    pub fn audios(&self, dest: &Path, owner: Owner) -> Result<RunSummary, DownloaderError> {
        debug!("Downloading audio of {} into {}", owner, dest.display());

        self.run_parallel(|queue| -> Result<(), DownloaderError> {
            let tracks: Vec<Audio> =
                decode_list(self.api.request("audio.get", &owner.params())?, "audio.get")?;

            for track in tracks {
                queue.enqueue(track.to_task(dest));
            }
            Ok(())
        })
    }

    /// Downloads the album photos of every friend of `user` into `dest/<friend id>/`.
    ///
    /// Each friend is a separate run; the first failing friend stops the walk.
    pub fn friends_photos(
        &self,
        dest: &Path,
        user: Option<i64>,
    ) -> Result<RunSummary, DownloaderError> {
        let owner = Owner::from(user);
        let friends: Vec<i64> =
            decode_list(self.api.request("friends.get", &owner.params())?, "friends.get")?;
        debug!("{} has {} friends", owner, friends.len());

        let mut total = RunSummary::default();
        for friend in friends {
            total += self.album_photos(&dest.join(friend.to_string()), Owner::User(friend), None)?;
        }
        Ok(total)
    }
}
