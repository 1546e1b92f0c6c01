//! A single unit of work for the download workers.
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Source URL and the local path the fetched bytes will be saved to.
///
/// Tasks are immutable once built. A producer creates them, the
/// [`TaskQueue`](crate::queue::TaskQueue) owns them until a worker takes one out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    url: String,
    destination: PathBuf,
}

impl DownloadTask {
    pub fn new<U, P>(url: U, destination: P) -> Self
    where
        U: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }

    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[inline]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Directory the destination file lives in, if it has one.
    #[inline]
    pub fn parent_dir(&self) -> Option<&Path> {
        self.destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

impl Display for DownloadTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.url, self.destination.display())
    }
}
